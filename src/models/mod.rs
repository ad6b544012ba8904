pub mod hn;
pub mod classification;
pub mod history;

pub use hn::*;
pub use classification::*;
pub use history::*;
