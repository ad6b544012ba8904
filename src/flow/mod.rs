pub mod definition;
pub mod runner;
pub mod client;

pub use definition::{FlowDefinition, StepDefinition};
pub use runner::{FlowRunOutput, LocalRunner, StepHandler};
pub use client::{FlowClient, RunStatus, StepStatus};
