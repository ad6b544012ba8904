use async_trait::async_trait;

use crate::error::Result;
use crate::models::Classification;

/// A structured-generation endpoint that answers a prompt with a
/// [`Classification`].
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, model: &str, prompt: &str) -> Result<Classification>;
    fn name(&self) -> &str;
}
