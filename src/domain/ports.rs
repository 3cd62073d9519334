use crate::domain::model::Delivery;
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message, attachment included, to its single recipient.
    async fn send(&self, delivery: &Delivery) -> Result<()>;
}
