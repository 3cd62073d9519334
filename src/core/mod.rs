pub mod archive;
pub mod delivery;
pub mod mailer;

pub use crate::domain::model::{ArchiveJob, ArchiveReport, Delivery, DeliveryOutcome};
pub use crate::domain::ports::Mailer;
pub use crate::utils::error::Result;
