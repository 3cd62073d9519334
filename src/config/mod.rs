pub mod cli;
pub mod env_file;
pub mod mail;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_non_empty_string, validate_topic, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "zipmail", version)]
#[command(about = "Zip an output directory and email it as an attachment")]
pub struct CliConfig {
    /// Directory name under <root>/output to package
    pub topic: String,

    /// Email address that receives the archive
    pub recipient: String,

    /// Project root (defaults to the executable's install location)
    #[arg(long, env = "ZIPMAIL_ROOT")]
    pub root: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Build the archive but do not send it
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_topic("topic", self.topic.trim())?;
        validate_non_empty_string("recipient", &self.recipient)?;
        Ok(())
    }
}
