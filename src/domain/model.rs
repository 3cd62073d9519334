use std::path::{Path, PathBuf};

/// Source directory and destination archive for one packaging run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveJob {
    pub source_dir: PathBuf,
    pub dest_path: PathBuf,
}

impl ArchiveJob {
    /// `<root>/output/<topic>` packed into `<root>/output/<topic>.zip`.
    pub fn for_topic(root: &Path, topic: &str) -> Self {
        let output_dir = root.join("output");
        Self {
            source_dir: output_dir.join(topic),
            dest_path: output_dir.join(format!("{}.zip", topic)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    pub path: PathBuf,
    pub entries: usize,
    pub uncompressed_bytes: u64,
    pub archive_bytes: u64,
}

/// A single outgoing message with the archive attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub attachment: PathBuf,
}

impl Delivery {
    pub fn attachment_name(&self) -> String {
        self.attachment
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "archive.zip".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent { report: ArchiveReport, recipient: String },
    Skipped { report: ArchiveReport },
}

impl DeliveryOutcome {
    pub fn report(&self) -> &ArchiveReport {
        match self {
            Self::Sent { report, .. } | Self::Skipped { report } => report,
        }
    }
}
