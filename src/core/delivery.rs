use crate::core::Mailer;
use crate::domain::model::{ArchiveJob, ArchiveReport, Delivery, DeliveryOutcome};
use crate::utils::error::Result;
use chrono::{DateTime, Local};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    pub root: PathBuf,
    pub topic: String,
    pub recipient: String,
}

impl DeliveryRequest {
    pub fn archive_job(&self) -> ArchiveJob {
        ArchiveJob::for_topic(&self.root, &self.topic)
    }
}

pub fn subject_for(topic: &str) -> String {
    format!("Output archive: {}", topic)
}

pub fn body_for(topic: &str, report: &ArchiveReport, packaged_at: DateTime<Local>) -> String {
    let file_name = report
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    format!(
        "Hello,\n\n\
         Attached is the packaged output for topic \"{}\" ({}, {} file(s)).\n\n\
         Packaged at {}.\n",
        topic,
        file_name,
        report.entries,
        packaged_at.format("%Y-%m-%d %H:%M:%S %:z")
    )
}

/// Archive first, then mail; the mailer is never reached when archiving fails.
pub struct DeliveryEngine<M: Mailer> {
    mailer: M,
    dry_run: bool,
}

impl<M: Mailer> DeliveryEngine<M> {
    pub fn new(mailer: M) -> Self {
        Self {
            mailer,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Stage 1: build `<root>/output/<topic>.zip`.
    pub fn package(&self, request: &DeliveryRequest) -> Result<ArchiveReport> {
        tracing::info!("Packaging topic '{}'", request.topic);
        request.archive_job().run()
    }

    /// Stage 2: mail an archive produced by [`Self::package`].
    pub async fn deliver(
        &self,
        request: &DeliveryRequest,
        report: ArchiveReport,
    ) -> Result<DeliveryOutcome> {
        if self.dry_run {
            tracing::info!("🔍 DRY RUN - skipping email to {}", request.recipient);
            return Ok(DeliveryOutcome::Skipped { report });
        }

        let delivery = Delivery {
            recipient: request.recipient.clone(),
            subject: subject_for(&request.topic),
            body: body_for(&request.topic, &report, Local::now()),
            attachment: report.path.clone(),
        };
        self.mailer.send(&delivery).await?;

        Ok(DeliveryOutcome::Sent {
            report,
            recipient: request.recipient.clone(),
        })
    }

    pub async fn run(&self, request: &DeliveryRequest) -> Result<DeliveryOutcome> {
        let report = self.package(request)?;
        self.deliver(request, report).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ZipMailError;
    use async_trait::async_trait;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct RecordingMailer {
        sent: Arc<Mutex<Vec<Delivery>>>,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, delivery: &Delivery) -> Result<()> {
            if let Some(message) = &self.fail_with {
                return Err(ZipMailError::mail(message.clone()));
            }
            self.sent.lock().unwrap().push(delivery.clone());
            Ok(())
        }
    }

    fn request(root: &TempDir, topic: &str) -> DeliveryRequest {
        DeliveryRequest {
            root: root.path().to_path_buf(),
            topic: topic.to_string(),
            recipient: "ops@example.com".to_string(),
        }
    }

    fn seed_topic(root: &TempDir, topic: &str) {
        let dir = root.path().join("output").join(topic);
        fs::create_dir_all(dir.join("sub")).unwrap();
        fs::write(dir.join("a.txt"), "alpha").unwrap();
        fs::write(dir.join("sub").join("b.txt"), "beta").unwrap();
    }

    #[test]
    fn test_subject_and_body_reference_topic() {
        let report = ArchiveReport {
            path: PathBuf::from("/srv/output/demo.zip"),
            entries: 2,
            uncompressed_bytes: 9,
            archive_bytes: 200,
        };
        assert_eq!(subject_for("demo"), "Output archive: demo");

        let body = body_for("demo", &report, Local::now());
        assert!(body.contains("\"demo\""));
        assert!(body.contains("demo.zip"));
        assert!(body.contains("2 file(s)"));
    }

    #[test]
    fn test_run_archives_then_sends() {
        let root = TempDir::new().unwrap();
        seed_topic(&root, "demo");
        let mailer = RecordingMailer::default();
        let engine = DeliveryEngine::new(mailer.clone());

        let outcome = tokio_test::block_on(engine.run(&request(&root, "demo"))).unwrap();

        let archive_path = root.path().join("output").join("demo.zip");
        assert!(matches!(
            &outcome,
            DeliveryOutcome::Sent { recipient, .. } if recipient == "ops@example.com"
        ));
        assert_eq!(outcome.report().entries, 2);
        assert!(archive_path.exists());

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "ops@example.com");
        assert_eq!(sent[0].subject, "Output archive: demo");
        assert_eq!(sent[0].attachment, archive_path);
    }

    #[test]
    fn test_missing_topic_never_reaches_mailer() {
        let root = TempDir::new().unwrap();
        let mailer = RecordingMailer::default();
        let engine = DeliveryEngine::new(mailer.clone());

        let err = tokio_test::block_on(engine.run(&request(&root, "ghost"))).unwrap_err();

        assert!(matches!(err, ZipMailError::SourceNotFound { .. }));
        assert!(mailer.sent.lock().unwrap().is_empty());
        assert!(!root.path().join("output").join("ghost.zip").exists());
    }

    #[test]
    fn test_send_failure_keeps_archive() {
        let root = TempDir::new().unwrap();
        seed_topic(&root, "demo");
        let mailer = RecordingMailer {
            fail_with: Some("535 authentication failed".to_string()),
            ..Default::default()
        };
        let engine = DeliveryEngine::new(mailer);

        let err = tokio_test::block_on(engine.run(&request(&root, "demo"))).unwrap_err();

        assert_eq!(err.exit_code(), Some(3));
        assert!(err.to_string().contains("535 authentication failed"));
        assert!(root.path().join("output").join("demo.zip").exists());
    }

    #[test]
    fn test_package_alone_does_not_send() {
        let root = TempDir::new().unwrap();
        seed_topic(&root, "demo");
        let mailer = RecordingMailer::default();
        let engine = DeliveryEngine::new(mailer.clone());

        let report = engine.package(&request(&root, "demo")).unwrap();

        assert_eq!(report.path, root.path().join("output").join("demo.zip"));
        assert!(report.path.exists());
        assert!(mailer.sent.lock().unwrap().is_empty());

        let outcome = tokio_test::block_on(engine.deliver(&request(&root, "demo"), report)).unwrap();
        assert!(matches!(outcome, DeliveryOutcome::Sent { .. }));
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_nested_topic() {
        let root = TempDir::new().unwrap();
        seed_topic(&root, "reports/2024");
        let engine = DeliveryEngine::new(RecordingMailer::default());

        let outcome = tokio_test::block_on(engine.run(&request(&root, "reports/2024"))).unwrap();

        assert_eq!(
            outcome.report().path,
            root.path().join("output").join("reports").join("2024.zip")
        );
        assert_eq!(outcome.report().entries, 2);
    }

    #[test]
    fn test_dry_run_skips_mailer() {
        let root = TempDir::new().unwrap();
        seed_topic(&root, "demo");
        let mailer = RecordingMailer::default();
        let engine = DeliveryEngine::new(mailer.clone()).with_dry_run(true);

        let outcome = tokio_test::block_on(engine.run(&request(&root, "demo"))).unwrap();

        assert!(matches!(outcome, DeliveryOutcome::Skipped { .. }));
        assert!(mailer.sent.lock().unwrap().is_empty());
        assert!(root.path().join("output").join("demo.zip").exists());
    }
}
