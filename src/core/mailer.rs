//! SMTP delivery of the packaged archive.

use crate::config::mail::{ConfigSource, MailConfig, TlsMode};
use crate::domain::model::Delivery;
use crate::domain::ports::Mailer;
use crate::utils::error::{Result, ZipMailError};
use async_trait::async_trait;
use lettre::message::header::{ContentTransferEncoding, ContentType};
use lettre::message::{Attachment, Body, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

pub const ATTACHMENT_CONTENT_TYPE: &str = "application/zip";

/// SMTP mailer backed by lettre.
///
/// Settings are resolved on every [`Mailer::send`] call, so missing
/// credentials surface at send time and never before the archive exists.
/// The transport is built without pooling: each send opens one connection and
/// closes it when the transport is dropped, whether the send succeeded or not.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    source: ConfigSource,
}

impl SmtpMailer {
    pub fn new(source: ConfigSource) -> Self {
        Self { source }
    }

    fn transport(config: &MailConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let builder = AsyncSmtpTransport::<Tokio1Executor>::from_url(&connection_url(config))
            .map_err(|e| ZipMailError::mail(e.to_string()))?;

        Ok(builder
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build())
    }
}

/// lettre connection URL for the configured host, port and TLS mode.
///
/// `smtps://` negotiates TLS on connect; `smtp://...?tls=required` connects in
/// plain text and refuses to continue unless STARTTLS succeeds.
pub fn connection_url(config: &MailConfig) -> String {
    match config.tls_mode() {
        TlsMode::Implicit => format!("smtps://{}:{}", config.host, config.port),
        TlsMode::StartTls => format!("smtp://{}:{}?tls=required", config.host, config.port),
    }
}

/// Build the `multipart/mixed` message: plain-text body plus the archive.
pub fn build_message(from: &str, delivery: &Delivery, archive: Vec<u8>) -> Result<Message> {
    let from: Mailbox = from.trim().parse().map_err(|_| ZipMailError::InvalidAddress {
        address: from.to_string(),
    })?;
    let to: Mailbox = delivery
        .recipient
        .trim()
        .parse()
        .map_err(|_| ZipMailError::InvalidAddress {
            address: delivery.recipient.clone(),
        })?;

    let content_type = ContentType::parse(ATTACHMENT_CONTENT_TYPE)
        .map_err(|e| ZipMailError::mail(e.to_string()))?;
    // base64 一定成功；明確指定避免 lettre 自動挑選編碼
    let body = Body::new_with_encoding(archive, ContentTransferEncoding::Base64)
        .map_err(|_| ZipMailError::mail("failed to encode attachment as base64"))?;
    let attachment = Attachment::new(delivery.attachment_name()).body(body, content_type);

    Message::builder()
        .from(from)
        .to(to)
        .subject(delivery.subject.as_str())
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(delivery.body.clone()))
                .singlepart(attachment),
        )
        .map_err(|e| ZipMailError::mail(e.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, delivery: &Delivery) -> Result<()> {
        let config = MailConfig::resolve(&self.source)?;
        tracing::debug!("Mail config: {:?}", config);

        let archive = tokio::fs::read(&delivery.attachment).await.map_err(|e| {
            ZipMailError::mail(format!(
                "cannot read attachment {}: {}",
                delivery.attachment.display(),
                e
            ))
        })?;
        let size = archive.len();
        let message = build_message(&config.from, delivery, archive)?;

        tracing::info!(
            "📧 Sending {} ({} bytes) to {} via {}:{} ({:?})",
            delivery.attachment_name(),
            size,
            delivery.recipient,
            config.host,
            config.port,
            config.tls_mode()
        );

        let transport = Self::transport(&config)?;
        transport
            .send(message)
            .await
            .map_err(|e| ZipMailError::mail(e.to_string()))?;

        tracing::debug!("SMTP session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::env_file::EnvFile;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn delivery(recipient: &str) -> Delivery {
        Delivery {
            recipient: recipient.to_string(),
            subject: "Output archive: demo".to_string(),
            body: "Attached is demo.zip.".to_string(),
            attachment: PathBuf::from("/tmp/output/demo.zip"),
        }
    }

    #[test]
    fn test_build_message_has_text_and_base64_attachment() {
        let message = build_message(
            "bot@example.com",
            &delivery("ops@example.com"),
            b"PK\x03\x04\xff\x00binary".to_vec(),
        )
        .unwrap();

        let raw = String::from_utf8_lossy(&message.formatted()).into_owned();
        assert!(raw.contains("Subject: Output archive: demo"));
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("text/plain"));
        assert!(raw.contains("Attached is demo.zip."));
        assert!(raw.contains("Content-Disposition: attachment"));
        assert!(raw.contains("demo.zip"));
        assert!(raw.contains(ATTACHMENT_CONTENT_TYPE));
        assert!(raw.contains("Content-Transfer-Encoding: base64"));
    }

    #[test]
    fn test_build_message_single_recipient() {
        let message =
            build_message("bot@example.com", &delivery(" ops@example.com "), Vec::new()).unwrap();
        let to: Vec<String> = message
            .envelope()
            .to()
            .iter()
            .map(|address| address.to_string())
            .collect();
        assert_eq!(to, vec!["ops@example.com".to_string()]);
    }

    #[test]
    fn test_build_message_rejects_bad_addresses() {
        let err = build_message("bot@example.com", &delivery("not an address"), Vec::new())
            .unwrap_err();
        assert!(matches!(err, ZipMailError::InvalidAddress { .. }));

        let err = build_message("", &delivery("ops@example.com"), Vec::new()).unwrap_err();
        assert!(matches!(err, ZipMailError::InvalidAddress { .. }));
    }

    fn config_for_port(port: u16) -> MailConfig {
        MailConfig {
            host: "smtp.example.com".to_string(),
            port,
            username: "bot@example.com".to_string(),
            password: "pw".to_string(),
            from: "bot@example.com".to_string(),
        }
    }

    #[test]
    fn test_connection_url_follows_port() {
        assert_eq!(
            connection_url(&config_for_port(465)),
            "smtps://smtp.example.com:465"
        );
        assert_eq!(
            connection_url(&config_for_port(587)),
            "smtp://smtp.example.com:587?tls=required"
        );
        assert_eq!(
            connection_url(&config_for_port(2525)),
            "smtp://smtp.example.com:2525?tls=required"
        );
    }

    #[test]
    fn test_transport_builds_without_connecting() {
        for port in [465, 587] {
            let config = config_for_port(port);
            assert!(SmtpMailer::transport(&config).is_ok(), "port {}", port);
        }
    }

    #[tokio::test]
    async fn test_send_without_config_fails_before_connecting() {
        let source = ConfigSource::with_env(HashMap::new(), EnvFile::default());
        let mailer = SmtpMailer::new(source);

        // 附件路徑不存在：若先讀檔或連線，錯誤訊息會不同
        let err = mailer.send(&delivery("ops@example.com")).await.unwrap_err();
        assert!(matches!(err, ZipMailError::ConfigError { .. }));
        assert!(err.to_string().contains("SMTP_HOST"));
    }
}
