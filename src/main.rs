use anyhow::Context;
use clap::{CommandFactory, Parser};
use std::process;
use zipmail::config::cli::resolve_root;
use zipmail::utils::error::exit_code;
use zipmail::utils::{logger, validation::Validate};
use zipmail::{
    CliConfig, ConfigSource, DeliveryEngine, DeliveryOutcome, DeliveryRequest, EnvFile,
    SmtpMailer,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = match CliConfig::try_parse() {
        Ok(config) => config,
        Err(e) => {
            // --help / --version 走 clap 預設流程 (exit 0)
            if !e.use_stderr() {
                e.exit();
            }
            eprint!("{}", e.render());
            process::exit(exit_code::USAGE);
        }
    };

    // 初始化日誌
    logger::init_cli_logger(config.verbose);
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ {}", e);
        eprintln!("❌ {}", e);
        eprintln!("{}", CliConfig::command().render_usage());
        process::exit(exit_code::USAGE);
    }

    let root = resolve_root(config.root.as_deref()).context("Failed to resolve project root")?;
    tracing::debug!("Project root: {}", root.display());

    let env_file = EnvFile::load(&root)
        .with_context(|| format!("Failed to read {}", root.join(".env").display()))?;
    let mailer = SmtpMailer::new(ConfigSource::from_process_env(env_file));

    let request = DeliveryRequest {
        root,
        topic: config.topic.trim().to_string(),
        recipient: config.recipient.trim().to_string(),
    };
    let engine = DeliveryEngine::new(mailer).with_dry_run(config.dry_run);

    // 打包
    let report = match engine.package(&request) {
        Ok(report) => report,
        Err(e) if e.exit_code() == Some(exit_code::SOURCE_NOT_FOUND) => {
            tracing::error!("❌ {}", e);
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            process::exit(exit_code::SOURCE_NOT_FOUND);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to package topic '{}'", request.topic))
        }
    };
    let archive_path = report.path.clone();
    println!(
        "📦 Archived {} file(s) into {}",
        report.entries,
        archive_path.display()
    );

    // 寄送
    match engine.deliver(&request, report).await {
        Ok(DeliveryOutcome::Sent { recipient, .. }) => {
            tracing::info!("✅ Delivery completed");
            println!("✅ Sent {} to {}", archive_path.display(), recipient);
            Ok(())
        }
        Ok(DeliveryOutcome::Skipped { .. }) => {
            println!("🔍 Email not sent (dry run)");
            Ok(())
        }
        Err(e) if e.is_delivery_failure() => {
            tracing::error!("❌ Email delivery failed: {}", e);
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            eprintln!(
                "📁 Archive is available at: {} (send it manually)",
                archive_path.display()
            );
            process::exit(exit_code::SEND_FAILED);
        }
        Err(e) => Err(e).with_context(|| format!("Failed to send topic '{}'", request.topic)),
    }
}
