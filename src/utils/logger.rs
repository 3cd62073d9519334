use std::io;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset. lettre's SMTP chatter only shows up
/// in verbose mode.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "zipmail=debug,lettre=debug,warn"
    } else {
        "zipmail=info,warn"
    }
}

pub fn cli_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// stdout 留給確認訊息，日誌一律寫到 stderr
pub fn init_cli_logger(verbose: bool) {
    let result = tracing_subscriber::registry()
        .with(cli_filter(verbose))
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(verbose)
                .compact(),
        )
        .try_init();

    if let Err(e) = result {
        eprintln!("⚠️ Logger already initialised: {}", e);
    }
}
