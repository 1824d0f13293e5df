//! LYTAF: Main entry point

use anyhow::Context;
use clap::Parser;
use lytaf::cli::Cli;
use lytaf::config::LytafConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. The returned guard flushes the log file
/// on drop and must outlive every log call.
fn init_tracing(config: &LytafConfig, json: bool) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    let (writer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "lytaf.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.log_dir.is_none())
        .with_writer(writer);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    guard
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config().context("loading configuration")?;
    let _guard = init_tracing(&config, cli.json_logs);

    let stdout = std::io::stdout();
    lytaf::cli::run(cli.command, &config, &mut stdout.lock())
}
