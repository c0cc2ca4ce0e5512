use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use stacklog::global::{self, Global};
use stacklog::config::config_file_path;
use stacklog::{Level, LoggerConfig, RouterLayer};

fn main() -> Result<()> {
    // Optional config path as the only argument, else the per-user file
    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => LoggerConfig::load(&path)?,
        None => LoggerConfig::load_default()?,
    };
    global::initialize(config.concurrency_mode())
        .context("Failed to initialize the global logger")?;
    global::config::apply(&config);

    // Route tracing events from dependencies into the same sinks
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(RouterLayer::new(Global))
        .init();

    global::subscribe_push_events(
        Arc::new(|date: &str, text: &str, level: Level| {
            eprintln!("[subscriber] {} {} {}", date, level, text);
        }),
        Level::Error,
    );

    stacklog::trace!("trace is below the default thresholds");
    stacklog::debug!("debug is below the default thresholds");
    stacklog::info!("config file: {}", describe_config_path());
    stacklog::warn!("history keeps {} events", config.stack_size);
    stacklog::error!("errors also reach the push subscriber");
    stacklog::fatal!("fatal is the most severe level");

    global::message(Level::Info)
        .push("built from ")
        .push(3)
        .push(" fragments");

    {
        let mut span = global::begin_timed(Level::Info);
        span.log("simulated work");
        span.log("second step");
        thread::sleep(Duration::from_millis(120));
    }

    tracing::info!(answer = 42, "event from tracing");

    let removed = global::with_router(|router| {
        router.remove_expired_files(stacklog::retention::DEFAULT_RETENTION_DAYS)
    })?;
    if removed > 0 {
        stacklog::info!("Cleaned up {} old log files", removed);
    }

    let history = global::history(Level::Trace);
    let dump = serde_json::to_string_pretty(&history).context("Failed to serialize history")?;
    println!("{}", dump);

    global::flush().context("Failed to flush log file")?;
    Ok(())
}

fn describe_config_path() -> String {
    config_file_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<none>".to_string())
}
