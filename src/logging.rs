//! Tracing setup.  The game owns the terminal, so logs go to a file.

use std::path::Path;

use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Install the global subscriber.
///
/// `RUST_LOG` picks the filter (default `info`); `LANE_SHOOTER_LOG` picks
/// the log file (default `logs/lane_shooter.log`, rotated daily).
pub fn init() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_path =
        std::env::var("LANE_SHOOTER_LOG").unwrap_or_else(|_| "logs/lane_shooter.log".to_string());
    let log_path = Path::new(&log_path);
    let directory = log_path.parent().unwrap_or(Path::new("."));
    let file_name = log_path
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("lane_shooter.log"));
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(directory, file_name));
    let _ = FILE_GUARD.set(guard);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()?;

    install_panic_hook();
    Ok(())
}

/// Log panics, then hand them to the previously installed hook so the
/// default report still reaches stderr.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();
        let message = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            String::from("<non-string panic>")
        };
        tracing::error!(location = %location, "panic: {}", message);
        previous(info);
    }));
}
