//! src/logging.rs
//! ============================================================================
//! Tracing pipeline for the TUI: stdout belongs to the terminal UI, so all
//! diagnostics go to a daily-rolling file under the platform data dir.
//! Filtering follows `RUST_LOG` with an `info` default.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

pub struct Logger;

impl Logger {
    /// Initialize the global subscriber. The returned guard must be held
    /// for the process lifetime or buffered log lines are lost.
    pub fn init_tracing() -> Option<WorkerGuard> {
        let log_dir = Config::log_dir();
        if std::fs::create_dir_all(&log_dir).is_err() {
            // No log dir, no logging; the UI must still come up.
            return None;
        }

        let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "triptych.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(writer).with_ansi(false))
            .init();

        Some(guard)
    }
}
