use anyhow::Context;
use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};
use tokio::task;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt, prelude::*};

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const MAX_AGE: Duration = Duration::from_secs(60 * 60 * 24 * 3);
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Keeps the file writer flushing; drop it last
#[allow(dead_code)]
pub struct LoggerGuard(WorkerGuard);

/// Console plus daily rolling file logging. `RUST_LOG` overrides `level`.
/// Must be called from within a tokio runtime (old-log cleanup task).
pub fn init_logging(log_dir: impl AsRef<Path>, prefix: &str, level: &str) -> anyhow::Result<LoggerGuard> {
    let log_dir = log_dir.as_ref().to_path_buf();

    let (level, valid) = match level.to_ascii_lowercase().as_str() {
        l if LEVELS.contains(&l) => (l.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO), true),
        _ => (LevelFilter::INFO, false),
    };

    let builder = EnvFilter::builder().with_default_directive(level.into());
    let rust_log = std::env::var("RUST_LOG").unwrap_or_default();
    let console_filter = builder.clone().parse_lossy(&rust_log);
    let file_filter = builder.parse_lossy(&rust_log);

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(&log_dir)
        .with_context(|| format!("Failed to create log appender in {}", log_dir.display()))?;
    let (non_blocking, guard) = NonBlocking::new(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(file_filter);
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .context("Logging already initialised")?;

    if !valid {
        tracing::warn!("Invalid log level, defaulting to 'info'");
    }

    start_log_cleanup_task(log_dir, prefix.to_string());

    Ok(LoggerGuard(guard))
}

fn start_log_cleanup_task(log_dir: PathBuf, prefix: String) {
    task::spawn(async move {
        loop {
            if let Err(e) = cleanup_old_logs(&log_dir, &prefix, MAX_AGE) {
                tracing::warn!("Failed to delete old log file: {}", e);
            }
            tokio::time::sleep(CLEANUP_INTERVAL).await;
        }
    });
}

/// Delete `<prefix>*.log` files older than `max_age`, returning how many went
fn cleanup_old_logs(log_dir: &Path, prefix: &str, max_age: Duration) -> std::io::Result<usize> {
    let now = SystemTime::now();
    let mut deleted = 0;

    for entry in fs::read_dir(log_dir)? {
        let path = entry?.path();

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !file_name.starts_with(prefix) || !file_name.ends_with(".log") {
            continue;
        }

        let modified = fs::metadata(&path)?.modified()?;
        if now.duration_since(modified).unwrap_or_default() > max_age {
            fs::remove_file(&path)?;
            deleted += 1;
            tracing::info!("Old log file deleted: {}", file_name);
        }
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_only_touches_own_logs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cosmodeck-backend.2024-05-01.log"), "old").unwrap();
        fs::write(dir.path().join("other-service.2024-05-01.log"), "keep").unwrap();
        fs::write(dir.path().join("cosmodeck-backend.notes"), "keep").unwrap();
        std::thread::sleep(Duration::from_millis(20));

        let deleted = cleanup_old_logs(dir.path(), "cosmodeck-backend", Duration::from_millis(1)).unwrap();
        assert_eq!(deleted, 1);
        assert!(!dir.path().join("cosmodeck-backend.2024-05-01.log").exists());
        assert!(dir.path().join("other-service.2024-05-01.log").exists());
        assert!(dir.path().join("cosmodeck-backend.notes").exists());
    }

    #[test]
    fn test_cleanup_keeps_fresh_logs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cosmodeck-backend.2024-05-01.log"), "fresh").unwrap();
        assert_eq!(cleanup_old_logs(dir.path(), "cosmodeck-backend", MAX_AGE).unwrap(), 0);
    }
}
