use std::path::Path;
use std::sync::Once;
use tracing_appender::non_blocking::WorkerGuard;

static INIT: Once = Once::new();

/// Log to `<log_dir>/mash.log`. The terminal belongs to the renderer, so
/// there is no stderr output. Filter comes from `MASH_LOG`.
///
/// Keep the returned guard alive until exit so buffered lines get flushed.
pub fn init_tracing(log_dir: &Path) -> Option<WorkerGuard> {
    let mut guard = None;
    INIT.call_once(|| {
        let file_appender = tracing_appender::rolling::never(log_dir, "mash.log");
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::fmt()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("MASH_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mash=info")),
            )
            .init();
        guard = Some(worker_guard);
    });
    guard
}
