use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn main() -> std::process::ExitCode {
    dotenv().ok();

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(service = "marketplace", event = "panic", %service_id, pid, message = %info, "unhandled panic occurred");
    }));

    // config.toml first, then TOKIO_WORKER_THREADS
    let worker_threads = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg.server.worker_threads,
        Err(_) => std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()),
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to build tokio runtime: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    rt.block_on(async move {
        // logging is initialised inside server::run once the config is known
        let result = server::run().await;
        match result {
            Ok(()) => {
                info!(service = "marketplace", event = "stop", %service_id, pid, version, "server stopped normally");
                std::process::ExitCode::SUCCESS
            }
            Err(e) => {
                common::utils::logging::init_logging_default();
                error!(service = "marketplace", event = "run_failed", %service_id, pid, version, error = %e, "server exited with error");
                std::process::ExitCode::FAILURE
            }
        }
    })
}
