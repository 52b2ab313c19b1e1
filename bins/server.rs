use std::process::ExitCode;

use configs::AppConfig;
use tracing::{error, info};
use uuid::Uuid;

fn build_runtime(cfg: &AppConfig) -> std::io::Result<tokio::runtime::Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all().thread_name("dsmovie-worker");
    if let Some(n) = cfg.server.worker_threads {
        builder.worker_threads(n);
    }
    builder.build()
}

fn main() -> ExitCode {
    // .env first so RUST_LOG, LOG_FORMAT and the config overrides apply
    dotenvy::dotenv().ok();
    common::utils::logging::init_logging_from_env();

    let cfg = match AppConfig::load_or_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(path = %configs::config_path(), error = %format!("{e:#}"), "configuration rejected");
            return ExitCode::FAILURE;
        }
    };

    let instance_id = Uuid::new_v4();
    std::panic::set_hook(Box::new(move |info| {
        error!(%instance_id, message = %info, "panic");
    }));

    let rt = match build_runtime(&cfg) {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        %instance_id,
        version = env!("CARGO_PKG_VERSION"),
        host = %cfg.server.host,
        port = cfg.server.port,
        workers = cfg.server.worker_threads.unwrap_or_default(),
        "dsmovie starting"
    );
    match rt.block_on(server::run(cfg, server::shutdown_signal())) {
        Ok(()) => {
            info!(%instance_id, "dsmovie stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(%instance_id, error = %format!("{e:#}"), "dsmovie failed");
            ExitCode::FAILURE
        }
    }
}
