use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, auth};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Connect, migrate, seed the admin account and build the router.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.server.run_migrations {
        migration::Migrator::up(&db, None)
            .await
            .map_err(|e| StartupError::Migration(e.to_string()))?;
        info!("migrations applied");
    }

    if cfg.auth.uses_dev_secret() {
        warn!("JWT secret not configured; using the development default");
    }
    let state = auth::ServerState {
        db,
        auth: auth::ServerAuthConfig { jwt_secret: cfg.auth.jwt_secret.clone(), token_ttl_hours: cfg.auth.token_ttl_hours },
    };

    if let Some(admin) = &cfg.auth.admin {
        let user = state
            .auth_service()
            .ensure_admin(&admin.email, &admin.name, &admin.password)
            .await
            .map_err(|e| StartupError::InvalidConfig(format!("admin bootstrap: {e}")))?;
        info!(user_id = user.id, email = %user.email, "admin account ready");
    }

    Ok(routes::build_router(state, build_cors()))
}

/// Build the app from `cfg` and serve it until `shutdown` resolves.
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(&cfg).await?;
    let addr = bind_addr(&cfg)?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    serve(listener, app, shutdown).await
}

/// Accept until `shutdown` resolves, then wait for in-flight requests to finish.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("connections drained");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received, draining"),
        _ = terminate => info!("SIGTERM received, draining"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DatabaseConnection;

    fn offline_app() -> Router {
        let state = auth::ServerState {
            db: DatabaseConnection::Disconnected,
            auth: auth::ServerAuthConfig { jwt_secret: "startup-test".into(), token_ttl_hours: 1 },
        };
        routes::build_router(state, build_cors())
    }

    #[test]
    fn bind_addr_rejects_bad_host() {
        let mut cfg = AppConfig::default();
        assert_eq!(bind_addr(&cfg).unwrap().port(), 8080);
        cfg.server.host = "not a host".into();
        assert!(matches!(bind_addr(&cfg), Err(StartupError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn serve_returns_after_shutdown_signal() {
        let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(serve(listener, offline_app(), async move {
            let _ = stopped.await;
        }));

        let res = reqwest::get(format!("http://{addr}/health")).await.unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::OK);
        drop(res);

        stop.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
