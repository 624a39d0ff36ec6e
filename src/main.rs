use std::net::SocketAddr;
use std::sync::Arc;

use timeclock_backend::{
    config::{get_config, init_config, LogFormat},
    database::{
        pool::{create_pool, run_migrations},
        PgStore,
    },
    routes,
    utils::time::SystemClock,
    AppState,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    init_tracing(config.log_format);

    let pool = create_pool(config).await?;
    run_migrations(&pool).await?;
    info!("Database migrations applied");

    let app_state = AppState::new(
        Arc::new(PgStore::new(pool)),
        Arc::new(SystemClock),
        config.reporting_zone,
        &config.jwt_secret,
    );
    info!(zone = ?config.reporting_zone, "Reporting windows configured");

    let app = routes::router(app_state, config.api_rps);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
