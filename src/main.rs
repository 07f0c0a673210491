use std::net::SocketAddr;
use std::sync::Arc;

use sentry_tower::{NewSentryLayer, SentryHttpLayer};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use media_audit::api::app;
use media_audit::app_state::AppState;
use media_audit::config::AppConfig;
use media_audit::error::Result;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();
}

#[cfg(not(feature = "local-bin"))]
fn init_sentry(conf: &AppConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = conf
        .sentry_dsn
        .clone()
        .or_else(|| std::env::var("SENTRY_DSN").ok())?;

    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            traces_sample_rate: 0.1,
            ..Default::default()
        },
    )))
}

#[cfg(feature = "local-bin")]
fn init_sentry(_conf: &AppConfig) -> Option<sentry::ClientInitGuard> {
    None
}

fn listen_addr(port: u16) -> SocketAddr {
    #[cfg(feature = "local-bin")]
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    #[cfg(not(feature = "local-bin"))]
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    addr
}

fn main() -> Result<()> {
    let conf = AppConfig::load()?;

    // the guard must be created before the async runtime starts
    let _guard = init_sentry(&conf);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(serve(conf))
}

async fn serve(conf: AppConfig) -> Result<()> {
    init_tracing();

    let shared_state = Arc::new(AppState::new(&conf)?);

    let router = app(shared_state).layer(
        ServiceBuilder::new()
            .layer(NewSentryLayer::<axum::extract::Request>::new_from_top())
            .layer(SentryHttpLayer::with_transaction())
            .layer(CorsLayer::permissive()),
    );

    let addr = listen_addr(conf.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    log::info!("listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
