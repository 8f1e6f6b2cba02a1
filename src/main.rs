use anyhow::Context;
use scour_predictor::{
    config::AppConfig,
    dispatch,
    model::Artifacts,
    types::{ModelChoice, RawInputs, FEATURE_NAMES},
    web::{self, AppState},
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = AppConfig::from_env()?;
    let paths = cfg.artifact_paths();
    tracing::info!(
        "loading artifacts scaler={} rf={} gpr={}",
        paths.scaler.display(),
        paths.rf.display(),
        paths.gpr.display()
    );

    // Nothing is served unless all three artifacts load.
    let artifacts = Artifacts::load(&paths).context("artifact load failed")?;

    // Warmup with the form defaults so a width mismatch fails here, not on the first request
    for choice in ModelChoice::ALL {
        let p = dispatch::run(&RawInputs::default(), choice, &cfg.bounds, &artifacts)
            .with_context(|| format!("warmup prediction with {} failed", choice.label()))?;
        tracing::info!("warmup {} ok: {:?}", choice, p.result);
    }
    tracing::info!("feature order[{}]: {:?}", FEATURE_NAMES.len(), FEATURE_NAMES);

    let state = AppState {
        artifacts: Arc::new(artifacts),
        bounds: cfg.bounds,
    };
    let app = web::router(state);

    let addr = cfg.socket_addr()?;
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
