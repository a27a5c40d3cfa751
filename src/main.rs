mod app;
mod config;
mod error;
mod identity;
mod issues;
mod notify;
mod photos;
mod projections;
mod reputation;
mod seed;
mod state;
mod storage;
mod store;
#[cfg(test)]
mod test_support;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "civicpulse=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init().await?;

    if app_state.config.seed_demo_data {
        seed::seed_demo_data(&app_state.repo).await?;
    }

    app::serve(app::build_app(app_state)).await
}
