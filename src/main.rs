use inventory_service::{observability, server, AppState, Config, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    observability::init_tracing(&config);

    let state = AppState::build(config).await?;
    server::serve(state).await
}
