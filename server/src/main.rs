use anyhow::Context;
use cti_core::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cti_server::init_tracing();

    let config = AppConfig::load_with_env().context("failed to load configuration")?;
    cti_server::run(config).await
}
