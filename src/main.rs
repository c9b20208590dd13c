use warden::{App, ConfigBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigBuilder::new().from_env().build()?;
    warden::init_tracing_with_config(&config);

    tracing::info!(
        backend = ?config.revocation.backend,
        keys = config.auth.signing_keys.len(),
        level = %config.logging.level,
        "configuration loaded"
    );

    App::from_config(config)?.serve().await?;
    Ok(())
}
