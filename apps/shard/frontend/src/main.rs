//! Shard Frontend - Entry Point

#[tokio::main]
async fn main() -> eyre::Result<()> {
    core_config::tracing::install_color_eyre();
    shard_frontend::run().await
}
