use voicy_stats::config::StatsConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default level.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = StatsConfig::load()?;
    voicy_stats::run(config).await
}
