use movlib_server::{Result, build_state, config::ServerConfig, run_with_state};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = ServerConfig::load()?;
    let state = build_state(&args).await?;
    run_with_state(args, state).await
}
