use std::time::Duration;

use anyhow::{Result, anyhow};
use movlib_server::config::{Parser, ServerConfig};
use movlib_server::{build_state, run_graceful_with_state};
use rand::Rng as _;
use tempfile::TempDir;
use tokio::sync::oneshot;
use url::Url;

fn random_port() -> Result<u16> {
    let mut rng = rand::rng();

    let mut retries = 3;
    while retries > 0 {
        let port: u16 = rng.random_range(3030..4030);
        let addr: std::net::SocketAddr = format!("127.0.0.1:{}", port).parse()?;
        match std::net::TcpStream::connect_timeout(&addr, std::time::Duration::from_millis(100)) {
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => return Ok(port),
            Err(_) => retries -= 1,
            Ok(_) => retries -= 1,
        }
    }

    Err(anyhow!("Could not find a free port"))
}

pub struct ServerGuard {
    pub base_url: Url,
    shutdown: Option<oneshot::Sender<()>>,
    #[allow(dead_code)]
    data_dir: TempDir,
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

pub fn test_config(test_name: &str) -> Result<(ServerConfig, TempDir)> {
    let tmp_data_dir = TempDir::with_prefix(format!("{}_", test_name))?;
    let data_dir = tmp_data_dir.path().to_string_lossy().to_string();
    let port = random_port()?.to_string();
    let base_url = format!("http://localhost:{}", port);
    let args = &[
        "movlib-e2e-tests",
        "--data-dir",
        &data_dir,
        "--port",
        &port,
        "--base-url",
        &base_url,
    ];
    let config = ServerConfig::try_parse_from(args)?;
    Ok((config, tmp_data_dir))
}

/// Starts a server on a free port with a throwaway data directory and waits
/// until it answers health checks. Dropping the guard shuts the server down.
pub async fn launch_env(test_name: &str) -> Result<(reqwest::Client, ServerGuard)> {
    let (config, data_dir) = test_config(test_name)?;
    let base_url = config.base_url.clone();
    let state = build_state(&config).await?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        if let Err(e) = run_graceful_with_state(config, state, async {
            let _ = shutdown_rx.await;
        })
        .await
        {
            eprintln!("Server failed: {e}");
        }
    });

    let guard = ServerGuard {
        base_url: base_url.clone(),
        shutdown: Some(shutdown_tx),
        data_dir,
    };

    let client = reqwest::Client::new();
    let health_url = base_url.join("health")?;
    for _ in 0..100 {
        if let Ok(response) = client.get(health_url.clone()).send().await {
            if response.status().is_success() {
                return Ok((client, guard));
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    Err(anyhow!("Server did not become healthy"))
}

pub fn extend_url(base: &Url, segment: impl std::fmt::Display) -> Url {
    let mut url = base.clone();
    url.path_segments_mut()
        .expect("base url cannot be a base")
        .push(&segment.to_string());
    url
}
