use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tracker-api"));
        cmd.env("TRACKER_PORT", port.to_string())
            .env("TRACKER_BASE_URL", &base_url)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server sees DATABASE_URL when configured
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                // Ready on any health answer, even a degraded one
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Database-backed tests only run when the environment provides a database.
#[allow(dead_code)]
pub fn database_configured() -> bool {
    std::env::var("DATABASE_URL").is_ok()
}

/// Runs trackctl against the same environment. Used to provision users and
/// projects for the flow tests.
#[allow(dead_code)]
pub fn trackctl(args: &[&str]) -> Result<()> {
    let status = Command::new(env!("CARGO_BIN_EXE_trackctl"))
        .args(args)
        .status()
        .context("failed to run trackctl")?;
    anyhow::ensure!(status.success(), "trackctl {:?} failed", args);
    Ok(())
}

/// Logs in and returns a bearer token.
#[allow(dead_code)]
pub async fn login(base_url: &str, username: &str, password: &str) -> Result<String> {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/auth/login", base_url))
        .json(&serde_json::json!({"username": username, "password": password}))
        .send()
        .await?;
    anyhow::ensure!(resp.status().is_success(), "login failed: {}", resp.status());
    let body: serde_json::Value = resp.json().await?;
    body["data"]["token"]
        .as_str()
        .map(str::to_string)
        .context("login response had no token")
}
