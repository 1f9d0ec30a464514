#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const JSON_API: &str = "application/vnd.api+json";

const TEST_JWT_SECRET: &str = "integration-secret-integration-secret";
const BINARY: &str = env!("CARGO_BIN_EXE_usergate-api");

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

/// Integration tests need a real PostgreSQL; without one they are skipped.
pub fn database_available() -> bool {
    let _ = dotenvy::dotenv();
    match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => true,
        _ => {
            eprintln!("DATABASE_URL not set, skipping integration test");
            false
        }
    }
}

fn command() -> Command {
    let mut cmd = Command::new(BINARY);
    cmd.env("JWT_SECRET", TEST_JWT_SECRET)
        .env_remove("JWT_SECRET_FILE")
        .env("SECURITY_SELF_OR_ADMIN_MODE", "corrected")
        .stdin(Stdio::null());
    cmd
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Inherit environment so the server sees DATABASE_URL
        let child = command()
            .arg("serve")
            .env("HOST", "127.0.0.1")
            .env("PORT", port.to_string())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
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
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Email that does not collide with earlier runs against the same database
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.test", prefix, uuid::Uuid::new_v4().simple())
}

pub struct Caller {
    pub email: String,
    pub token: String,
}

/// Bootstrap an admin through the `create-admin` subcommand
pub fn create_admin() -> Result<Caller> {
    let email = unique_email("admin");
    let output = command()
        .args(["create-admin", "--email", &email, "--password", "integration-password"])
        .output()
        .context("failed to run create-admin")?;
    anyhow::ensure!(
        output.status.success(),
        "create-admin failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let token = String::from_utf8(output.stdout)?.trim().to_string();
    anyhow::ensure!(!token.is_empty(), "create-admin printed no token");
    Ok(Caller { email, token })
}

pub fn users_doc(attributes: Value) -> String {
    json!({ "data": { "type": "users", "attributes": attributes } }).to_string()
}

pub trait WithCaller {
    fn caller(self, caller: &Caller) -> Self;
    fn json_api(self, body: String) -> Self;
}

impl WithCaller for reqwest::RequestBuilder {
    fn caller(self, caller: &Caller) -> Self {
        self.header("email", &caller.email).header("access-token", &caller.token)
    }

    fn json_api(self, body: String) -> Self {
        self.header("content-type", JSON_API).body(body)
    }
}
