use std::path::Path;

use anyhow::{anyhow, Result};
use recipehub_dal::user::{CreateUser, UserRepository};
use recipehub_server::config::{Parser, ServerConfig};
use recipehub_types::general::ValidEmail;
use rand::Rng as _;
use reqwest::Url;
use serde_json::json;
use tempfile::TempDir;
use tracing::{debug, info};

pub mod rest;

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

pub struct ConfigGuard {
    #[allow(dead_code)]
    data_dir: TempDir,
}

pub fn test_config(
    test_name: &str,
    base_dir: &Path,
    extra_args: &[&str],
) -> Result<(ServerConfig, ConfigGuard)> {
    let tmp_data_dir = TempDir::with_prefix_in(format!("{}_", test_name), base_dir)?;
    let data_dir = tmp_data_dir.path().to_string_lossy().to_string();
    let port = random_port()?;
    let port = port.to_string();
    let base_url = format!("http://localhost:{}", port);
    let mut args = vec![
        "recipehub-e2e-tests",
        "--data-dir",
        &data_dir,
        "--port",
        &port,
        "--base-url",
        &base_url,
    ];
    args.extend_from_slice(extra_args);
    let config = ServerConfig::try_parse_from(args)?;
    Ok((
        config,
        ConfigGuard {
            data_dir: tmp_data_dir,
        },
    ))
}

pub async fn prepare_env(test_name: &str) -> Result<(ServerConfig, ConfigGuard)> {
    prepare_env_with(test_name, &[]).await
}

/// Prepares config in a fresh data directory, with migrated database
pub async fn prepare_env_with(
    test_name: &str,
    extra_args: &[&str],
) -> Result<(ServerConfig, ConfigGuard)> {
    let base_dir = std::env::temp_dir();
    let (args, guard) = test_config(test_name, &base_dir, extra_args)?;
    let pool = recipehub_dal::new_pool(&args.database_url()).await?;
    recipehub_dal::migrate(&pool).await?;
    pool.close().await;
    Ok((args, guard))
}

pub async fn spawn_server(args: ServerConfig) -> Result<()> {
    let health_url = args.base_url.join("health")?;
    tokio::spawn(async move {
        if let Err(e) = recipehub_server::run::run(args).await {
            tracing::error!("Server failed: {e}");
        }
    });

    let client = reqwest::Client::new();
    for _ in 0..50 {
        match client.get(health_url.clone()).send().await {
            Ok(response) if response.status().is_success() => return Ok(()),
            _ => tokio::time::sleep(std::time::Duration::from_millis(100)).await,
        }
    }
    Err(anyhow!("Server did not start"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestUser {
    Admin,
    Cook,
    Anonymous,
}

pub const TEST_PASSWORD: &str = "password123";

impl TestUser {
    pub fn username(&self) -> &'static str {
        match self {
            TestUser::Admin => "admin",
            TestUser::Cook => "cook",
            TestUser::Anonymous => "anonymous",
        }
    }

    fn email(&self) -> ValidEmail {
        ValidEmail::cheat(format!("{}@example.com", self.username()))
    }

    fn roles(&self) -> Option<Vec<String>> {
        match self {
            TestUser::Admin => Some(vec!["admin".to_string()]),
            _ => None,
        }
    }
}

pub fn new_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    Ok(client)
}

/// Creates the user directly in the database
pub async fn create_user(args: &ServerConfig, user: TestUser) -> Result<i64> {
    let pool = recipehub_dal::new_pool(&args.database_url()).await?;
    let repository = UserRepository::new(pool);
    let created = repository
        .create(CreateUser {
            username: user.username().to_string(),
            email: user.email(),
            password: TEST_PASSWORD.to_string(),
            roles: user.roles(),
        })
        .await?;
    Ok(created.id)
}

pub async fn login(client: &reqwest::Client, base_url: &Url, username: &str) -> Result<()> {
    let response = client
        .post(base_url.join("auth/login")?)
        .form(&[("username", username), ("password", TEST_PASSWORD)])
        .send()
        .await?;
    debug!("Login response: {:#?}", response);
    if !response.status().is_success() {
        return Err(anyhow!("Login failed with {}", response.status()));
    }
    Ok(())
}

/// Starts the server and returns a client logged in as `user`
pub async fn launch_env(args: ServerConfig, user: TestUser) -> Result<(reqwest::Client, Url)> {
    let base_url = args.base_url.clone();
    if user != TestUser::Anonymous {
        create_user(&args, user).await?;
    }
    spawn_server(args).await?;

    let client = new_client()?;
    if user != TestUser::Anonymous {
        login(&client, &base_url, user.username()).await?;
        info!("Logged in as {}", user.username());
    }
    Ok((client, base_url))
}

pub fn recipe_payload(title: &str) -> serde_json::Value {
    json!({
        "title": title,
        "description": format!("Description of {title}"),
        "ingredients": "flour\nwater\nsalt",
        "instructions": "mix\nbake",
        "prep_time": 10,
        "cook_time": 30,
        "servings": 4,
        "difficulty": "easy",
        "category": "Bread"
    })
}
