#![allow(dead_code)]

use anyhow::{Context, Result};
use mongodb::bson::oid::ObjectId;
use reqwest::{Response, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use invoice_api::config::AppConfig;
use invoice_api::database::Database;
use invoice_api::server::{ensure_indexes, router};
use invoice_api::state::AppState;

pub const JWT_SECRET: &str = "integration-test-secret";

/// In-process server bound to a free port, backed by a throwaway database.
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub state: AppState,
}

pub fn test_config(db_name: &str) -> AppConfig {
    let mut config = AppConfig::development();
    config.database.uri =
        std::env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://127.0.0.1:27017".to_string());
    config.database.name = db_name.to_string();
    config.database.connect_timeout_secs = 2;
    config.security.jwt_secret = JWT_SECRET.to_string();
    config.security.bcrypt_cost = 4;
    config
}

/// `None` when MongoDB is unreachable; callers skip in that case.
pub async fn spawn_app() -> Result<Option<TestApp>> {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(customize: impl FnOnce(&mut AppConfig)) -> Result<Option<TestApp>> {
    let db_name = format!("invoice_api_test_{}", ObjectId::new().to_hex());
    let mut config = test_config(&db_name);
    customize(&mut config);

    let db = match Database::connect(&config.database).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("skipping: MongoDB unavailable at {} ({})", config.database.uri, e);
            return Ok(None);
        }
    };
    ensure_indexes(&db).await?;

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;

    let state = AppState::new(db, config);
    let app = router(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(Some(TestApp {
        base_url: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        state,
    }))
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Response> {
        Ok(self.client.post(self.url(path)).json(&body).send().await?)
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<Response> {
        Ok(self.client.patch(self.url(path)).json(&body).send().await?)
    }

    pub async fn delete(&self, path: &str) -> Result<Response> {
        Ok(self.client.delete(self.url(path)).send().await?)
    }

    /// POST and return the `insertedId` of a 201.
    pub async fn create(&self, path: &str, body: Value) -> Result<String> {
        let res = self.post(path, body).await?;
        anyhow::ensure!(
            res.status() == StatusCode::CREATED,
            "create {} returned {}",
            path,
            res.status()
        );
        let body: Value = res.json().await?;
        body["insertedId"]
            .as_str()
            .map(String::from)
            .context("missing insertedId")
    }

    pub async fn create_customer(&self, name: &str, email: &str) -> Result<String> {
        self.create("/customers", json!({ "name": name, "email": email }))
            .await
    }

    /// Sign up and sign in, returning the issued token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let res = self
            .post(
                "/auth/signup",
                json!({ "name": "Test User", "email": email, "password": password }),
            )
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "signup returned {}", res.status());

        let res = self
            .post("/auth/signin", json!({ "email": email, "password": password }))
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "signin returned {}", res.status());
        let body: Value = res.json().await?;
        body["token"].as_str().map(String::from).context("missing token")
    }

    pub async fn cleanup(self) -> Result<()> {
        self.state.db.handle().drop(None).await?;
        Ok(())
    }
}
