mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn password_is_never_returned() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };

    let id = app
        .create(
            "/users",
            json!({ "name": "Ann", "email": "ann@x.com", "password": "s3cret" }),
        )
        .await?;

    let body: Value = app.get(&format!("/users/{}", id)).await?.json().await?;
    assert_eq!(body["email"], "ann@x.com");
    assert!(body.get("password").is_none());

    let page: Value = app.get("/users").await?.json().await?;
    assert_eq!(page["totalRows"], 1);
    assert!(page["data"][0].get("password").is_none());

    app.cleanup().await
}

#[tokio::test]
async fn password_update_is_rehashed() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };

    app.login("ann@x.com", "first").await?;
    let page: Value = app.get("/users?keyword=ann").await?.json().await?;
    let id = page["data"][0]["id"].as_str().unwrap().to_string();

    let res = app
        .patch(&format!("/users/{}", id), json!({ "password": "second" }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .post("/auth/signin", json!({ "email": "ann@x.com", "password": "first" }))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let res = app
        .post("/auth/signin", json!({ "email": "ann@x.com", "password": "second" }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    app.cleanup().await
}

#[tokio::test]
async fn invalid_email_is_rejected() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };

    let res = app
        .post("/users", json!({ "name": "Ann", "email": "ann", "password": "x" }))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["errors"][0]["tag"], "email");

    app.cleanup().await
}
