mod common;

use anyhow::Result;
use invoice_api::auth::{generate_jwt, Claims};
use mongodb::bson::oid::ObjectId;
use reqwest::header::{AUTHORIZATION, COOKIE, SET_COOKIE};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn signup_signin_signout() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };

    let res = app
        .post(
            "/auth/signup",
            json!({ "name": "Ann", "email": "ann@x.com", "password": "s3cret" }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "User created successfully");

    let res = app
        .post("/auth/signin", json!({ "email": "ANN@x.com", "password": "s3cret" }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=86400"));
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "success");
    let token = body["token"].as_str().unwrap().to_string();

    let res = app
        .client
        .get(app.url("/auth/signout"))
        .header(COOKIE, format!("token={}", token))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let cleared = res.headers().get(SET_COOKIE).unwrap().to_str()?.to_string();
    assert!(cleared.contains("Max-Age=0"));

    let res = app
        .client
        .get(app.url("/auth/signout"))
        .header(AUTHORIZATION, format!("Bearer {}", token))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    app.cleanup().await
}

#[tokio::test]
async fn signin_failures() -> Result<()> {
    let Some(app) = common::spawn_app().await? else {
        return Ok(());
    };

    app.login("ann@x.com", "s3cret").await?;

    let res = app
        .post("/auth/signin", json!({ "email": "ann@x.com", "password": "wrong" }))
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "INVALID_CREDENTIALS");

    let res = app
        .post("/auth/signin", json!({ "email": "nobody@x.com", "password": "s3cret" }))
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .post(
            "/auth/signup",
            json!({ "name": "Dup", "email": "ann@x.com", "password": "x" }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    app.cleanup().await
}

#[tokio::test]
async fn gate_protects_resources_when_required() -> Result<()> {
    let Some(app) = common::spawn_app_with(|config| config.security.require_auth = true).await?
    else {
        return Ok(());
    };

    assert_eq!(app.get("/customers").await?.status(), StatusCode::UNAUTHORIZED);

    let token = app.login("ann@x.com", "s3cret").await?;
    let res = app
        .client
        .get(app.url("/customers"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // A token for a deleted user no longer opens the gate
    let me: Value = app
        .client
        .get(app.url("/users"))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    let id = me["data"][0]["id"].as_str().unwrap().to_string();
    let res = app
        .client
        .delete(app.url(&format!("/users/{}", id)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .client
        .get(app.url("/customers"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "INVALID_TOKEN");

    app.cleanup().await
}

#[tokio::test]
async fn non_canonical_subject_is_forbidden() -> Result<()> {
    let Some(app) = common::spawn_app_with(|config| config.security.require_auth = true).await?
    else {
        return Ok(());
    };

    let token = app.login("ann@x.com", "s3cret").await?;
    let users: Value = app
        .client
        .get(app.url("/users"))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    let id = ObjectId::parse_str(users["data"][0]["id"].as_str().unwrap())?;

    // Same user, subject spelled in uppercase hex
    let mut claims = Claims::new(&id, 1)?;
    claims.sub = id.to_hex().to_uppercase();
    let forged = generate_jwt(&claims, common::JWT_SECRET)?;

    let res = app
        .client
        .get(app.url("/customers"))
        .bearer_auth(&forged)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "FORBIDDEN");
    assert_eq!(body["error"], true);

    app.cleanup().await
}
