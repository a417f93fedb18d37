//! Live end-to-end API coverage against a running quaderno instance.
//!
//! - Sends real HTTP requests to `http://127.0.0.1:8080` (override with
//!   `QUADERNO_LIVE_BASE_URL`).
//! - Marked `#[ignore]` so it only runs manually after starting the server
//!   with a database, a cache, and a token secret configured.

use reqwest::{Client, Method, StatusCode};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Brief delay so the second read lands after the first one filled the cache.
const CACHE_PROPAGATION_DELAY: Duration = Duration::from_millis(100);

fn base_url() -> String {
    std::env::var("QUADERNO_LIVE_BASE_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
        .trim_end_matches('/')
        .to_string()
}

fn current_suffix() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}", now.as_secs())
}

#[tokio::test]
#[ignore]
async fn live_api_end_to_end() -> TestResult<()> {
    let client = Client::builder().build()?;
    let base = base_url();
    let suf = current_suffix();
    let username = format!("abhishek-{suf}");
    let password = "abhi@123";

    // ACCOUNTS
    let created = request(
        &client,
        &base,
        Method::POST,
        "/register",
        None,
        &[StatusCode::CREATED],
        Some(json!({"username": username, "password": password})),
    )
    .await?;
    assert!(
        created.pointer("/id").and_then(Value::as_i64).is_some(),
        "register should return the new user id: {created}"
    );

    request(
        &client,
        &base,
        Method::POST,
        "/register",
        None,
        &[StatusCode::CONFLICT],
        Some(json!({"username": username, "password": "other"})),
    )
    .await?;

    request(
        &client,
        &base,
        Method::POST,
        "/register",
        None,
        &[StatusCode::BAD_REQUEST],
        Some(json!({"username": "", "password": ""})),
    )
    .await?;

    request(
        &client,
        &base,
        Method::POST,
        "/login",
        None,
        &[StatusCode::UNAUTHORIZED],
        Some(json!({"username": username, "password": "wrong"})),
    )
    .await?;

    let login = request(
        &client,
        &base,
        Method::POST,
        "/login",
        None,
        &[StatusCode::OK],
        Some(json!({"username": username, "password": password})),
    )
    .await?;
    let token = login
        .pointer("/token")
        .and_then(Value::as_str)
        .ok_or("login response should carry a token")?
        .to_string();
    if token.len() < 20 {
        return Err(format!("token looks truncated: {token:?}").into());
    }

    // TOKEN GATE
    request(
        &client,
        &base,
        Method::GET,
        "/todos",
        None,
        &[StatusCode::UNAUTHORIZED],
        None,
    )
    .await?;

    request(
        &client,
        &base,
        Method::GET,
        "/todos",
        Some("not-a-jwt"),
        &[StatusCode::UNAUTHORIZED],
        None,
    )
    .await?;

    // TODOS
    let todo = request(
        &client,
        &base,
        Method::POST,
        "/todos",
        Some(&token),
        &[StatusCode::CREATED],
        Some(json!({"task": "buy milk"})),
    )
    .await?;
    let todo_id = todo
        .pointer("/id")
        .and_then(Value::as_i64)
        .ok_or("created todo should carry an id")?;

    let listed = request(
        &client,
        &base,
        Method::GET,
        "/todos",
        Some(&token),
        &[StatusCode::OK],
        None,
    )
    .await?;
    let tasks: Vec<&str> = listed
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.pointer("/task").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();
    assert!(tasks.contains(&"buy milk"), "list should include the new todo");

    // Read twice; the second response comes from the cache and must match.
    let first = request(
        &client,
        &base,
        Method::GET,
        &format!("/todos/{todo_id}"),
        Some(&token),
        &[StatusCode::OK],
        None,
    )
    .await?;
    tokio::time::sleep(CACHE_PROPAGATION_DELAY).await;
    let second = request(
        &client,
        &base,
        Method::GET,
        &format!("/todos/{todo_id}"),
        Some(&token),
        &[StatusCode::OK],
        None,
    )
    .await?;
    assert_eq!(first, second, "cached read should match the stored todo");

    request(
        &client,
        &base,
        Method::POST,
        "/todos",
        Some(&token),
        &[StatusCode::BAD_REQUEST],
        Some(json!({"task": ""})),
    )
    .await?;

    request(
        &client,
        &base,
        Method::GET,
        "/todos/abc",
        Some(&token),
        &[StatusCode::BAD_REQUEST],
        None,
    )
    .await?;

    let updated = request(
        &client,
        &base,
        Method::PUT,
        &format!("/todos/{todo_id}"),
        Some(&token),
        &[StatusCode::OK],
        Some(json!({"task": "buy oat milk", "completed": true})),
    )
    .await?;
    assert_eq!(
        updated.pointer("/completed").and_then(Value::as_bool),
        Some(true)
    );

    // The update invalidated the cache; a fresh read sees the new text.
    let reread = request(
        &client,
        &base,
        Method::GET,
        &format!("/todos/{todo_id}"),
        Some(&token),
        &[StatusCode::OK],
        None,
    )
    .await?;
    assert_eq!(
        reread.pointer("/task").and_then(Value::as_str),
        Some("buy oat milk")
    );

    request(
        &client,
        &base,
        Method::DELETE,
        &format!("/todos/{todo_id}"),
        Some(&token),
        &[StatusCode::NO_CONTENT],
        None,
    )
    .await?;

    request(
        &client,
        &base,
        Method::GET,
        &format!("/todos/{todo_id}"),
        Some(&token),
        &[StatusCode::NOT_FOUND],
        None,
    )
    .await?;

    // HEALTH
    request(
        &client,
        &base,
        Method::GET,
        "/healthz",
        None,
        &[StatusCode::NO_CONTENT],
        None,
    )
    .await?;

    Ok(())
}

async fn request(
    client: &Client,
    base: &str,
    method: Method,
    path: &str,
    token: Option<&str>,
    expected: &[StatusCode],
    payload: Option<Value>,
) -> TestResult<Value> {
    let url = format!("{}{}", base, path);
    let method_str = method.to_string();
    let mut req = client.request(method, &url);
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    if let Some(payload) = payload {
        req = req.json(&payload);
    }

    let resp = req.send().await.map_err(|e| map_net_err(e, &url))?;
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    if !expected.contains(&status) {
        let exp: HashSet<_> = expected.iter().collect();
        return Err(format!(
            "{} {} expected {:?}, got {} body: {}",
            method_str, url, exp, status, body
        )
        .into());
    }

    Ok(serde_json::from_str(&body).unwrap_or(Value::Null))
}

fn map_net_err(err: reqwest::Error, url: &str) -> Box<dyn std::error::Error> {
    if err.is_connect() {
        format!("Failed to connect to {url}. Start the quaderno server before running this test.")
            .into()
    } else {
        err.into()
    }
}
