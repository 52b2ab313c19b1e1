use std::net::SocketAddr;

use configs::{AdminBootstrap, AppConfig};
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

struct TestApp {
    base_url: String,
    admin_email: String,
}

const ADMIN_PASSWORD: &str = "Adm1nSecret";

fn db_tests_disabled() -> bool {
    let _ = dotenvy::dotenv();
    std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err()
}

async fn start_server() -> anyhow::Result<TestApp> {
    // Ensure config comes from env, not from a developer's config.toml
    std::env::set_var("CONFIG_PATH", "/nonexistent-config-for-tests.toml");

    let admin_email = format!("admin_{}@example.com", Uuid::new_v4().simple());
    let mut cfg = AppConfig::from_env();
    cfg.auth.jwt_secret = "e2e-test-secret".into();
    cfg.auth.admin = Some(AdminBootstrap { email: admin_email.clone(), name: "E2E Admin".into(), password: ADMIN_PASSWORD.into() });
    cfg.normalize_and_validate()?;

    let app = server::startup::build_app(&cfg).await?;
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = server::startup::serve(listener, app, std::future::pending()).await {
            eprintln!("server error: {e:#}");
        }
    });

    Ok(TestApp { base_url, admin_email })
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("reqwest client")
}

async fn login(c: &reqwest::Client, app: &TestApp, email: &str, password: &str) -> anyhow::Result<String> {
    let res = c.post(format!("{}/auth/login", app.base_url))
        .json(&json!({"email": email, "password": password}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    Ok(body["token"].as_str().unwrap_or_default().to_string())
}

async fn register_client(c: &reqwest::Client, app: &TestApp) -> anyhow::Result<(String, String)> {
    let email = format!("user_{}@example.com", Uuid::new_v4().simple());
    let password = "S3curePass!";
    let res = c.post(format!("{}/auth/register", app.base_url))
        .json(&json!({"email": email, "name": "Tester", "password": password}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    Ok((email, password.to_string()))
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    if db_tests_disabled() { return Ok(()); }
    let app = start_server().await?;
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");
    Ok(())
}

#[tokio::test]
async fn e2e_auth_register_login_and_cookie() -> anyhow::Result<()> {
    if db_tests_disabled() { return Ok(()); }
    let app = start_server().await?;
    let c = client();
    let (email, password) = register_client(&c, &app).await?;

    // duplicate e-mail
    let res = c.post(format!("{}/auth/register", app.base_url))
        .json(&json!({"email": email, "name": "Again", "password": password}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CONFLICT);

    // Login -> set-cookie
    let res = c.post(format!("{}/auth/login", app.base_url))
        .json(&json!({"email": email, "password": password}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert!(res.headers().get("set-cookie").is_some());

    let res = c.post(format!("{}/auth/login", app.base_url))
        .json(&json!({"email": email, "password": "wrong-password"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn e2e_movie_lifecycle_with_scores() -> anyhow::Result<()> {
    if db_tests_disabled() { return Ok(()); }
    let app = start_server().await?;
    let admin = reqwest::Client::new();
    let admin_token = login(&admin, &app, &app.admin_email, ADMIN_PASSWORD).await?;
    let bearer = format!("Bearer {admin_token}");

    let marker = Uuid::new_v4().simple().to_string();
    let res = admin.post(format!("{}/movies", app.base_url))
        .header("Authorization", &bearer)
        .json(&json!({"title": format!("The Witcher {marker}"), "release_year": 2019, "image": "https://example.com/witcher.jpg"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let movie = res.json::<Value>().await?;
    let id = movie["id"].as_i64().unwrap_or_default();
    assert_eq!(movie["count"], 0);

    let res = admin.get(format!("{}/movies?title={}&page=1&per_page=5", app.base_url, &marker[..12])).send().await?;
    let page = res.json::<Value>().await?;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["id"], id);

    // client votes through the cookie session
    let voter = client();
    let (email, password) = register_client(&voter, &app).await?;
    login(&voter, &app, &email, &password).await?;
    let res = voter.put(format!("{}/scores", app.base_url))
        .json(&json!({"movie_id": id, "score": 4.0}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let res = voter.put(format!("{}/scores", app.base_url))
        .json(&json!({"movie_id": id, "score": 3.0}))
        .send().await?;
    let rated = res.json::<Value>().await?;
    assert_eq!(rated["count"], 1);
    assert_eq!(rated["score"], 3.0);

    let res = voter.put(format!("{}/scores", app.base_url))
        .json(&json!({"movie_id": id, "score": 7.5}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::UNPROCESSABLE_ENTITY);

    // clients cannot edit the catalogue
    let res = voter.delete(format!("{}/movies/{id}", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::FORBIDDEN);

    // scored movies cannot be removed
    let res = admin.delete(format!("{}/movies/{id}", app.base_url)).header("Authorization", &bearer).send().await?;
    assert_eq!(res.status(), HttpStatusCode::CONFLICT);
    let res = admin.get(format!("{}/movies/{id}", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let res = admin.put(format!("{}/movies/{id}", app.base_url))
        .header("Authorization", &bearer)
        .json(&json!({"title": format!("The Witcher II {marker}"), "image": "https://example.com/witcher2.jpg"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let updated = res.json::<Value>().await?;
    assert_eq!(updated["score"], 3.0);
    assert_eq!(updated["release_year"], Value::Null);

    let res = admin.delete(format!("{}/movies/{}", app.base_url, i64::MAX)).header("Authorization", &bearer).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_tampered_token_unauthorized() -> anyhow::Result<()> {
    if db_tests_disabled() { return Ok(()); }
    let app = start_server().await?;
    let c = client();
    let (email, password) = register_client(&c, &app).await?;
    let token = login(&c, &app, &email, &password).await?;

    let res = reqwest::Client::new().put(format!("{}/scores", app.base_url))
        .header("Authorization", format!("Bearer {token}x"))
        .json(&json!({"movie_id": 1, "score": 4.0}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);
    Ok(())
}
