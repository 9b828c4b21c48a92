use std::sync::Arc;

use chrono::Utc;
use farmhub_auth::JwtClaims;
use farmhub_core::{SessionId, UserId};
use farmhub_infra::{Repositories, Services};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};

const JWT_SECRET: &str = "black-box-secret";
const ADMIN_LOGIN: &str = "admin";
const ADMIN_PASSWORD: &str = "admin-password";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod over in-memory storage, bound to an ephemeral port.
        let services = Arc::new(Services::new(Repositories::in_memory(), JWT_SECRET.as_bytes()));
        services
            .seed_admin(ADMIN_LOGIN, ADMIN_PASSWORD, Utc::now())
            .await
            .expect("failed to seed admin");

        let app = farmhub_api::app::build_app(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, client: reqwest::Client::new(), handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn login(&self, login: &str, password: &str) -> String {
        let res = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "login": login, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        body["token"].as_str().expect("token in login response").to_string()
    }

    async fn admin_token(&self) -> String {
        self.login(ADMIN_LOGIN, ADMIN_PASSWORD).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn farm_body(name: &str) -> Value {
    json!({
        "name": name,
        "producer_number": "PL-123",
        "nip": "526-025-02-74",
        "address": "Wiejska 1",
    })
}

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::spawn().await;
    let res = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let server = TestServer::spawn().await;

    let res = server.client.get(server.url("/farms")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");

    let res = server
        .client
        .get(server.url("/auth/me"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let server = TestServer::spawn().await;
    let res = server
        .client
        .post(server.url("/auth/login"))
        .json(&json!({ "login": ADMIN_LOGIN, "password": "nope-nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_then_me_returns_the_user() {
    let server = TestServer::spawn().await;
    let token = server.admin_token().await;

    let res = server
        .client
        .get(server.url("/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user"]["login"], ADMIN_LOGIN);
    assert_eq!(body["user"]["is_admin"], true);
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn validly_signed_token_without_session_is_rejected() {
    let server = TestServer::spawn().await;
    let claims = JwtClaims::new(UserId::new(), SessionId::new(), "ghost", false, Utc::now());
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();

    let res = server
        .client
        .get(server.url("/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_invalidates_the_token() {
    let server = TestServer::spawn().await;
    let token = server.admin_token().await;

    let res = server
        .client
        .post(server.url("/auth/logout"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = server
        .client
        .get(server.url("/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_permission_is_forbidden() {
    let server = TestServer::spawn().await;
    let admin = server.admin_token().await;

    let res = server
        .client
        .post(server.url("/users"))
        .bearer_auth(&admin)
        .json(&json!({
            "login": "viewer",
            "name": "Feed Viewer",
            "password": "viewer-password",
            "permissions": ["feeds.view"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["permissions"], json!(["feeds.view"]));

    let token = server.login("viewer", "viewer-password").await;

    let res = server
        .client
        .get(server.url("/farms"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .client
        .get(server.url("/feed-deliveries"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = server
        .client
        .get(server.url("/auth/check-permission?permission=farms.view"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["granted"], false);
}

#[tokio::test]
async fn invalid_input_returns_field_errors() {
    let server = TestServer::spawn().await;
    let token = server.admin_token().await;

    let res = server
        .client
        .post(server.url("/farms"))
        .bearer_auth(&token)
        .json(&json!({ "name": " ", "producer_number": "PL-1", "nip": "123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"nip"));
}

#[tokio::test]
async fn malformed_path_id_is_bad_request() {
    let server = TestServer::spawn().await;
    let token = server.admin_token().await;

    let res = server
        .client
        .get(server.url("/farms/not-a-uuid"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");
}

#[tokio::test]
async fn farm_lifecycle_over_http() {
    let server = TestServer::spawn().await;
    let token = server.admin_token().await;

    let res = server
        .client
        .post(server.url("/farms"))
        .bearer_auth(&token)
        .json(&farm_body("Ferma Pod Lasem"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let farm: Value = res.json().await.unwrap();
    let farm_id = farm["id"].as_str().unwrap().to_string();

    let res = server
        .client
        .post(server.url(&format!("/farms/{farm_id}/henhouses")))
        .bearer_auth(&token)
        .json(&json!({ "name": "Kurnik 1", "code": "K1", "area_m2": 1200.0, "description": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let henhouse: Value = res.json().await.unwrap();
    let henhouse_id = henhouse["id"].as_str().unwrap().to_string();

    let res = server
        .client
        .post(server.url(&format!("/farms/{farm_id}/cycles")))
        .bearer_auth(&token)
        .json(&json!({ "identifier": 1, "year": 2025, "started_at": "2025-01-10" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let cycle: Value = res.json().await.unwrap();

    let res = server
        .client
        .get(server.url(&format!("/farms/{farm_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let farm: Value = res.json().await.unwrap();
    assert_eq!(farm["name"], "Ferma Pod Lasem");
    assert_eq!(farm["active_cycle_id"], cycle["id"]);

    let res = server
        .client
        .get(server.url("/farms?page_size=5"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["total_count"], 1);
    assert_eq!(page["page_size"], 5);

    // A farm with henhouses cannot be deleted.
    let res = server
        .client
        .delete(server.url(&format!("/farms/{farm_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = server
        .client
        .delete(server.url(&format!("/farms/{farm_id}/henhouses/{henhouse_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = server
        .client
        .delete(server.url(&format!("/farms/{farm_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = server
        .client
        .get(server.url(&format!("/farms/{farm_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn feed_delivery_defaults_to_active_cycle() {
    let server = TestServer::spawn().await;
    let token = server.admin_token().await;

    let farm: Value = server
        .client
        .post(server.url("/farms"))
        .bearer_auth(&token)
        .json(&farm_body("Ferma"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let farm_id = farm["id"].as_str().unwrap();

    let henhouse: Value = server
        .client
        .post(server.url(&format!("/farms/{farm_id}/henhouses")))
        .bearer_auth(&token)
        .json(&json!({ "name": "Kurnik 1", "code": "K1", "area_m2": 900.0, "description": null }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let cycle: Value = server
        .client
        .post(server.url(&format!("/farms/{farm_id}/cycles")))
        .bearer_auth(&token)
        .json(&json!({ "identifier": 1, "year": 2025, "started_at": "2025-01-10" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let res = server
        .client
        .post(server.url("/feed-deliveries"))
        .bearer_auth(&token)
        .json(&json!({
            "farm_id": farm_id,
            "henhouse_id": henhouse["id"],
            "vendor_name": "Pasze Sp. z o.o.",
            "item_name": "Starter",
            "quantity_tons": 12.5,
            "unit_price": 185000,
            "invoice_number": "FV/01/2025",
            "invoice_date": "2025-02-01",
            "due_date": "2025-03-01",
            "comment": null,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let delivery: Value = res.json().await.unwrap();
    assert_eq!(delivery["cycle_id"], cycle["id"]);

    let res = server
        .client
        .get(server.url(&format!("/feed-deliveries?farm_id={farm_id}&unpaid_only=true")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["total_count"], 1);
}
