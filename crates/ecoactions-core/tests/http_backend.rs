//! `ApiClient` against a local axum server standing in for the backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use ecoactions_core::auth::{SessionObserver, TOKEN_KEY, USER_KEY};
use ecoactions_core::{ApiClient, AuthBackend, AuthError, KeyValueStore, MemoryStore, SessionClient, User};

#[derive(Default)]
struct Signals {
    logged_in: Mutex<Vec<String>>,
    logged_out: AtomicUsize,
}

impl SessionObserver for Signals {
    fn logged_in(&self, user: &User) {
        self.logged_in.lock().unwrap().push(user.username.clone());
    }

    fn logged_out(&self) {
        self.logged_out.fetch_add(1, Ordering::SeqCst);
    }
}

async fn register(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["email"] == "taken@example.org" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Email already registered"})),
        );
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "message": "Successfully registered",
            "token": "t1",
            "user": {"id": 1, "username": body["username"], "email": body["email"]}
        })),
    )
}

async fn login() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "Server error")
}

async fn spawn_backend(logout_bearers: Arc<Mutex<Vec<String>>>) -> String {
    let app = Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route(
            "/api/auth/logout",
            post(move |headers: HeaderMap| {
                let bearers = logout_bearers.clone();
                async move {
                    let bearer = headers
                        .get(header::AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    bearers.lock().unwrap().push(bearer);
                    StatusCode::OK
                }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn register_then_logout_against_server() {
    let bearers = Arc::new(Mutex::new(Vec::new()));
    let base_url = spawn_backend(bearers.clone()).await;
    let store = Arc::new(MemoryStore::new());
    let signals = Arc::new(Signals::default());
    let mut session = SessionClient::new(Arc::new(client(&base_url)), store.clone(), signals.clone());

    let registered = session
        .register("ana", "ana@example.org", "secret1", "secret1")
        .await
        .unwrap();
    assert_eq!(registered.token, "t1");
    assert_eq!(registered.user.email.as_deref(), Some("ana@example.org"));
    assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("t1"));
    assert_eq!(*signals.logged_in.lock().unwrap(), vec!["ana".to_string()]);

    session.logout().await;
    assert_eq!(*bearers.lock().unwrap(), vec!["Bearer t1".to_string()]);
    assert!(!store.contains(TOKEN_KEY));
    assert!(!store.contains(USER_KEY));
    assert_eq!(signals.logged_out.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn server_rejections_are_surfaced() {
    let base_url = spawn_backend(Arc::default()).await;
    let mut session = SessionClient::new(
        Arc::new(client(&base_url)),
        Arc::new(MemoryStore::new()),
        Arc::new(Signals::default()),
    );

    let taken = session
        .register("ana", "taken@example.org", "secret1", "secret1")
        .await;
    assert_eq!(
        taken,
        Err(AuthError::ServerRejected("Email already registered".to_string()))
    );

    let login = session.login("ana@example.org", "secret1").await;
    assert_eq!(login, Err(AuthError::ServerRejected("Server error".to_string())));
}

#[tokio::test]
async fn raw_response_carries_status_and_content_type() {
    let base_url = spawn_backend(Arc::default()).await;
    let response = client(&base_url)
        .post_json("/api/auth/login", &json!({}), None)
        .await
        .unwrap();

    assert_eq!(response.status, 500);
    assert!(!response.is_json());
    assert!(response
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("text/plain")));
    assert_eq!(response.body, "Server error");
}

#[tokio::test]
async fn unreachable_server_is_a_connection_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut session = SessionClient::new(
        Arc::new(client(&format!("http://{}", addr))),
        Arc::new(MemoryStore::new()),
        Arc::new(Signals::default()),
    );

    let result = session.login("ana@example.org", "secret1").await;
    assert!(matches!(result, Err(AuthError::ConnectionError(_))), "{:?}", result);
}
