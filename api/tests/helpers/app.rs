use api::{routes::routes, state::AppState};
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{Request, Response},
};
use db::test_utils::setup_test_db;
use serde_json::Value;
use services::notification::{Notice, NotificationSink, NotifyError};
use services::settings::AttendanceSettings;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};

/// Keeps every notice the app tries to send.
#[derive(Default)]
pub struct CapturingSink {
    sent: Mutex<Vec<Notice>>,
}

impl CapturingSink {
    pub fn sent(&self) -> Vec<Notice> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for CapturingSink {
    async fn notify(&self, notice: Notice) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(notice);
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub sink: Arc<CapturingSink>,
}

/// Router over a fresh in-memory database with default attendance settings.
pub async fn make_test_app() -> TestApp {
    let db = setup_test_db().await;
    let sink = Arc::new(CapturingSink::default());
    let state = AppState::new(db, sink.clone(), AttendanceSettings::default());

    TestApp {
        router: Router::new().nest("/api", routes(state.clone())),
        state,
        sink,
    }
}

/// Builds a request from `ip`, with an optional bearer token and JSON body.
pub fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
    ip: &str,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let mut req = builder.body(body).unwrap();
    let addr = SocketAddr::new(ip.parse::<IpAddr>().unwrap(), 43210);
    req.extensions_mut().insert(ConnectInfo(addr));
    req
}

pub async fn body_json(resp: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
