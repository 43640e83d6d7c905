//! Integration test support for Sugar Snap.
//!
//! Hosts [`StubFoodService`] - an in-process stand-in for the remote food
//! service, bound to an ephemeral local port. It records every request,
//! can inject failures per endpoint, and can hold `/prepare_buy` open so
//! tests can interleave cart mutations and reentrant checkout calls with
//! an in-flight transaction.
//!
//! # Example
//!
//! ```rust,ignore
//! let stub = StubFoodService::start(vec![json!([
//!     {"id": "a", "price": 1.5, "imageURL": "http://img.example.com/a.png"},
//! ])])
//! .await;
//!
//! let config = stub.config();
//! let catalog = CatalogClient::new(&config)?;
//! let page = catalog.fetch_page(0).await?;
//! assert_eq!(stub.state().list_requests(), vec![0]);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Notify;
use url::Url;

use sugar_snap_client::FoodServiceConfig;

/// Observable state of one stub instance.
///
/// Counters and switches are plain atomics so tests can flip failure
/// injection mid-scenario without touching the server task.
pub struct StubState {
    pages: Mutex<Vec<Value>>,
    list_requests: Mutex<Vec<u32>>,
    prepare_calls: AtomicUsize,
    confirm_calls: AtomicUsize,
    confirm_bodies: Mutex<Vec<Value>>,
    fail_list: AtomicBool,
    fail_prepare: AtomicBool,
    fail_confirm: AtomicBool,
    hold_prepare: AtomicBool,
    prepare_gate: Notify,
}

impl StubState {
    fn new(pages: Vec<Value>) -> Self {
        Self {
            pages: Mutex::new(pages),
            list_requests: Mutex::new(Vec::new()),
            prepare_calls: AtomicUsize::new(0),
            confirm_calls: AtomicUsize::new(0),
            confirm_bodies: Mutex::new(Vec::new()),
            fail_list: AtomicBool::new(false),
            fail_prepare: AtomicBool::new(false),
            fail_confirm: AtomicBool::new(false),
            hold_prepare: AtomicBool::new(false),
            prepare_gate: Notify::new(),
        }
    }

    /// Page indices requested from `/list` so far.
    #[must_use]
    pub fn list_requests(&self) -> Vec<u32> {
        self.list_requests.lock().expect("stub state poisoned").clone()
    }

    /// Number of `/prepare_buy` calls received.
    #[must_use]
    pub fn prepare_calls(&self) -> usize {
        self.prepare_calls.load(Ordering::SeqCst)
    }

    /// Number of `/confirm_buy` calls received.
    #[must_use]
    pub fn confirm_calls(&self) -> usize {
        self.confirm_calls.load(Ordering::SeqCst)
    }

    /// Bodies received by `/confirm_buy`, in arrival order.
    #[must_use]
    pub fn confirm_bodies(&self) -> Vec<Value> {
        self.confirm_bodies.lock().expect("stub state poisoned").clone()
    }

    /// Make `/list` answer 500 until switched back.
    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    /// Make `/prepare_buy` answer 500 until switched back.
    pub fn set_fail_prepare(&self, fail: bool) {
        self.fail_prepare.store(fail, Ordering::SeqCst);
    }

    /// Make `/confirm_buy` answer 500 until switched back.
    pub fn set_fail_confirm(&self, fail: bool) {
        self.fail_confirm.store(fail, Ordering::SeqCst);
    }

    /// Park the next `/prepare_buy` call until [`StubState::release_prepare`].
    ///
    /// The call is counted before it parks, so tests can wait for
    /// [`StubState::prepare_calls`] to observe the in-flight transaction.
    pub fn hold_prepare(&self) {
        self.hold_prepare.store(true, Ordering::SeqCst);
    }

    /// Let a held `/prepare_buy` call proceed.
    pub fn release_prepare(&self) {
        self.hold_prepare.store(false, Ordering::SeqCst);
        self.prepare_gate.notify_one();
    }
}

#[derive(Deserialize)]
struct ListQuery {
    page: u32,
}

async fn list(
    State(state): State<Arc<StubState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, StatusCode> {
    state
        .list_requests
        .lock()
        .expect("stub state poisoned")
        .push(query.page);
    if state.fail_list.load(Ordering::SeqCst) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let pages = state.pages.lock().expect("stub state poisoned");
    let page = pages
        .get(query.page as usize)
        .cloned()
        .unwrap_or_else(|| Value::Array(Vec::new()));
    Ok(Json(page))
}

async fn prepare_buy(State(state): State<Arc<StubState>>) -> StatusCode {
    state.prepare_calls.fetch_add(1, Ordering::SeqCst);
    if state.hold_prepare.load(Ordering::SeqCst) {
        state.prepare_gate.notified().await;
    }
    if state.fail_prepare.load(Ordering::SeqCst) {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

async fn confirm_buy(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> StatusCode {
    state.confirm_calls.fetch_add(1, Ordering::SeqCst);
    state
        .confirm_bodies
        .lock()
        .expect("stub state poisoned")
        .push(body);
    if state.fail_confirm.load(Ordering::SeqCst) {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

/// An in-process stub of the food service.
pub struct StubFoodService {
    addr: SocketAddr,
    state: Arc<StubState>,
}

impl StubFoodService {
    /// Start a stub serving the given `/list` pages (one JSON value per
    /// page index; anything past the end answers as an empty array).
    pub async fn start(pages: Vec<Value>) -> Self {
        let state = Arc::new(StubState::new(pages));
        let app = Router::new()
            .route("/list", get(list))
            .route("/prepare_buy", post(prepare_buy))
            .route("/confirm_buy", post(confirm_buy))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve stub");
        });

        Self { addr, state }
    }

    /// Base URL of the running stub.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("stub base url")
    }

    /// Client configuration pointing at the stub (page cache disabled, so
    /// request-count assertions see every fetch).
    #[must_use]
    pub fn config(&self) -> FoodServiceConfig {
        FoodServiceConfig::new(self.base_url())
    }

    /// Shared observable state.
    #[must_use]
    pub fn state(&self) -> &StubState {
        &self.state
    }
}

/// Poll `condition` every 10ms until it holds, for at most ~2 seconds.
///
/// # Panics
///
/// Panics when the deadline passes, failing the calling test.
pub async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within 2s");
}
