// In-process mock of the device bridge HTTP API.
//
// Mirrors the bridge's observable rules: origin check (403), exclusive
// sessions per device, `{"error": ...}` bodies with 400 on protocol errors,
// hex message bodies on call/post/read.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use devbridge::{BridgeConfig, DeviceEntry, Message};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub const ALLOWED_ORIGIN: &str = "https://test.trezor.io";

/// Kind the mock answers every call with (`Features`).
pub const REPLY_KIND: u16 = 17;

pub struct BridgeState {
	pub version: String,
	pub devices: Vec<DeviceEntry>,
	pub next_session: u64,
	/// Every accepted request, as `"<route> <arg>"`.
	pub requests: Vec<String>,
}

type Shared = Arc<Mutex<BridgeState>>;

pub struct TestServer {
	addr: SocketAddr,
	shutdown_tx: Option<oneshot::Sender<()>>,
	pub state: Shared,
}

impl TestServer {
	pub async fn start() -> Self {
		Self::with_devices(&[]).await
	}

	pub async fn with_devices(paths: &[&str]) -> Self {
		let state = Arc::new(Mutex::new(BridgeState {
			version: "2.0.33".to_string(),
			devices: paths.iter().map(|p| DeviceEntry::new(*p)).collect(),
			next_session: 0,
			requests: Vec::new(),
		}));

		let app = Router::new()
			.route("/", post(info))
			.route("/enumerate", post(enumerate))
			.route("/listen", post(listen))
			.route("/acquire/{path}/{previous}", post(acquire))
			.route("/debug/acquire/{path}/{previous}", post(acquire_debug))
			.route("/release/{session}", post(release))
			.route("/debug/release/{session}", post(release_debug))
			.route("/call/{session}", post(call))
			.route("/debug/call/{session}", post(call_debug))
			.route("/post/{session}", post(post_message))
			.route("/read/{session}", post(read))
			.with_state(Arc::clone(&state));

		let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test server");
		let addr = listener.local_addr().expect("local addr");
		let (shutdown_tx, shutdown_rx) = oneshot::channel();

		tokio::spawn(async move {
			axum::serve(listener, app)
				.with_graceful_shutdown(async {
					let _ = shutdown_rx.await;
				})
				.await
				.expect("test server");
		});

		Self {
			addr,
			shutdown_tx: Some(shutdown_tx),
			state,
		}
	}

	pub fn url(&self) -> String {
		format!("http://{}", self.addr)
	}

	pub fn config(&self) -> BridgeConfig {
		BridgeConfig::default().with_url(self.url()).with_origin(ALLOWED_ORIGIN)
	}

	pub fn set_version(&self, version: &str) {
		self.state.lock().unwrap().version = version.to_string();
	}

	pub fn plug(&self, path: &str) {
		self.state.lock().unwrap().devices.push(DeviceEntry::new(path));
	}

	pub fn unplug(&self, path: &str) {
		self.state.lock().unwrap().devices.retain(|d| d.path != path);
	}

	pub fn requests(&self) -> Vec<String> {
		self.state.lock().unwrap().requests.clone()
	}

	pub fn holder(&self, path: &str) -> Option<String> {
		let state = self.state.lock().unwrap();
		state.devices.iter().find(|d| d.path == path).and_then(|d| d.session.clone())
	}

	pub fn shutdown(mut self) {
		if let Some(tx) = self.shutdown_tx.take() {
			let _ = tx.send(());
		}
	}
}

fn origin_allowed(headers: &HeaderMap) -> bool {
	headers.get(header::ORIGIN).and_then(|v| v.to_str().ok()) == Some(ALLOWED_ORIGIN)
}

fn forbidden() -> Response {
	StatusCode::FORBIDDEN.into_response()
}

fn bad_request(message: &str) -> Response {
	(StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn record(state: &mut BridgeState, route: &str, arg: &str) {
	state.requests.push(format!("{route} {arg}").trim_end().to_string());
}

fn holder_mut(entry: &mut DeviceEntry, debug: bool) -> &mut Option<String> {
	if debug { &mut entry.debug_session } else { &mut entry.session }
}

async fn info(State(state): State<Shared>, headers: HeaderMap) -> Response {
	if !origin_allowed(&headers) {
		return forbidden();
	}
	let mut state = state.lock().unwrap();
	record(&mut state, "info", "");
	Json(json!({ "version": state.version })).into_response()
}

async fn enumerate(State(state): State<Shared>, headers: HeaderMap) -> Response {
	if !origin_allowed(&headers) {
		return forbidden();
	}
	let mut state = state.lock().unwrap();
	record(&mut state, "enumerate", "");
	Json(state.devices.clone()).into_response()
}

// The bridge reads the body as JSON regardless of content type.
async fn listen(State(state): State<Shared>, headers: HeaderMap, body: String) -> Response {
	if !origin_allowed(&headers) {
		return forbidden();
	}
	let Ok(previous) = serde_json::from_str::<Vec<DeviceEntry>>(&body) else {
		return bad_request("malformed data");
	};
	let mut state = state.lock().unwrap();
	let arg = previous.len().to_string();
	record(&mut state, "listen", &arg);
	Json(state.devices.clone()).into_response()
}

async fn acquire(State(state): State<Shared>, headers: HeaderMap, Path((path, previous)): Path<(String, String)>) -> Response {
	acquire_on(state, headers, path, previous, false)
}

async fn acquire_debug(State(state): State<Shared>, headers: HeaderMap, Path((path, previous)): Path<(String, String)>) -> Response {
	acquire_on(state, headers, path, previous, true)
}

fn acquire_on(state: Shared, headers: HeaderMap, path: String, previous: String, debug: bool) -> Response {
	if !origin_allowed(&headers) {
		return forbidden();
	}
	let mut state = state.lock().unwrap();
	record(&mut state, if debug { "debug/acquire" } else { "acquire" }, &format!("{path} {previous}"));

	let previous = (previous != "null").then_some(previous);
	let token = state.next_session.to_string();
	let Some(entry) = state.devices.iter_mut().find(|d| d.path == path) else {
		return bad_request("device not found");
	};
	let holder = holder_mut(entry, debug);
	if *holder != previous {
		return bad_request("wrong previous session");
	}
	*holder = Some(token.clone());
	state.next_session += 1;
	Json(json!({ "session": token })).into_response()
}

async fn release(State(state): State<Shared>, headers: HeaderMap, Path(session): Path<String>) -> Response {
	release_on(state, headers, session, false)
}

async fn release_debug(State(state): State<Shared>, headers: HeaderMap, Path(session): Path<String>) -> Response {
	release_on(state, headers, session, true)
}

fn release_on(state: Shared, headers: HeaderMap, session: String, debug: bool) -> Response {
	if !origin_allowed(&headers) {
		return forbidden();
	}
	let mut state = state.lock().unwrap();
	record(&mut state, if debug { "debug/release" } else { "release" }, &session);

	let held = state
		.devices
		.iter_mut()
		.map(|entry| holder_mut(entry, debug))
		.find(|holder| holder.as_deref() == Some(session.as_str()));
	match held {
		Some(holder) => {
			*holder = None;
			Json(json!({ "status": true })).into_response()
		}
		None => bad_request("session not found"),
	}
}

fn session_exists(state: &BridgeState, session: &str, debug: bool) -> bool {
	state.devices.iter().any(|d| d.holder(debug) == Some(session))
}

fn exchange(state: Shared, headers: HeaderMap, route: &str, session: String, body: Option<String>, debug: bool) -> Response {
	if !origin_allowed(&headers) {
		return forbidden();
	}
	let mut state = state.lock().unwrap();
	record(&mut state, route, &session);

	if !session_exists(&state, &session, debug) {
		return bad_request("session not found");
	}

	let request = match body.as_deref().map(Message::from_hex).transpose() {
		Ok(request) => request,
		Err(_) => return bad_request("malformed data"),
	};

	match route {
		"post" => String::new().into_response(),
		_ => {
			let data = request.map(|m| m.data).unwrap_or_default();
			Message::new(REPLY_KIND, data).to_hex().into_response()
		}
	}
}

async fn call(State(state): State<Shared>, headers: HeaderMap, Path(session): Path<String>, body: String) -> Response {
	exchange(state, headers, "call", session, Some(body), false)
}

async fn call_debug(State(state): State<Shared>, headers: HeaderMap, Path(session): Path<String>, body: String) -> Response {
	exchange(state, headers, "debug/call", session, Some(body), true)
}

async fn post_message(State(state): State<Shared>, headers: HeaderMap, Path(session): Path<String>, body: String) -> Response {
	exchange(state, headers, "post", session, Some(body), false)
}

async fn read(State(state): State<Shared>, headers: HeaderMap, Path(session): Path<String>) -> Response {
	exchange(state, headers, "read", session, None, false)
}
