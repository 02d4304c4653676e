use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::post;
use axum::Router;
use callweave_server::{app, config::Config, AppState};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// Builds an `AppState` over a temporary cache directory.
///
/// The returned `TempDir` must be kept alive for the duration of the test.
fn test_state(mut config: Config) -> (Arc<AppState>, TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    config.cache.dir = tmp.path().to_str().unwrap().to_string();
    (Arc::new(AppState::from_config(&config)), tmp)
}

/// Spawns a stand-in provider answering every POST with `status`/`body`.
async fn spawn_provider(
    route: &'static str,
    status: StatusCode,
    body: &'static [u8],
) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_handle = hits.clone();

    let app = Router::new().route(
        route,
        post(move || {
            let hits = hits_handle.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                (status, body)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), hits)
}

fn configured_telephony(config: &mut Config, base_url: String) {
    config.telephony.account_sid = "acct".to_string();
    config.telephony.api_key = "key".to_string();
    config.telephony.api_token = "token".to_string();
    config.telephony.phone_number = "+918000000000".to_string();
    config.telephony.base_url = Some(base_url);
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_configuration_readiness() {
    let (state, _tmp) = test_state(Config::default());
    let response = app(state).oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["telephonyConfigured"], false);
    assert_eq!(body["synthesisConfigured"], false);
    assert_eq!(body["activeCalls"], 0);
}

#[tokio::test]
async fn start_call_without_credentials_is_structured_503() {
    let (state, _tmp) = test_state(Config::default());
    let request = json_request(
        "POST",
        "/api/calls",
        json!({"phone": "+919876543210", "name": "Asha"}),
    );
    let response = app(state.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("telephony"));
    // Fail-fast: no context was created.
    assert!(state.registry.is_empty());
}

#[tokio::test]
async fn start_call_rejects_empty_phone_and_name() {
    let (state, _tmp) = test_state(Config::default());

    for payload in [
        json!({"phone": "  ", "name": "Asha"}),
        json!({"phone": "+919876543210", "name": ""}),
    ] {
        let request = json_request("POST", "/api/calls", payload);
        let response = app(state.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn call_lifecycle_over_http() {
    let (base_url, _hits) = spawn_provider(
        "/v1/Accounts/{sid}/Calls/connect.json",
        StatusCode::OK,
        br#"{"Call": {"Sid": "CA999"}}"#,
    )
    .await;
    let mut config = Config::default();
    configured_telephony(&mut config, base_url);
    let (state, _tmp) = test_state(config);

    // Initiate
    let request = json_request(
        "POST",
        "/api/calls",
        json!({
            "phone": "+919876543210",
            "name": "Asha",
            "propertyContext": "2BHK in Whitefield",
        }),
    );
    let response = app(state.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["providerCallSid"], "CA999");
    let call_id = body["callId"].as_str().unwrap().to_string();

    // Introspect
    let response = app(state.clone())
        .oneshot(get_request(&format!("/api/calls/{call_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["customerName"], "Asha");
    assert_eq!(body["history"][0]["role"], "system");
    assert!(body["history"][0]["content"]
        .as_str()
        .unwrap()
        .contains("2BHK in Whitefield"));

    // Teardown is idempotent
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/calls/{call_id}"))
        .body(Body::empty())
        .unwrap();
    let response = app(state.clone()).oneshot(request).await.unwrap();
    assert_eq!(body_json(response).await["removed"], true);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/calls/{call_id}"))
        .body(Body::empty())
        .unwrap();
    let response = app(state.clone()).oneshot(request).await.unwrap();
    assert_eq!(body_json(response).await["removed"], false);

    // Gone
    let response = app(state)
        .oneshot(get_request(&format!("/api/calls/{call_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dispatch_failure_is_bad_gateway_with_provider_payload() {
    let (base_url, _hits) = spawn_provider(
        "/v1/Accounts/{sid}/Calls/connect.json",
        StatusCode::INTERNAL_SERVER_ERROR,
        br#"{"RestException": {"Message": "no balance"}}"#,
    )
    .await;
    let mut config = Config::default();
    configured_telephony(&mut config, base_url);
    let (state, _tmp) = test_state(config);

    let request = json_request(
        "POST",
        "/api/calls",
        json!({"phone": "+919876543210", "name": "Asha"}),
    );
    let response = app(state.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("no balance"));
    // The context survives the failed dispatch for operator follow-up.
    assert_eq!(state.registry.len(), 1);
}

#[tokio::test]
async fn audio_route_rejects_traversal_without_filesystem_access() {
    let (state, _tmp) = test_state(Config::default());

    // Percent-encoded traversal decodes to "../../etc/passwd" as a single
    // path segment; the cache's format allow-list must reject it.
    let response = app(state.clone())
        .oneshot(get_request("/audio/..%2F..%2Fetc%2Fpasswd"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app(state)
        .oneshot(get_request("/audio/deadbeef.mp3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn audio_route_serves_cached_artifacts_as_mpeg() {
    let (state, _tmp) = test_state(Config::default());
    state.cache.ensure_dir().await.unwrap();

    let fingerprint = callweave_voice::AudioCache::fingerprint("good afternoon");
    state.cache.put(&fingerprint, b"mp3-bytes").await.unwrap();
    let filename = callweave_voice::AudioCache::filename_for(&fingerprint);

    let response = app(state)
        .oneshot(get_request(&format!("/audio/{filename}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "audio/mpeg"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"mp3-bytes");
}

#[tokio::test]
async fn synthesize_without_credentials_is_structured_503() {
    let (state, _tmp) = test_state(Config::default());
    let request = json_request("POST", "/api/audio/synthesize", json!({"text": "hello"}));
    let response = app(state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("not configured"));
}

#[tokio::test]
async fn synthesize_roundtrip_hits_cache_on_second_request() {
    let (base_url, hits) = spawn_provider(
        "/v1/text-to-speech/{voice_id}",
        StatusCode::OK,
        b"mp3-payload",
    )
    .await;
    let mut config = Config::default();
    config.synthesis.api_key = "key".to_string();
    config.synthesis.base_url = base_url;
    let (state, _tmp) = test_state(config);
    state.cache.ensure_dir().await.unwrap();

    let request = json_request("POST", "/api/audio/synthesize", json!({"text": "hello"}));
    let response = app(state.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first = body_json(response).await;
    assert_eq!(first["cacheHit"], false);
    let filename = first["filename"].as_str().unwrap().to_string();
    assert_eq!(first["url"], format!("/audio/{filename}"));

    let request = json_request("POST", "/api/audio/synthesize", json!({"text": "hello"}));
    let response = app(state.clone()).oneshot(request).await.unwrap();
    let second = body_json(response).await;
    assert_eq!(second["cacheHit"], true);
    assert_eq!(second["filename"], filename.as_str());
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    // The artifact is immediately servable over the media path.
    let response = app(state)
        .oneshot(get_request(&format!("/audio/{filename}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
