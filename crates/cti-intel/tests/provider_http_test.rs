use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use cti_core::{AbuseIpDbConfig, TargetType, VirusTotalConfig};
use cti_intel::{AbuseIpDbProvider, IntelError, IntelProvider, VirusTotalProvider};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

type Params = Query<HashMap<String, String>>;

/// Serve `router` on an ephemeral port and return its base address.
async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve stub");
    });
    format!("http://{addr}")
}

/// Address nothing is listening on.
async fn closed_port() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("address");
    drop(listener);
    format!("http://{addr}")
}

/// Server that answers every connection with headers and the first byte of
/// a JSON body, then stalls for `stall`.
async fn spawn_stalled_body(stall: Duration) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stalled listener");
    let addr = listener.local_addr().expect("stalled address");
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request = [0u8; 2048];
                let _ = socket.read(&mut request).await;
                let head = "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 64\r\n\r\n{";
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.flush().await;
                tokio::time::sleep(stall).await;
            });
        }
    });
    format!("http://{addr}")
}

fn vt_config(base_url: String, timeout_secs: u64) -> VirusTotalConfig {
    VirusTotalConfig {
        api_key: "vt-test-key".to_string(),
        base_url,
        timeout_secs,
    }
}

fn abuse_config(base_url: String) -> AbuseIpDbConfig {
    AbuseIpDbConfig {
        api_key: "abuse-test-key".to_string(),
        base_url,
        timeout_secs: 5,
        max_age_days: 90,
    }
}

fn virustotal_stub() -> Router {
    Router::new()
        .route(
            "/vtapi/v2/ip-address/report",
            get(|Query(q): Params| async move {
                Json(json!({"kind": "ip", "ip": q.get("ip"), "apikey": q.get("apikey")}))
            }),
        )
        .route(
            "/vtapi/v2/domain/report",
            get(|Query(q): Params| async move {
                Json(json!({"kind": "domain", "domain": q.get("domain"), "positives": 0}))
            }),
        )
        .route(
            "/vtapi/v2/url/report",
            get(|Query(q): Params| async move {
                Json(json!({"kind": "url", "resource": q.get("resource"), "positives": 4}))
            }),
        )
}

#[tokio::test]
async fn test_virustotal_uses_endpoint_and_param_per_type() {
    let base = spawn_stub(virustotal_stub()).await;
    let provider =
        VirusTotalProvider::new(&vt_config(format!("{base}/vtapi/v2/"), 5)).expect("provider");

    let ip = provider.query("8.8.8.8", TargetType::Ip).await;
    assert_eq!(ip["kind"], "ip");
    assert_eq!(ip["ip"], "8.8.8.8");
    assert_eq!(ip["apikey"], "vt-test-key");

    let domain = provider.query("example.com", TargetType::Domain).await;
    assert_eq!(domain["kind"], "domain");
    assert_eq!(domain["domain"], "example.com");

    let url = provider
        .query("https://example.com/a?b=c", TargetType::Url)
        .await;
    assert_eq!(url["kind"], "url");
    assert_eq!(url["resource"], "https://example.com/a?b=c");
}

#[tokio::test]
async fn test_virustotal_json_error_body_is_returned_as_is() {
    let router = Router::new().route(
        "/vtapi/v2/domain/report",
        get(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"response_code": -1, "verbose_msg": "Invalid domain"})),
            )
        }),
    );
    let base = spawn_stub(router).await;
    let provider =
        VirusTotalProvider::new(&vt_config(format!("{base}/vtapi/v2"), 5)).expect("provider");

    let payload = provider.query("bad..domain", TargetType::Domain).await;
    assert_eq!(payload["verbose_msg"], "Invalid domain");
}

#[tokio::test]
async fn test_virustotal_non_json_error_status() {
    let router = Router::new().route(
        "/vtapi/v2/ip-address/report",
        get(|| async { (StatusCode::FORBIDDEN, "") }),
    );
    let base = spawn_stub(router).await;
    let provider =
        VirusTotalProvider::new(&vt_config(format!("{base}/vtapi/v2/"), 5)).expect("provider");

    let result = provider.lookup("8.8.8.8", TargetType::Ip).await;
    assert!(matches!(
        result,
        Err(IntelError::ApiError { status: 403, .. })
    ));

    let payload = provider.query("8.8.8.8", TargetType::Ip).await;
    let message = payload["error"].as_str().expect("error payload");
    assert!(message.contains("403"));
}

#[tokio::test]
async fn test_virustotal_empty_success_body_is_parse_error() {
    // VirusTotal answers 204 with no body when the quota is exhausted.
    let router = Router::new().route(
        "/vtapi/v2/ip-address/report",
        get(|| async { StatusCode::NO_CONTENT }),
    );
    let base = spawn_stub(router).await;
    let provider =
        VirusTotalProvider::new(&vt_config(format!("{base}/vtapi/v2/"), 5)).expect("provider");

    let result = provider.lookup("1.1.1.1", TargetType::Ip).await;
    assert!(matches!(result, Err(IntelError::ParseError { .. })));
}

#[tokio::test]
async fn test_virustotal_timeout_becomes_error_payload() {
    let router = Router::new().route(
        "/vtapi/v2/domain/report",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({"positives": 0}))
        }),
    );
    let base = spawn_stub(router).await;
    let provider =
        VirusTotalProvider::new(&vt_config(format!("{base}/vtapi/v2/"), 1)).expect("provider");

    let payload = provider.query("slow.example", TargetType::Domain).await;
    assert_eq!(payload, json!({"error": "request timed out after 1s"}));
}

#[tokio::test]
async fn test_virustotal_slow_body_is_a_timeout() {
    let base = spawn_stalled_body(Duration::from_secs(3)).await;
    let provider =
        VirusTotalProvider::new(&vt_config(format!("{base}/vtapi/v2/"), 1)).expect("provider");

    let result = provider.lookup("8.8.8.8", TargetType::Ip).await;
    assert!(
        matches!(result, Err(IntelError::Timeout { seconds: 1 })),
        "expected timeout, got {result:?}"
    );

    let payload = provider.query("8.8.8.8", TargetType::Ip).await;
    assert_eq!(payload, json!({"error": "request timed out after 1s"}));
}

#[tokio::test]
async fn test_virustotal_connection_refused_becomes_error_payload() {
    let base = closed_port().await;
    let provider = VirusTotalProvider::new(&vt_config(base, 5)).expect("provider");

    let payload = provider.query("example.com", TargetType::Domain).await;
    let message = payload["error"].as_str().expect("error payload");
    assert!(message.starts_with("network error"));
}

#[tokio::test]
async fn test_abuseipdb_sends_auth_header_and_params() {
    let router = Router::new().route(
        "/api/v2/check",
        get(|headers: HeaderMap, Query(q): Params| async move {
            let header = |name: &str| {
                headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(ToString::to_string)
            };
            Json(json!({
                "data": {
                    "ipAddress": q.get("ipAddress"),
                    "abuseConfidenceScore": 0
                },
                "seen": {
                    "key": header("Key"),
                    "accept": header("Accept"),
                    "maxAgeInDays": q.get("maxAgeInDays"),
                    "verbose": q.get("verbose"),
                }
            }))
        }),
    );
    let base = spawn_stub(router).await;
    let provider = AbuseIpDbProvider::new(&abuse_config(format!("{base}/api/v2/"))).expect("provider");

    let payload = provider.query("8.8.8.8", TargetType::Ip).await;
    assert_eq!(payload["data"]["ipAddress"], "8.8.8.8");
    assert_eq!(payload["seen"]["key"], "abuse-test-key");
    assert_eq!(payload["seen"]["accept"], "application/json");
    assert_eq!(payload["seen"]["maxAgeInDays"], "90");
    assert_eq!(payload["seen"]["verbose"], "");
}

#[tokio::test]
async fn test_abuseipdb_non_ip_makes_no_request() {
    // Nothing listens here, so any request would surface as an error payload.
    let base = closed_port().await;
    let provider = AbuseIpDbProvider::new(&abuse_config(base)).expect("provider");

    for (target, kind) in [
        ("example.com", TargetType::Domain),
        ("https://example.com", TargetType::Url),
        ("example.com", TargetType::Ip),
    ] {
        let payload = provider.query(target, kind).await;
        assert_eq!(
            payload,
            json!({"message": "not supported for this target type"}),
            "{target}"
        );
    }
}

#[tokio::test]
async fn test_abuseipdb_failure_becomes_error_payload() {
    let base = closed_port().await;
    let provider = AbuseIpDbProvider::new(&abuse_config(base)).expect("provider");

    let payload: Value = provider.query("8.8.8.8", TargetType::Ip).await;
    assert!(payload.get("error").is_some());
}
