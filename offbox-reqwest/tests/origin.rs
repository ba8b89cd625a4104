//! Integration tests for ReqwestOrigin using wiremock.

use std::time::Duration;

use http::StatusCode;
use offbox::{
    FetchOutcome, Generations, Origin, OriginError, RequestDescriptor, ResourceKind,
    ResponseSource, Scope, VersionConfig,
};
use offbox_moka::MokaRegistry;
use offbox_reqwest::ReqwestOrigin;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn get(server: &MockServer, route: &str, kind: ResourceKind) -> RequestDescriptor {
    let url = Url::parse(&format!("{}{route}", server.uri())).unwrap();
    RequestDescriptor::get(url, kind)
}

#[tokio::test]
async fn response_is_buffered_intact() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/weather"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"temp":21}"#)
                .insert_header("content-type", "application/json")
                .insert_header("x-station", "lima-1"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let origin = ReqwestOrigin::default();
    let response = origin
        .fetch(&get(&server, "/api/weather", ResourceKind::Other))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-station"], "lima-1");
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(response.body(), r#"{"temp":21}"#);
}

#[tokio::test]
async fn error_statuses_are_responses() {
    let server = MockServer::start().await;
    Mock::given(path("/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let origin = ReqwestOrigin::default();
    let broken = origin
        .fetch(&get(&server, "/broken", ResourceKind::Other))
        .await
        .unwrap();
    let missing = origin
        .fetch(&get(&server, "/missing", ResourceKind::Other))
        .await
        .unwrap();

    assert_eq!(broken.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn closed_port_is_unreachable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let url = Url::parse(&format!("http://{address}/index.html")).unwrap();
    let error = ReqwestOrigin::default()
        .fetch(&RequestDescriptor::get(url, ResourceKind::Document))
        .await
        .unwrap_err();

    assert!(matches!(error, OriginError::Unreachable(_)), "{error:?}");
}

#[tokio::test]
async fn slow_origin_times_out() {
    let server = MockServer::start().await;
    Mock::given(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let origin = ReqwestOrigin::default().timeout(Duration::from_millis(100));
    let error = origin
        .fetch(&get(&server, "/slow", ResourceKind::Other))
        .await
        .unwrap_err();

    assert!(matches!(error, OriginError::Timeout), "{error:?}");
}

#[tokio::test]
async fn install_bypasses_http_caches_for_required_assets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index.html"))
        .and(header("cache-control", "no-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>app</h1>"))
        .expect(1)
        .mount(&server)
        .await;

    let base = Url::parse(&format!("{}/", server.uri())).unwrap();
    let scope = Scope::builder(base)
        .registry(MokaRegistry::default())
        .origin(ReqwestOrigin::default())
        .build();

    let report = scope
        .install(VersionConfig::new("v1", Generations::new("app", "v1")).required(["./index.html"]))
        .await
        .unwrap();

    assert_eq!(report.required.len(), 1);
}

#[tokio::test]
async fn scope_falls_back_to_cache_when_origin_stalls() {
    let server = MockServer::start().await;
    Mock::given(path("/api/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("sunny"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(path("/api/weather"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("too late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let base = Url::parse(&format!("{}/", server.uri())).unwrap();
    let scope = Scope::builder(base)
        .registry(MokaRegistry::default())
        .origin(ReqwestOrigin::default().timeout(Duration::from_millis(200)))
        .build();
    scope
        .install(VersionConfig::new("v1", Generations::new("app", "v1")))
        .await
        .unwrap();
    let request = get(&server, "/api/weather", ResourceKind::Other);

    let FetchOutcome::Served(online) = scope.handle_fetch(&request).await else {
        panic!("request was not intercepted");
    };
    scope.offload().wait_all().await;
    let FetchOutcome::Served(stalled) = scope.handle_fetch(&request).await else {
        panic!("request was not intercepted");
    };

    assert_eq!(online.source, ResponseSource::Network);
    assert_eq!(stalled.source, ResponseSource::Cache("app-dynamic-v1".into()));
    assert_eq!(stalled.response, online.response);
}
