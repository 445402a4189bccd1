#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]

//! End-to-end dial and call against a fake API gateway.

use async_trait::async_trait;
use bytes::Bytes;
use httpmock::prelude::*;
use microservice_transport::{
    AuthCredentials, AuthError, CloudService, GatewaySettings, Request, Service, ServiceTarget,
    ServiceTransport, TransportError,
};
use serde_json::json;
use std::sync::Arc;
use transport_http::{HttpClient, HttpClientBuilder, HttpClientConfig, HttpError, HttpResponse, HttpTransport};

fn test_client() -> HttpClient {
    HttpClientBuilder::with_config(HttpClientConfig::for_testing())
        .build()
        .unwrap()
}

fn credentials() -> AuthCredentials {
    AuthCredentials::new("svc@example.com", "hunter2")
}

fn cloud_service(server: &MockServer, target: ServiceTarget) -> CloudService {
    CloudService::with_parts(
        target,
        credentials(),
        &GatewaySettings::with_gateway_url(server.base_url()),
        Arc::new(test_client()),
    )
    .unwrap()
}

fn consumer_body(token: &str) -> serde_json::Value {
    json!({
        "status": "ok",
        "code": 200,
        "message": "",
        "data": {"type": "consumer", "content": {"tokens": [{"type": "jwt", "value": token}]}}
    })
}

#[tokio::test]
async fn login_then_call_through_gateway() {
    let server = MockServer::start();
    let login = server.mock(|when, then| {
        when.method(POST)
            .path("/")
            .header("content-type", "application/json")
            .json_body(json!({"email": "svc@example.com", "password": "hunter2"}));
        then.status(200).json_body(consumer_body("xxxx.xxxx.xxxx"));
    });
    let things = server.mock(|when, then| {
        when.method(GET)
            .path("/services/myservice/things")
            .query_param("foo", "bar")
            .query_param("baz", "qux")
            .header("authorization", "Bearer xxxx.xxxx.xxxx")
            .header("x-service-version", "2");
        then.status(200).body("[1,2,3]");
    });

    let target = ServiceTarget::new("master", "staging", "services", "myservice").with_version(2);
    let mut svc = cloud_service(&server, target);
    svc.dial(
        Request::new(http::Method::GET, "things")
            .with_query("foo", "bar")
            .with_query("baz", "qux"),
    )
    .await
    .unwrap();

    assert_eq!(
        svc.current_request().unwrap().url(),
        format!("{}/services/myservice/things?baz=qux&foo=bar", server.base_url())
    );

    let response = svc.call().await.unwrap();
    assert_eq!(response.status(), http::StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "[1,2,3]");

    login.assert();
    things.assert();
}

#[tokio::test]
async fn every_dial_logs_in_again() {
    let server = MockServer::start();
    let login = server.mock(|when, then| {
        when.method(POST).path("/");
        then.status(200).json_body(consumer_body("abc"));
    });

    let target = ServiceTarget::new("master", "live", "aggregators", "basket");
    let mut svc = cloud_service(&server, target);
    svc.dial(Request::new(http::Method::GET, "items")).await.unwrap();
    svc.dial(Request::new(http::Method::GET, "items")).await.unwrap();

    login.assert_calls(2);
    assert_eq!(
        svc.current_request().unwrap().url(),
        format!("{}/aggregators/agg-basket/items", server.base_url())
    );
}

#[tokio::test]
async fn rejected_login_leaves_no_request() {
    let server = MockServer::start();
    let login = server.mock(|when, then| {
        when.method(POST).path("/");
        then.status(401)
            .json_body(json!({"status": "fail", "code": 401, "message": "invalid credentials"}));
    });

    let mut svc = cloud_service(
        &server,
        ServiceTarget::new("master", "staging", "services", "myservice"),
    );
    let err = svc
        .dial(Request::new(http::Method::GET, "things"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TransportError::Authentication(AuthError::LoginUnauthorised { status })
            if status == http::StatusCode::UNAUTHORIZED
    ));
    assert!(err.to_string().starts_with("cannot authenticate for cloud service"));
    assert!(svc.current_request().is_none());
    assert!(matches!(svc.call().await, Err(TransportError::NotDialed)));
    login.assert();
}

#[tokio::test]
async fn unreachable_gateway_is_login_request_failure() {
    let mut svc = CloudService::with_parts(
        ServiceTarget::new("master", "staging", "services", "myservice"),
        credentials(),
        &GatewaySettings::with_gateway_url("http://127.0.0.1:9"),
        Arc::new(test_client()),
    )
    .unwrap();

    let err = svc
        .dial(Request::new(http::Method::GET, "things"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TransportError::Authentication(AuthError::LoginRequestFailed(_))
    ));
}

/// Sends every request to the mock server, keeping path and query
struct LoopbackTransport {
    server_base: String,
    client: HttpClient,
}

#[async_trait]
impl HttpTransport for LoopbackTransport {
    async fn execute(&self, mut request: http::Request<Bytes>) -> Result<HttpResponse, HttpError> {
        let path_and_query = request
            .uri()
            .path_and_query()
            .map_or("/", http::uri::PathAndQuery::as_str)
            .to_owned();
        let host = request.uri().host().unwrap_or_default().to_owned();
        *request.uri_mut() = format!("{}{path_and_query}", self.server_base).parse().unwrap();
        request
            .headers_mut()
            .insert("x-original-host", host.parse().unwrap());
        self.client.execute(request).await
    }
}

#[tokio::test]
async fn direct_service_call_reaches_dns_name() {
    let server = MockServer::start();
    let orders = server.mock(|when, then| {
        when.method(POST)
            .path("/orders/42")
            .header("x-original-host", "orders-master-staging.orders-3")
            .header("x-request-id", "r-1")
            .body(r#"{"qty":1}"#);
        then.status(201).body("created");
    });

    let transport = Arc::new(LoopbackTransport {
        server_base: server.base_url(),
        client: test_client(),
    });
    let target = ServiceTarget::new("master", "staging", "orders", "orders").with_version(3);
    let mut svc: Box<dyn ServiceTransport> = Box::new(Service::with_transport(target, transport));

    svc.dial(
        Request::new(http::Method::POST, "orders/42")
            .with_header("x-request-id", "r-1")
            .with_body(r#"{"qty":1}"#),
    )
    .await
    .unwrap();
    let response = svc.call().await.unwrap();

    assert_eq!(response.status(), http::StatusCode::CREATED);
    assert_eq!(svc.name(), "orders");
    orders.assert();
}
