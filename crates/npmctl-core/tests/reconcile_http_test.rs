//! End-to-end reconciliation against a mock management API.
#![allow(clippy::unwrap_used)]

use npmctl_api::{Credentials, Endpoint, Protocol, TransportConfig};
use npmctl_core::{
    CertificateProvider, CertificateSpec, CoreError, DesiredSpec, ProxySpec, TargetState,
    fetch_token, reconcile_desired,
};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOSTS: &str = "/api/nginx/proxy-hosts";
const CERTS: &str = "/api/nginx/certificates";

async fn server_with_login() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tokens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok"})))
        .mount(&server)
        .await;
    server
}

async fn token(server: &MockServer) -> npmctl_api::Token {
    let addr = server.address();
    let credentials = Credentials {
        endpoint: Endpoint::new(Protocol::Http, addr.ip().to_string(), addr.port()),
        user: "admin@example.com".into(),
        password: SecretString::from("changeme".to_string()),
    };
    fetch_token(&credentials, &TransportConfig::default())
        .await
        .unwrap()
}

fn proxy_spec() -> ProxySpec {
    ProxySpec {
        forward_host: Some("192.168.1.234".into()),
        forward_port: 81,
        ..ProxySpec::new("some.domain")
    }
}

fn stored_host() -> Value {
    json!({
        "id": 3,
        "domain_names": ["some.domain"],
        "forward_scheme": "http",
        "forward_host": "192.168.1.234",
        "forward_port": 81,
        "caching_enabled": false,
        "allow_websocket_upgrade": false,
        "certificate_id": 0,
        "ssl_forced": false,
        "http2_support": false,
        "enabled": true
    })
}

#[tokio::test]
async fn proxy_create_then_rerun_is_noop() {
    let server = server_with_login().await;
    // First listing sees nothing; later listings see the created host.
    Mock::given(method("GET"))
        .and(path(HOSTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(HOSTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stored_host()])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(HOSTS))
        .and(header("authorization", "Bearer tok"))
        .and(body_partial_json(json!({
            "domain_names": ["some.domain"],
            "forward_host": "192.168.1.234",
            "hsts_enabled": false,
            "block_exploits": false,
            "access_list_id": 0
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(stored_host()))
        .expect(1)
        .mount(&server)
        .await;

    let token = token(&server).await;
    let desired = DesiredSpec::Proxy(proxy_spec());
    let transport = TransportConfig::default();

    let first = reconcile_desired(token.clone(), &transport, &desired, false)
        .await
        .unwrap();
    let second = reconcile_desired(token, &transport, &desired, false)
        .await
        .unwrap();

    assert!(first.changed);
    assert_eq!(first.message, "created item: 3");
    assert!(!second.changed);
    assert_eq!(second.message, "item is already as expected: 3");
    assert_eq!(second.item, Some(stored_host()));
}

#[tokio::test]
async fn dry_run_issues_only_reads() {
    let server = server_with_login().await;
    Mock::given(method("GET"))
        .and(path(HOSTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stored_host()])))
        .mount(&server)
        .await;
    for verb in ["POST", "PUT", "DELETE"] {
        Mock::given(method(verb))
            .and(path(format!("{HOSTS}/3")))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
    }

    let token = token(&server).await;
    let desired = DesiredSpec::Proxy(ProxySpec {
        forward_port: 8080,
        ..proxy_spec()
    });

    let result = reconcile_desired(token, &TransportConfig::default(), &desired, true)
        .await
        .unwrap();

    assert!(result.changed);
    assert_eq!(result.message, "would have updated item: 3");
    assert_eq!(result.item.unwrap()["forward_port"], json!(8080));
}

#[tokio::test]
async fn proxy_absent_deletes_and_reports_null_item() {
    let server = server_with_login().await;
    Mock::given(method("GET"))
        .and(path(HOSTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stored_host()])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{HOSTS}/3")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .expect(1)
        .mount(&server)
        .await;

    let token = token(&server).await;
    let desired = DesiredSpec::Proxy(ProxySpec {
        state: TargetState::Absent,
        ..ProxySpec::new("some.domain")
    });

    let result = reconcile_desired(token, &TransportConfig::default(), &desired, false)
        .await
        .unwrap();

    assert!(result.changed);
    assert_eq!(result.item, None);
    assert_eq!(result.message, "deleted item: 3");
}

#[tokio::test]
async fn certificate_create_failure_carries_server_body() {
    let server = server_with_login().await;
    Mock::given(method("GET"))
        .and(path(CERTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(CERTS))
        .respond_with(ResponseTemplate::new(500).set_body_string("dns challenge failed"))
        .mount(&server)
        .await;

    let token = token(&server).await;
    let desired = DesiredSpec::Certificate(CertificateSpec {
        provider: CertificateProvider::Domainoffensive,
        provider_credentials: "do-token".into(),
        ..CertificateSpec::new("some.domain")
    });

    let err = reconcile_desired(token, &TransportConfig::default(), &desired, false)
        .await
        .unwrap_err();

    match err {
        CoreError::Transport {
            context,
            detail,
            status,
        } => {
            assert_eq!(context, "error on creating new item");
            assert_eq!(detail, "dns challenge failed");
            assert_eq!(status, Some(500));
        }
        other => panic!("expected Transport error, got: {other:?}"),
    }
}
