mod common;

use common::{workspace, write, FakeProxy};
use httpmock::prelude::*;
use proxify_probe::core::ca::fetch_ca_certificate;
use proxify_probe::core::client::build_transport_client;
use proxify_probe::{ProbeError, ProbeRunner};

#[tokio::test]
async fn test_ca_download_writes_served_bytes() {
    let (temp_dir, storage, mut settings) = workspace();
    let (ca_pem, _) = common::self_signed_pair();

    let server = MockServer::start();
    let ca_mock = server.mock(|when, then| {
        when.method(GET).path("/cacert.crt");
        then.status(200)
            .header("Content-Type", "application/x-x509-ca-cert")
            .body(ca_pem.clone());
    });

    settings.endpoints.ca_url = server.url("/cacert.crt");
    settings.fetch_ca = true;

    let summary = ProbeRunner::new(settings, storage).run().await.unwrap();

    ca_mock.assert();
    let written = std::fs::read(temp_dir.path().join("rootCA.crt")).unwrap();
    assert!(!written.is_empty());
    assert_eq!(written, ca_pem.as_bytes());
    assert_eq!(summary.ca_bytes, Some(ca_pem.len() as u64));
}

#[tokio::test]
async fn test_ca_download_replaces_existing_bundle() {
    let (temp_dir, storage, mut settings) = workspace();
    write(&temp_dir, "rootCA.crt", "stale bundle from a previous proxy instance");

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/cacert.crt");
        then.status(200).body("fresh");
    });

    settings.endpoints.ca_url = server.url("/cacert.crt");
    let client = build_transport_client(&settings).unwrap();
    let bytes = fetch_ca_certificate(&client, &settings.endpoints.ca_url, &storage, "rootCA.crt")
        .await
        .unwrap();

    assert_eq!(bytes, 5);
    let written = std::fs::read_to_string(temp_dir.path().join("rootCA.crt")).unwrap();
    assert_eq!(written, "fresh");
}

#[tokio::test]
async fn test_ca_download_error_status_is_fatal_and_keeps_old_file() {
    let (temp_dir, storage, mut settings) = workspace();
    write(&temp_dir, "rootCA.crt", "previous bundle");

    let server = MockServer::start();
    let ca_mock = server.mock(|when, then| {
        when.method(GET).path("/cacert.crt");
        then.status(404).body("not found");
    });

    settings.endpoints.ca_url = server.url("/cacert.crt");
    settings.fetch_ca = true;
    settings.fetch_breweries = true;

    let result = ProbeRunner::new(settings, storage).run().await;

    ca_mock.assert();
    assert!(matches!(
        result,
        Err(ProbeError::UnexpectedStatus { status: 404, .. })
    ));
    let kept = std::fs::read_to_string(temp_dir.path().join("rootCA.crt")).unwrap();
    assert_eq!(kept, "previous bundle");
}

#[tokio::test]
async fn test_ca_download_rejects_empty_body() {
    let (temp_dir, storage, mut settings) = workspace();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/cacert.crt");
        then.status(200);
    });

    settings.endpoints.ca_url = server.url("/cacert.crt");
    let client = build_transport_client(&settings).unwrap();
    let result =
        fetch_ca_certificate(&client, &settings.endpoints.ca_url, &storage, "rootCA.crt").await;

    assert!(matches!(result, Err(ProbeError::EmptyBody { .. })));
    assert!(!temp_dir.path().join("rootCA.crt").exists());
}

#[tokio::test]
async fn test_ca_download_unreachable_proxy_fails() {
    let (_temp_dir, storage, mut settings) = workspace();
    settings.endpoints.proxy_url = Some("http://127.0.0.1:1".to_string());
    settings.endpoints.ca_url = "http://proxify.test/cacert.crt".to_string();
    settings.fetch_ca = true;

    let result = ProbeRunner::new(settings, storage).run().await;
    assert!(matches!(result, Err(ProbeError::HttpError(_))));
}

#[tokio::test]
async fn test_ca_download_goes_through_proxy() {
    let (temp_dir, storage, mut settings) = workspace();
    let proxy = FakeProxy::start("-----BEGIN CERTIFICATE-----\n").await;

    settings.endpoints.proxy_url = Some(proxy.url());
    settings.endpoints.ca_url = "http://proxify.test/cacert.crt".to_string();
    settings.fetch_ca = true;

    ProbeRunner::new(settings, storage).run().await.unwrap();

    let seen = proxy.seen();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].starts_with("GET http://proxify.test/cacert.crt HTTP/1.1"));
    let written = std::fs::read_to_string(temp_dir.path().join("rootCA.crt")).unwrap();
    assert_eq!(written, "-----BEGIN CERTIFICATE-----\n");
}
