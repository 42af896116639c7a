mod common;

use common::{self_signed_pair, workspace};
use httpmock::prelude::*;
use proxify_probe::ProbeRunner;

#[tokio::test]
async fn test_no_flags_is_a_noop() {
    let (_temp_dir, storage, settings) = workspace();

    let summary = ProbeRunner::new(settings, storage).run().await.unwrap();

    assert!(summary.ca_bytes.is_none());
    assert!(summary.breweries.is_none());
    assert!(summary.mtls_body.is_none());
}

#[tokio::test]
async fn test_all_paths_run_in_order() {
    let (temp_dir, storage, mut settings) = workspace();
    let (ca_pem, _) = self_signed_pair();

    let server = MockServer::start();
    let ca_mock = server.mock(|when, then| {
        when.method(GET).path("/cacert.crt");
        then.status(200).body(ca_pem.clone());
    });
    let brews_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/breweries")
            .query_param("by_city", "portland")
            .query_param("per_page", "2");
        then.status(200).json_body(serde_json::json!([
            {"id": "b1", "name": "Breakside"},
            {"id": "b2", "name": "Great Notion"}
        ]));
    });
    let hello_mock = server.mock(|when, then| {
        when.method(GET).path("/hello");
        then.status(200).body("hello from the trashcan");
    });

    settings.endpoints.ca_url = server.url("/cacert.crt");
    settings.endpoints.brewery_url = server.url("/breweries");
    settings.endpoints.ip_echo_url = server.url("/ip");
    settings.endpoints.mtls_url = server.url("/hello");
    settings.city = "portland".to_string();
    settings.per_page = 2;
    settings.fetch_ca = true;
    settings.fetch_breweries = true;
    settings.fetch_mtls = true;
    settings.no_certs = true;

    // The brewery client can only be built if the CA download ran first.
    assert!(!temp_dir.path().join("rootCA.crt").exists());

    let summary = ProbeRunner::new_with_monitoring(settings, storage, true)
        .run()
        .await
        .unwrap();

    ca_mock.assert();
    brews_mock.assert();
    hello_mock.assert();
    assert_eq!(summary.ca_bytes, Some(ca_pem.len() as u64));
    assert_eq!(summary.breweries.unwrap().len(), 2);
    assert_eq!(summary.mtls_body.as_deref(), Some("hello from the trashcan"));

    let written = std::fs::read_to_string(temp_dir.path().join("rootCA.crt")).unwrap();
    assert_eq!(written, ca_pem);
}
