//! Integration tests for the export pipeline using wiremock
//!
//! A mock Compute API stands in for GCP; exporters, coordinator and
//! serializer run against it exactly as the binary does.

use gcloud_backup::export::{run_export, ExportTarget, Registry};
use gcloud_backup::gcp::auth::GcpCredentials;
use gcloud_backup::gcp::client::GcpClient;
use gcloud_backup::gcp::http::ApiError;
use serde_json::{json, Value};
use wiremock::matchers::{bearer_token, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROJECT: &str = "test-project";

fn client_for(server: &MockServer) -> GcpClient {
    GcpClient::with_credentials(
        GcpCredentials::from_access_token("test-token"),
        &format!("{}/compute/v1/", server.uri()),
    )
    .expect("client should build")
}

fn services(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

async fn mount_list(server: &MockServer, resource: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/compute/v1/projects/{}/global/{}", PROJECT, resource)))
        .and(bearer_token("test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_addresses(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/compute/v1/projects/{}/aggregated/addresses", PROJECT)))
        .and(bearer_token("test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

mod export_tests {
    use super::*;

    /// All four services end up in one document
    #[tokio::test]
    async fn test_full_export() {
        let server = MockServer::start().await;

        mount_list(&server, "firewalls", json!({
            "kind": "compute#firewallList",
            "items": [{"name": "allow-ssh", "allowed": [{"IPProtocol": "tcp", "ports": ["22"]}]}]
        }))
        .await;
        mount_list(&server, "routes", json!({
            "items": [{"name": "default-route", "destRange": "0.0.0.0/0"}]
        }))
        .await;
        mount_list(&server, "networks", json!({
            "items": [{"name": "default", "autoCreateSubnetworks": true}]
        }))
        .await;
        mount_addresses(&server, json!({
            "items": {
                "regions/us-central1": {"addresses": [{"name": "nat-ip", "address": "203.0.113.7"}]},
                "global": {"addresses": [{"name": "lb-ip"}]}
            }
        }))
        .await;

        let backup = run_export(
            &Registry::with_builtin(),
            &client_for(&server),
            &ExportTarget::new(PROJECT),
            &services(&["firewalls", "routes", "networks", "addresses"]),
        )
        .await
        .expect("export should succeed");

        let document: Value =
            serde_json::from_slice(&backup.to_json(true).unwrap()).expect("valid JSON");

        assert_eq!(document["firewalls"][0]["name"], "allow-ssh");
        assert_eq!(document["firewalls"][0]["allowed"][0]["ports"][0], "22");
        assert_eq!(document["routes"][0]["destRange"], "0.0.0.0/0");
        assert_eq!(document["networks"][0]["autoCreateSubnetworks"], true);
        assert_eq!(document["addresses"]["regions/us-central1"][0]["address"], "203.0.113.7");
        assert_eq!(document["addresses"]["global"][0]["name"], "lb-ip");
    }

    /// Only the requested service appears in the output
    #[tokio::test]
    async fn test_firewalls_only_omits_other_keys() {
        let server = MockServer::start().await;
        mount_list(&server, "firewalls", json!({"items": [{"name": "deny-all"}]})).await;

        let backup = run_export(
            &Registry::with_builtin(),
            &client_for(&server),
            &ExportTarget::new(PROJECT),
            &services(&["firewalls"]),
        )
        .await
        .unwrap();

        let text = String::from_utf8(backup.to_json(false).unwrap()).unwrap();
        assert_eq!(text, r#"{"firewalls":[{"name":"deny-all"}]}"#);
    }

    /// Unknown names are skipped, known names around them still exported
    #[tokio::test]
    async fn test_unknown_service_does_not_abort() {
        let server = MockServer::start().await;
        mount_list(&server, "routes", json!({"items": [{"name": "r1"}]})).await;
        mount_list(&server, "networks", json!({"items": [{"name": "n1"}]})).await;

        let backup = run_export(
            &Registry::with_builtin(),
            &client_for(&server),
            &ExportTarget::new(PROJECT),
            &services(&["routes", "instances", "networks"]),
        )
        .await
        .expect("unknown service should only warn");

        assert_eq!(backup.populated(), vec!["routes", "networks"]);
    }

    /// Scopes without addresses are dropped from the map
    #[tokio::test]
    async fn test_addresses_skip_empty_scopes() {
        let server = MockServer::start().await;
        mount_addresses(&server, json!({
            "kind": "compute#addressAggregatedList",
            "items": {
                "regions/europe-west1": {"addresses": []},
                "regions/us-east1": {"addresses": [{"name": "a"}, {"name": "b"}]},
                "regions/asia-east1": {
                    "warning": {"code": "NO_RESULTS_ON_PAGE", "message": "There are no results"}
                }
            }
        }))
        .await;

        let backup = run_export(
            &Registry::with_builtin(),
            &client_for(&server),
            &ExportTarget::new(PROJECT),
            &services(&["addresses"]),
        )
        .await
        .unwrap();

        let addresses = backup.addresses.expect("addresses requested");
        assert_eq!(addresses.len(), 1);
        assert_eq!(addresses["regions/us-east1"].len(), 2);
    }

    /// Only one request is made even when another page exists
    #[tokio::test]
    async fn test_next_page_is_not_followed() {
        let server = MockServer::start().await;
        mount_list(&server, "firewalls", json!({
            "items": [{"name": "fw-1"}],
            "nextPageToken": "token-page-2"
        }))
        .await;

        let backup = run_export(
            &Registry::with_builtin(),
            &client_for(&server),
            &ExportTarget::new(PROJECT),
            &services(&["firewalls"]),
        )
        .await
        .unwrap();

        assert_eq!(backup.firewalls.unwrap().len(), 1);
    }

    /// The region is accepted but does not change what is requested
    #[tokio::test]
    async fn test_region_does_not_change_requests() {
        let server = MockServer::start().await;
        mount_list(&server, "networks", json!({"items": [{"name": "default"}]})).await;

        let target = ExportTarget {
            project: PROJECT.to_string(),
            region: Some("us-central1".to_string()),
        };
        let backup = run_export(
            &Registry::with_builtin(),
            &client_for(&server),
            &target,
            &services(&["networks"]),
        )
        .await
        .unwrap();

        assert_eq!(backup.populated(), vec!["networks"]);
    }
}

mod failure_tests {
    use super::*;

    /// A permission error aborts the export and keeps the status
    #[tokio::test]
    async fn test_403_aborts_export() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/compute/v1/projects/{}/global/routes", PROJECT)))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {
                    "code": 403,
                    "message": "Required 'compute.routes.list' permission"
                }
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/compute/v1/projects/{}/global/firewalls", PROJECT)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .expect(0)
            .mount(&server)
            .await;

        let err = run_export(
            &Registry::with_builtin(),
            &client_for(&server),
            &ExportTarget::new(PROJECT),
            &services(&["routes", "firewalls"]),
        )
        .await
        .expect_err("403 should be fatal");

        let api_error = err.downcast_ref::<ApiError>().expect("ApiError in chain");
        assert_eq!(api_error.status, 403);
        assert_eq!(api_error.message, "Required 'compute.routes.list' permission");
        assert_eq!(err.to_string(), "Failed to export routes");
    }

    /// A body that is not JSON is fatal too
    #[tokio::test]
    async fn test_invalid_json_aborts_export() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/compute/v1/projects/{}/global/networks", PROJECT)))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = run_export(
            &Registry::with_builtin(),
            &client_for(&server),
            &ExportTarget::new(PROJECT),
            &services(&["networks"]),
        )
        .await;

        assert!(result.is_err());
    }

    /// 401 surfaces as an authentication failure
    #[tokio::test]
    async fn test_401_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/compute/v1/projects/{}/aggregated/addresses", PROJECT)))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"code": 401, "message": "Invalid credentials"}
            })))
            .mount(&server)
            .await;

        let err = run_export(
            &Registry::with_builtin(),
            &client_for(&server),
            &ExportTarget::new(PROJECT),
            &services(&["addresses"]),
        )
        .await
        .unwrap_err();

        let message = gcloud_backup::gcp::http::format_gcp_error(&err);
        assert!(message.contains("401 Invalid credentials"));
        assert!(message.contains("Authentication failed"));
    }
}
