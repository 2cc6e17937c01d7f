//! A wiremock stand-in for an org's GraphQL endpoint.
//!
//! Seeded with one `Account` and no `Address` records. Requests without the
//! mock token get a 401; queries naming neither entity get a GraphQL error.

use orgql_sdk::OrgCredentials;
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, header, method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GRAPHQL_PATH: &str = r"^/services/data/v\d+\.\d+/graphql$";

pub struct MockOrg {
    server: MockServer,
}

impl MockOrg {
    pub const ACCESS_TOKEN: &'static str = "mock-org-token";

    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let bearer = format!("Bearer {}", Self::ACCESS_TOKEN);

        Mock::given(method("POST"))
            .and(path_regex(GRAPHQL_PATH))
            .and(header("Authorization", bearer.as_str()))
            .and(body_string_contains("Account"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Self::accounts_response()))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path_regex(GRAPHQL_PATH))
            .and(header("Authorization", bearer.as_str()))
            .and(body_string_contains("Address"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Self::addresses_response()))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path_regex(GRAPHQL_PATH))
            .and(header("Authorization", bearer.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{
                    "message": "Validation error: requested entity is not supported",
                    "extensions": {"ErrorType": "ValidationError"}
                }]
            })))
            .with_priority(10)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!([{
                "message": "Session expired or invalid",
                "errorCode": "INVALID_SESSION_ID"
            }])))
            .with_priority(20)
            .mount(&server)
            .await;

        Self { server }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Credentials accepted by this org.
    pub fn credentials(&self) -> OrgCredentials {
        OrgCredentials::new(self.uri(), Self::ACCESS_TOKEN)
    }

    /// The `query` field of every request received so far, in order.
    pub async fn received_queries(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|r| serde_json::from_slice::<Value>(&r.body).ok())
            .filter_map(|body| body["query"].as_str().map(str::to_string))
            .collect()
    }

    /// The URL path of every request received so far, in order.
    pub async fn received_paths(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| r.url.path().to_string())
            .collect()
    }

    pub fn accounts_response() -> Value {
        json!({
            "data": {
                "uiapi": {
                    "query": {
                        "Account": {
                            "edges": [{
                                "node": {
                                    "Id": "001xx000003DGb2AAG",
                                    "Name": {"value": "Sample Account for Entitlements"}
                                }
                            }]
                        }
                    }
                }
            },
            "errors": []
        })
    }

    pub fn addresses_response() -> Value {
        json!({
            "data": {"uiapi": {"query": {"Address": {"edges": []}}}},
            "errors": []
        })
    }
}
