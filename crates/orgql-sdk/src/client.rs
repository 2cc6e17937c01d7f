//! Async org GraphQL client.
//!
//! Construct a [`Client`] from [`OrgCredentials`] (see [`crate::auth`] for
//! resolving them), then send raw GraphQL bodies with
//! [`Client::request_graphql`] or [`Client::graphql`].

use crate::auth::{self, OrgCredentials, DEFAULT_API_VERSION};
use crate::document::GraphQLBody;
use crate::error::{GraphQLError, OrgApiError};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

/// The org API client.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    access_token: String,
    instance_url: Url,
    api_version: String,
}

/// A GraphQL response document, `{ data, errors }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQLResponse {
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub errors: Vec<GraphQLError>,
}

impl GraphQLResponse {
    /// Return `data`, or the reported errors if there are any.
    pub fn into_data(self, operation_name: Option<&str>) -> Result<serde_json::Value, OrgApiError> {
        if !self.errors.is_empty() {
            return Err(OrgApiError::GraphQL {
                errors: self.errors,
                operation_name: operation_name.map(str::to_string),
            });
        }
        self.data
            .ok_or_else(|| OrgApiError::MissingData("No data in response".to_string()))
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<GraphQLError>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<GraphQLError>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A successful (2xx) HTTP response, kept byte-for-byte.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Parse the body as arbitrary JSON.
    pub fn json(&self) -> Result<serde_json::Value, OrgApiError> {
        serde_json::from_slice(&self.body).map_err(|e| {
            OrgApiError::MissingData(format!("Response body is not valid JSON: {}", e))
        })
    }

    /// Parse the body as a `{ data, errors }` document.
    pub fn decode(&self) -> Result<GraphQLResponse, OrgApiError> {
        serde_json::from_slice(&self.body).map_err(|e| {
            OrgApiError::MissingData(format!("Response body is not a GraphQL document: {}", e))
        })
    }
}

impl Client {
    /// Create a client from explicit credentials.
    pub fn from_credentials(credentials: OrgCredentials) -> Result<Self, OrgApiError> {
        if credentials.access_token.trim().is_empty() {
            return Err(OrgApiError::AuthConfig(
                "Access token cannot be empty".to_string(),
            ));
        }
        let instance_url = auth::normalize_instance_url(&credentials.instance_url)?;
        let api_version = match credentials.api_version.as_deref() {
            Some(v) => auth::normalize_api_version(v)?,
            None => DEFAULT_API_VERSION.to_string(),
        };
        Ok(Self {
            http: reqwest::Client::new(),
            access_token: credentials.access_token.trim().to_string(),
            instance_url,
            api_version,
        })
    }

    /// Pin the API version used to build the endpoint URL.
    pub fn with_api_version(mut self, version: &str) -> Result<Self, OrgApiError> {
        self.api_version = auth::normalize_api_version(version)?;
        Ok(self)
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// `<instance>/services/data/v<version>/graphql`
    pub fn graphql_endpoint(&self) -> String {
        format!(
            "{}/services/data/v{}/graphql",
            self.instance_url.as_str().trim_end_matches('/'),
            self.api_version
        )
    }

    /// Send a GraphQL body and return the raw 2xx response.
    ///
    /// GraphQL-level `errors` are left in the body untouched; only
    /// HTTP-level failures become errors here.
    pub async fn request_graphql(&self, body: &GraphQLBody) -> Result<RawResponse, OrgApiError> {
        let endpoint = self.graphql_endpoint();
        tracing::debug!(
            endpoint = %endpoint,
            operation = body.operation_name().unwrap_or("<anonymous>"),
            "sending GraphQL request"
        );

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.access_token)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header(
                "User-Agent",
                format!("orgql-sdk/{}", env!("CARGO_PKG_VERSION")),
            )
            .json(&body.to_request_json())
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "received response");

        if status == 401 || status == 403 {
            let text = response.text().await.unwrap_or_default();
            if status == 401 {
                return Err(OrgApiError::Authentication(text));
            }
            return Err(OrgApiError::Forbidden(text));
        }
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<f64>().ok());
            let text = response.text().await.unwrap_or_default();
            return Err(OrgApiError::RateLimited {
                retry_after,
                message: text,
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OrgApiError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let bytes = response.bytes().await?.to_vec();
        tracing::debug!(bytes = bytes.len(), "read response body");

        Ok(RawResponse {
            status: status.as_u16(),
            headers,
            body: bytes,
        })
    }

    /// Send a GraphQL body and decode the `{ data, errors }` document.
    pub async fn graphql(&self, body: &GraphQLBody) -> Result<GraphQLResponse, OrgApiError> {
        self.request_graphql(body).await?.decode()
    }
}
