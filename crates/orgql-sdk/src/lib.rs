pub mod auth;
pub mod client;
pub mod document;
pub mod error;

// Re-export key types at crate root for convenience.
pub use auth::OrgCredentials;
pub use client::{Client, GraphQLResponse, RawResponse};
pub use document::GraphQLBody;
pub use error::{GraphQLError, OrgApiError};
