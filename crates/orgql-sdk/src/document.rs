//! Request bodies for the GraphQL endpoint.
//!
//! Bodies are raw GraphQL text. They are syntax-checked locally so obviously
//! broken queries never reach the org.

use crate::error::OrgApiError;
use apollo_parser::cst;
use apollo_parser::Parser;

/// A syntax-checked GraphQL executable document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQLBody {
    query: String,
    operation_name: Option<String>,
}

impl GraphQLBody {
    /// Parse `query`, rejecting empty bodies, syntax errors and documents
    /// without any operation.
    pub fn parse(query: impl Into<String>) -> Result<Self, OrgApiError> {
        let query = query.into().trim().to_string();
        if query.is_empty() {
            return Err(OrgApiError::InvalidInput("GraphQL body is empty".to_string()));
        }

        let tree = Parser::new(&query).parse();
        let errors: Vec<String> = tree
            .errors()
            .map(|e| format!("{} (at offset {})", e.message(), e.index()))
            .collect();
        if !errors.is_empty() {
            return Err(OrgApiError::InvalidInput(format!(
                "GraphQL syntax error: {}",
                errors.join("; ")
            )));
        }

        let doc = tree.document();
        let first_operation = doc.definitions().find_map(|def| match def {
            cst::Definition::OperationDefinition(op) => Some(op),
            _ => None,
        });
        let Some(operation) = first_operation else {
            return Err(OrgApiError::InvalidInput(
                "GraphQL body contains no query or mutation".to_string(),
            ));
        };
        let operation_name = operation
            .name()
            .map(|n| n.text().to_string())
            .filter(|n| !n.is_empty());

        Ok(Self {
            query,
            operation_name,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Name of the first operation, e.g. `accounts` for `query accounts { ... }`.
    pub fn operation_name(&self) -> Option<&str> {
        self.operation_name.as_deref()
    }

    /// The JSON payload POSTed to the endpoint.
    pub fn to_request_json(&self) -> serde_json::Value {
        serde_json::json!({
            "query": self.query,
            "variables": {},
        })
    }
}
