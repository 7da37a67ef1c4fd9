//! Gateway-facing request and response shapes.
//!
//! The handler is served behind an API Gateway (REST or HTTP API) or a Lambda
//! function URL. Only the fields the download flow needs are modelled.

use crate::utils::error::{DownloadError, ErrorCategory};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};

pub const TX_HASH_PARAM: &str = "txHash";
pub const PRODUCT_ID_PARAM: &str = "productId";

const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";
const CONTENT_TYPE_JSON: &str = "application/json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRequest {
    /// REST API (payload v1) method.
    pub http_method: Option<String>,
    pub request_context: Option<RequestContext>,
    pub query_string_parameters: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
    /// HTTP API / function URL (payload v2) method.
    pub http: Option<HttpContext>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpContext {
    pub method: Option<String>,
}

impl GatewayRequest {
    /// Convenience constructor used by the CLI and tests.
    pub fn get(params: &[(&str, &str)]) -> Self {
        Self {
            http_method: Some("GET".to_string()),
            request_context: None,
            query_string_parameters: Some(
                params
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect(),
            ),
        }
    }

    /// Request method, upper-cased; `GET` when the event carries none.
    pub fn method(&self) -> String {
        self.http_method
            .as_deref()
            .or_else(|| {
                self.request_context
                    .as_ref()
                    .and_then(|context| context.http.as_ref())
                    .and_then(|http| http.method.as_deref())
            })
            .unwrap_or("GET")
            .to_ascii_uppercase()
    }

    pub fn is_preflight(&self) -> bool {
        self.method() == "OPTIONS"
    }

    /// A query parameter, with empty values treated as absent.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()?
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn cors_headers() -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
    headers.insert(
        "Access-Control-Allow-Methods".to_string(),
        "GET, POST, OPTIONS".to_string(),
    );
    headers.insert(
        "Access-Control-Allow-Headers".to_string(),
        "Content-Type".to_string(),
    );
    headers
}

impl GatewayResponse {
    pub fn preflight() -> Self {
        Self {
            status_code: 200,
            headers: cors_headers(),
            body: String::new(),
            is_base64_encoded: false,
        }
    }

    pub fn text(body: String) -> Self {
        let mut headers = cors_headers();
        headers.insert("Content-Type".to_string(), CONTENT_TYPE_TEXT.to_string());
        Self {
            status_code: 200,
            headers,
            body,
            is_base64_encoded: false,
        }
    }

    pub fn json_error(status_code: u16, body: &ErrorBody) -> Self {
        let mut headers = cors_headers();
        headers.insert("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string());
        let body = json!(body).to_string();
        Self {
            status_code,
            headers,
            body,
            is_base64_encoded: false,
        }
    }

    pub fn from_error(err: &DownloadError) -> Self {
        let category = err.category();
        let body = match category {
            ErrorCategory::BadRequest | ErrorCategory::Forbidden => ErrorBody {
                error: err.to_string(),
                message: None,
            },
            ErrorCategory::InternalError => ErrorBody {
                error: "Failed to process download".to_string(),
                message: Some(err.to_string()),
            },
        };
        Self::json_error(category.status_code(), &body)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
