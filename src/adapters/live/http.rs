//! Shared HTTP plumbing for the live adapters.

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;

use crate::config::RemoteConfig;
use crate::error::{RemoteError, RemoteResult};

/// Authenticated client for one hosted project.
///
/// Every request carries the anon key; the bearer token is the user's access
/// token when one is configured and the anon key otherwise.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

/// Error body returned by the hosted services.
#[derive(Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error: Option<String>,
    details: Option<String>,
}

impl RestClient {
    /// Builds a client for the configured project.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialised.
    pub fn new(config: &RemoteConfig) -> RemoteResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            access_token: config.access_token.clone(),
        })
    }

    /// Base URL of the project.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Access token of the signed-in user, if configured.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Absolute URL for a service path such as `/rest/v1/tasks`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Starts an authenticated request.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.client
            .request(method, self.url(path))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    /// Sends a request and decodes the JSON body; an empty body decodes as null.
    ///
    /// # Errors
    ///
    /// Returns `Http` on transport failure, `Api` for a non-success status,
    /// and `Decode` for a body that is not JSON.
    pub async fn send_json(&self, request: RequestBuilder) -> RemoteResult<Value> {
        let response = request.send().await?;
        let text = check_status(response).await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

/// Reads the body, turning a non-success status into [`RemoteError::Api`].
///
/// # Errors
///
/// Returns `Http` if the body cannot be read, or `Api` for a non-success status.
pub async fn check_status(response: Response) -> RemoteResult<String> {
    let status = response.status();
    let text = response.text().await?;
    if status.is_success() {
        return Ok(text);
    }
    Err(api_error(status.as_u16(), &text))
}

/// Builds an API error from a status and raw body.
#[must_use]
pub fn api_error(status: u16, body: &str) -> RemoteError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => RemoteError::Api {
            status,
            message: parsed
                .message
                .or(parsed.msg)
                .or(parsed.error)
                .unwrap_or_else(|| body.to_string()),
            details: parsed.details,
        },
        Err(_) => RemoteError::Api { status, message: body.to_string(), details: None },
    }
}

/// Expects a JSON array body.
///
/// # Errors
///
/// Returns `Decode` for any other shape.
pub fn into_rows(value: Value) -> RemoteResult<Vec<Value>> {
    match value {
        Value::Array(rows) => Ok(rows),
        Value::Null => Ok(Vec::new()),
        other => Err(RemoteError::Decode(format!("expected an array of rows, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn api_error_prefers_message_and_keeps_details() {
        let err = api_error(409, r#"{"message":"duplicate key","details":"Key (id)","code":"23505"}"#);
        match err {
            RemoteError::Api { status, message, details } => {
                assert_eq!(status, 409);
                assert_eq!(message, "duplicate key");
                assert_eq!(details.as_deref(), Some("Key (id)"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn api_error_falls_back_to_raw_body() {
        let err = api_error(502, "Bad Gateway");
        assert_eq!(err.to_string(), "API error (502): Bad Gateway");

        let err = api_error(400, r#"{"error":"invalid_grant"}"#);
        assert_eq!(err.to_string(), "API error (400): invalid_grant");
    }

    #[test]
    fn rows_must_be_an_array() {
        assert_eq!(into_rows(json!([{"id": 1}])).unwrap().len(), 1);
        assert!(into_rows(Value::Null).unwrap().is_empty());
        assert!(into_rows(json!({"id": 1})).is_err());
    }

    #[test]
    fn url_joins_base_and_path() {
        let client = RestClient::new(&RemoteConfig {
            url: "https://demo.example.co/".into(),
            anon_key: "anon".into(),
            access_token: None,
        })
        .unwrap();
        assert_eq!(client.url("/rest/v1/tasks"), "https://demo.example.co/rest/v1/tasks");
        assert!(client.access_token().is_none());
    }
}
