use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Why an upstream call produced no data.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP error: {0}")]
    HttpStatus(StatusCode),
    #[error("API error (code {code}): {msg}")]
    Upstream { code: String, msg: String },
    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub fn build_http_client(timeout: Duration) -> Result<Client, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()?)
}

/// Single GET, no retries. The body is read as text first so a malformed
/// payload surfaces as `Decode` rather than `Transport`.
pub async fn get_json(client: &Client, url: &str, query: &[(&str, String)]) -> Result<Value, FetchError> {
    let response = client.get(url).query(query).send().await?;
    read_json(response).await
}

pub async fn post_json<B: Serialize + ?Sized>(client: &Client, url: &str, body: &B) -> Result<Value, FetchError> {
    let response = client.post(url).json(body).send().await?;
    read_json(response).await
}

async fn read_json(response: reqwest::Response) -> Result<Value, FetchError> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus(status));
    }
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_message() {
        let err = FetchError::Upstream {
            code: "50011".to_string(),
            msg: "Too Many Requests".to_string(),
        };
        assert_eq!(err.to_string(), "API error (code 50011): Too Many Requests");
    }

    #[test]
    fn client_builds_with_timeout() {
        assert!(build_http_client(Duration::from_secs(20)).is_ok());
    }
}
