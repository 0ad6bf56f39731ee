//! HTTP client wrapper for the BRO REST API.
//!
//! Each request is sent once. Success statuses hand back the body, anything
//! else becomes a [`BroError::Status`] carrying the body BRO sent along
//! (a JSON description for 400 responses).

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::config::{HTTP_TIMEOUT_SECS, REQUEST_REFERENCE};
use crate::error::{BroError, Result};

/// User agent string identifying this client.
const USER_AGENT: &str = concat!("bro-client/", env!("CARGO_PKG_VERSION"));

const APPLICATION_XML: &str = "application/xml";
const APPLICATION_JSON: &str = "application/json";

/// Create a configured HTTP client with the default timeout.
pub fn create_client() -> Result<Client> {
    create_client_with_timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
}

/// Create a configured HTTP client with a custom timeout.
pub fn create_client_with_timeout(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// GET an XML document.
///
/// # Returns
/// Raw bytes of the response body
pub fn get_xml(client: &Client, url: &str) -> Result<Vec<u8>> {
    let request = client
        .get(with_request_reference(url))
        .header(ACCEPT, APPLICATION_XML);
    send(request, url)
}

/// POST a JSON body and receive an XML document.
pub fn post_json_for_xml(client: &Client, url: &str, body: &serde_json::Value) -> Result<Vec<u8>> {
    let request = client
        .post(with_request_reference(url))
        .header(ACCEPT, APPLICATION_XML)
        .header(CONTENT_TYPE, APPLICATION_JSON)
        .body(serde_json::to_vec(body)?);
    send(request, url)
}

/// Append the request reference query parameter.
///
/// The reference only holds URL-safe characters, so no encoding is needed.
pub fn with_request_reference(url: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}requestReference={REQUEST_REFERENCE}")
}

fn send(request: RequestBuilder, url: &str) -> Result<Vec<u8>> {
    let response = request.send()?;
    let status = response.status();

    if !status.is_success() {
        // Body is best effort, the status is what matters
        let body = response.text().unwrap_or_default();
        tracing::warn!(status = %status, url, "BRO API request failed");
        return Err(BroError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes()?;
    tracing::debug!(url, size = bytes.len(), "Received response");
    Ok(bytes.to_vec())
}
