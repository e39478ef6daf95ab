//! HTTP plumbing shared by every vendor adapter.

use std::time::Duration;

use pitchcraft_shared::{PitchcraftError, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

/// User-Agent string for vendor requests.
const USER_AGENT: &str = concat!("PitchCraft/", env!("CARGO_PKG_VERSION"));

/// Transport-level ceiling. Pipeline stage budgets are always tighter.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest slice of an error body kept in error messages.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Build a reqwest client with appropriate settings.
pub(crate) fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .map_err(|e| PitchcraftError::Network(format!("failed to build HTTP client: {e}")))
}

/// Validate a base URL and strip any trailing slash so paths can be appended.
pub(crate) fn parse_base_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw)
        .map_err(|e| PitchcraftError::config(format!("invalid base URL {raw:?}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(PitchcraftError::config(format!(
            "base URL must be http(s), got {raw:?}"
        )));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

/// Send a request and decode a JSON body.
///
/// Transport failures map to `Network`, non-2xx statuses to `Upstream`,
/// and undecodable bodies to `Malformed`.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: &str,
    request: RequestBuilder,
) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|e| PitchcraftError::Network(format!("{provider}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(PitchcraftError::Upstream(format!(
            "{provider}: HTTP {status}: {}",
            snippet(&body)
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| PitchcraftError::Network(format!("{provider}: failed to read body: {e}")))?;

    serde_json::from_str(&body).map_err(|e| {
        PitchcraftError::malformed(format!("{provider}: unexpected response body: {e}"))
    })
}

/// Reject a reply that carries no usable text.
pub(crate) fn non_blank(provider: &str, text: Option<String>) -> Result<String> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(PitchcraftError::malformed(format!(
            "{provider}: response contained no text"
        ))),
    }
}

fn snippet(body: &str) -> &str {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((idx, _)) => &trimmed[..idx],
        None => trimmed,
    }
}
