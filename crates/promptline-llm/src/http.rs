//! Request plumbing shared by the provider clients.
use base64::{engine::general_purpose, Engine as _};
use promptline_core::{Attachment, GenerationError};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default timeout for one generation call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// HTTP client shared by every provider of a router.
pub fn build_http_client(timeout: Duration) -> Result<Client, GenerationError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| GenerationError::Transport(e.to_string()))
}

/// Send one request and decode the JSON body.
///
/// 401/403 become `Auth`, any other non-success status becomes `Api`.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: &str,
    request: RequestBuilder,
) -> Result<T, GenerationError> {
    let response = request.send().await.map_err(map_send_error)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        if status == 401 || status == 403 {
            return Err(GenerationError::Auth(format!(
                "{} rejected the credential: {}",
                provider, body
            )));
        }
        return Err(GenerationError::Api {
            status: status.as_u16(),
            body,
        });
    }

    let text = response.text().await.map_err(map_send_error)?;
    serde_json::from_str(&text)
        .map_err(|e| GenerationError::Malformed(format!("{} response: {}", provider, e)))
}

fn map_send_error(error: reqwest::Error) -> GenerationError {
    if error.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Transport(error.to_string())
    }
}

pub(crate) fn encode_attachment(attachment: &Attachment) -> String {
    general_purpose::STANDARD.encode(&attachment.bytes)
}

/// `data:` URL form used by OpenAI-compatible image parts.
pub(crate) fn data_url(attachment: &Attachment) -> String {
    format!(
        "data:{};base64,{}",
        attachment.media_type,
        encode_attachment(attachment)
    )
}
