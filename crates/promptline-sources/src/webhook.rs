//! Client for the automation webhook behind the dashboards.
//!
//! One URL serves three requests: the Instagram profile report (GET), the
//! document trigger and the access request (both POST).
use chrono::Local;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::error::SourceError;
use crate::instagram::{parse_posts, PostRecord};

/// The report is built on demand and can take minutes.
pub const REPORT_TIMEOUT: Duration = Duration::from_secs(300);
const REPORT_KIND: &str = "analisis_perfil";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTrigger {
    pub documento_url: String,
    pub nombre_archivo: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedAccess {
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub instagram: bool,
    #[serde(default)]
    pub logo: bool,
    #[serde(default)]
    pub identidad_visual: bool,
}

impl RequestedAccess {
    /// Names of the requested accesses, in display order.
    pub fn granted(&self) -> Vec<&'static str> {
        [
            ("meta", self.meta),
            ("instagram", self.instagram),
            ("logo", self.logo),
            ("identidad_visual", self.identidad_visual),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRequest {
    pub email: String,
    pub accesos_solicitados: RequestedAccess,
    pub fecha_solicitud: String,
}

impl AccessRequest {
    pub fn new(email: impl Into<String>, access: RequestedAccess) -> Self {
        Self {
            email: email.into(),
            accesos_solicitados: access,
            fecha_solicitud: request_timestamp(),
        }
    }

    pub fn validate(&self) -> Result<(), SourceError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(SourceError::Validation("email is required".to_string()));
        }
        if !email.contains('@') || !email.contains('.') {
            return Err(SourceError::Validation(format!("invalid email {}", email)));
        }
        Ok(())
    }
}

/// Strip spaces and leading `@` from a handle.
pub fn normalize_handle(handle: &str) -> Result<String, SourceError> {
    let handle = handle.trim().trim_start_matches('@').trim();
    if handle.is_empty() {
        return Err(SourceError::Validation("instagram handle is required".to_string()));
    }
    Ok(handle.to_string())
}

fn request_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

pub struct WebhookClient {
    client: Client,
    url: String,
    report_timeout: Duration,
}

impl WebhookClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            report_timeout: REPORT_TIMEOUT,
        }
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_report_timeout(mut self, timeout: Duration) -> Self {
        self.report_timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Ask the webhook for a profile report and normalise its records.
    pub async fn fetch_instagram_report(&self, handle: &str) -> Result<Vec<PostRecord>, SourceError> {
        let handle = normalize_handle(handle)?;
        tracing::info!(handle = %handle, "requesting instagram report");

        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("usuario_instagram", handle.as_str()),
                ("fecha_solicitud", request_timestamp().as_str()),
                ("tipo_informe", REPORT_KIND),
            ])
            .timeout(self.report_timeout)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest("instagram report", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SourceError::Malformed(format!("instagram report: {}", e)))?;
        let posts = parse_posts(&body)?;
        tracing::info!(handle = %handle, posts = posts.len(), "instagram report received");
        Ok(posts)
    }

    pub async fn trigger_document(&self, trigger: &DocumentTrigger) -> Result<(), SourceError> {
        if trigger.documento_url.trim().is_empty() || trigger.nombre_archivo.trim().is_empty() {
            return Err(SourceError::Validation(
                "documento_url and nombre_archivo are required".to_string(),
            ));
        }
        self.post_expecting_ok("document trigger", trigger).await
    }

    pub async fn request_access(&self, request: &AccessRequest) -> Result<(), SourceError> {
        request.validate()?;
        self.post_expecting_ok("access request", request).await
    }

    /// Only HTTP 200 counts as accepted.
    async fn post_expecting_ok<T: Serialize>(&self, what: &str, body: &T) -> Result<(), SourceError> {
        let response = self
            .client
            .post(&self.url)
            .json(body)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(what, e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, what, "webhook rejected request");
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        tracing::info!(what, "webhook accepted request");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_handle() {
        assert_eq!(normalize_handle("  @acme.shop ").unwrap(), "acme.shop");
        assert!(normalize_handle("@").unwrap_err().is_validation());
    }

    #[test]
    fn test_email_validation() {
        let ok = AccessRequest::new("ana@empresa.com", RequestedAccess::default());
        assert!(ok.validate().is_ok());
        assert!(AccessRequest::new("ana@empresa", RequestedAccess::default()).validate().is_err());
        assert!(AccessRequest::new("", RequestedAccess::default()).validate().is_err());
    }

    #[test]
    fn test_granted_access() {
        let access = RequestedAccess {
            instagram: true,
            identidad_visual: true,
            ..Default::default()
        };
        assert_eq!(access.granted(), vec!["instagram", "identidad_visual"]);
    }
}
