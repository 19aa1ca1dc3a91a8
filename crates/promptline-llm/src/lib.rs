//! Promptline LLM: hosted model providers
//!
//! Each provider implements [`GenerationClient`] with exactly one HTTP call
//! per request and no retries. [`ModelRouter`] picks the provider from the
//! model id prefix; providers without a credential are simply absent.
//!
//! ```ignore
//! let router = ModelRouter::from_keys(&keys, DEFAULT_TIMEOUT)?;
//! let text = router.generate(GenerationRequest::new("gemini-2.0-flash-exp", "Hi")).await?;
//! ```
//!
//! [`GenerationClient`]: promptline_core::GenerationClient

pub mod http;
pub mod providers;
pub mod router;

pub use http::{build_http_client, DEFAULT_TIMEOUT};
pub use providers::{AnthropicClient, GeminiClient, OpenAiClient};
pub use router::{ModelRouter, ProviderKeys, ProviderKind};
