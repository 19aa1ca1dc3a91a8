//! Promptline Sources: where pipeline payloads come from.
//!
//! - [`WebhookClient`]: Instagram profile reports, document triggers and
//!   access requests against the automation webhook
//! - [`CompetitorFinder`]: competitor URLs from a search-grounded model
//! - [`FirecrawlClient`]: structured competitor profiles from their sites

pub mod discovery;
pub mod error;
pub mod firecrawl;
pub mod instagram;
pub mod webhook;

pub use discovery::{parse_urls, CompetitorFinder, DiscoveryQuery};
pub use error::SourceError;
pub use firecrawl::{CompetitorProfile, FirecrawlClient};
pub use instagram::{parse_posts, PostRecord, PostSummary};
pub use webhook::{AccessRequest, DocumentTrigger, RequestedAccess, WebhookClient};
