//! Error handling for pnlview
//!
//! Defines the snapshot-fetch error taxonomy and establishes a unified
//! Result type using anyhow for context chaining and error propagation.
//!
//! Shape problems inside an otherwise valid snapshot are NOT errors: the
//! ingestion and aggregation layers degrade to empty or partial results
//! instead (see `snapshot`, `reconcile` and `series`). Only the transport
//! and parse layer is fatal to a fetch cycle.

use thiserror::Error;

/// Fatal errors from the snapshot fetch cycle
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("gateway returned status {status}: {excerpt}")]
    Status {
        status: reqwest::StatusCode,
        excerpt: String,
    },

    /// The tunnel or proxy in front of the gateway served an HTML warning
    /// page instead of JSON (e.g. the ngrok free-tier interstitial).
    #[error("received HTML instead of JSON from the gateway (tunnel/proxy warning page?): {excerpt}")]
    HtmlBody { excerpt: String },

    #[error("failed to parse snapshot JSON: {source} (body starts: {excerpt})")]
    Parse {
        #[source]
        source: serde_json::Error,
        excerpt: String,
    },

    #[error("request to gateway failed")]
    Transport(#[from] reqwest::Error),
}

/// Result type alias for pnlview operations
pub type Result<T> = anyhow::Result<T>;
