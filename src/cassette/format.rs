//! Cassette data structures for recording and replaying interactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version of `leanup` stamped into new cassettes.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A single recorded interaction with an external port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Sequence number (assigned automatically by the recorder).
    pub seq: u64,
    /// Port name (`"shell"` or `"http"`).
    pub port: String,
    /// Method name invoked on the port.
    pub method: String,
    /// Input data sent to the port.
    pub input: serde_json::Value,
    /// Output data returned from the port.
    pub output: serde_json::Value,
}

impl Interaction {
    /// Builds an interaction; `seq` is left at 0 for the recorder to assign.
    #[must_use]
    pub fn new(
        port: impl Into<String>,
        method: impl Into<String>,
        input: serde_json::Value,
        output: serde_json::Value,
    ) -> Self {
        Self {
            seq: 0,
            port: port.into(),
            method: method.into(),
            input,
            output,
        }
    }
}

/// A cassette containing a sequence of recorded interactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Human-readable name for this cassette.
    pub name: String,
    /// When this cassette was recorded.
    pub recorded_at: DateTime<Utc>,
    /// `leanup` version that produced the recording.
    pub tool_version: String,
    /// Ordered list of interactions.
    pub interactions: Vec<Interaction>,
}

impl Cassette {
    /// Creates a cassette from interactions, numbering them in order.
    #[must_use]
    pub fn from_interactions(name: impl Into<String>, interactions: Vec<Interaction>) -> Self {
        let interactions = interactions
            .into_iter()
            .zip(0u64..)
            .map(|(interaction, seq)| Interaction { seq, ..interaction })
            .collect();
        Self {
            name: name.into(),
            recorded_at: Utc::now(),
            tool_version: TOOL_VERSION.to_string(),
            interactions,
        }
    }
}
