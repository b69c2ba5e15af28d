//! Domain types shared by the indexing, retrieval and advisory crates.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A fixed-dimension vector produced by an `Embedder`.
pub type Embedding = Vec<f32>;

/// Field name to value, as handed to the churn classifier.
pub type CustomerRecord = BTreeMap<String, serde_json::Value>;

/// One page of raw extracted text. `number` is 1-based; `text` may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub text: String,
}

/// A source document identified by a stable name (its file name).
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub pages: Vec<Page>,
}

/// A bounded span of one page; the unit of retrieval.
///
/// Chunks have no identity of their own: the position of a chunk in the
/// persisted metadata sequence is the id returned by the vector index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source: String,
    pub page: u32,
}

/// A chunk materialised from a nearest-neighbour hit.
///
/// `distance` is the squared L2 distance to the query; lower is closer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub text: String,
    pub source: String,
    pub page: u32,
    pub distance: f32,
}

impl SearchResult {
    pub fn citation(&self) -> Citation {
        Citation { source: self.source.clone(), page: self.page }
    }
}

/// A retention action extracted from policy text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub title: String,
    pub details: String,
    pub eligibility: String,
}

/// A `(source, page)` reference, rendered as `"<source> (page <n>)"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Citation {
    pub source: String,
    pub page: u32,
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (page {})", self.source, self.page)
    }
}

impl Serialize for Citation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Coarse churn-risk bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    High,
    Medium,
    Low,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::High, RiskTier::Medium, RiskTier::Low];

    /// `>= 0.70` is high, `>= 0.50` is medium, anything else is low.
    pub fn from_probability(p: f64) -> Self {
        if p >= 0.7 {
            Self::High
        } else if p >= 0.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(Error::InvalidArgument(format!(
                "unknown risk tier '{other}' (expected high, medium or low)"
            ))),
        }
    }
}

/// Classifier output for a single customer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub churn_prediction: u8,
    pub churn_probability: f64,
    pub risk: RiskTier,
}

impl Prediction {
    pub fn from_probability(p: f64) -> Self {
        Self {
            churn_prediction: u8::from(p >= 0.5),
            churn_probability: (p * 10_000.0).round() / 10_000.0,
            risk: RiskTier::from_probability(p),
        }
    }
}

/// Policy-grounded, extractive recommendation for one risk tier.
///
/// `evidence_found == false` is the defined outcome when retrieval returned
/// nothing from the trusted source; `sources` and `actions` are then empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub risk: RiskTier,
    pub message: String,
    pub recommended_text: String,
    pub sources: Vec<Citation>,
    pub actions: Vec<Action>,
    pub evidence_found: bool,
}
