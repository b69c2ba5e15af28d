//! Collaborator contracts. Implementations are constructed once at process
//! start and shared read-only, hence the `Send + Sync` bounds.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{CustomerRecord, Embedding, Page};

pub trait Embedder: Send + Sync {
    /// Stable identifier for the model (e.g. `fake:xxh64:d384`).
    fn embedder_id(&self) -> &str;
    /// Embedding dimensionality (D).
    fn dim(&self) -> usize;
    /// One vector of length `dim()` per input text, in input order.
    /// Identical inputs must produce identical vectors.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    fn embed_one(&self, text: &str) -> Result<Embedding> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| Error::unavailable(format!("{} returned no embedding", self.embedder_id())))
    }
}

pub trait PageExtractor: Send + Sync {
    fn supports(&self, path: &Path) -> bool;
    /// Ordered pages with 1-based numbers.
    fn extract_pages(&self, path: &Path) -> Result<Vec<Page>>;
}

pub trait ChurnClassifier: Send + Sync {
    /// Probability of churn in `[0, 1]`.
    fn predict_proba(&self, customer: &CustomerRecord) -> Result<f64>;
}
