use std::path::Path;
use std::sync::Arc;

use policyrag_core::traits::Embedder;
use policyrag_core::types::{Chunk, SearchResult};
use policyrag_core::{Error, Result};

use crate::flat::FlatL2Index;
use crate::store::{load_index, LoadedIndex};

/// Embeds a query and materialises the nearest chunks.
///
/// Cloning is cheap; all clones share the same immutable index snapshot.
#[derive(Clone)]
pub struct Retriever {
    index: Arc<FlatL2Index>,
    chunks: Arc<[Chunk]>,
    embedder: Arc<dyn Embedder>,
}

impl Retriever {
    pub fn new(loaded: LoadedIndex, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let LoadedIndex { index, meta } = loaded;
        if embedder.dim() != index.dim() {
            return Err(Error::IndexLoad(format!(
                "embedder {} produces {}-dimensional vectors but the index was built with {}",
                embedder.embedder_id(),
                embedder.dim(),
                index.dim()
            )));
        }
        if embedder.embedder_id() != meta.embedder_id {
            tracing::warn!(
                built_with = %meta.embedder_id,
                serving_with = %embedder.embedder_id(),
                "embedder differs from the one used at build time"
            );
        }
        Ok(Self { index: Arc::new(index), chunks: meta.chunks.into(), embedder })
    }

    pub fn open(index_dir: &Path, embedder: Arc<dyn Embedder>) -> Result<Self> {
        Self::new(load_index(index_dir)?, embedder)
    }

    pub fn len(&self) -> usize { self.chunks.len() }
    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }
    pub fn dim(&self) -> usize { self.index.dim() }

    pub fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        if top_k == 0 {
            return Err(Error::InvalidArgument("top_k must be positive".into()));
        }
        if query.trim().is_empty() {
            return Err(Error::InvalidArgument("query must not be empty".into()));
        }
        let q = self.embedder.embed_one(query)?;
        if q.len() != self.index.dim() {
            return Err(Error::IndexLoad(format!(
                "query embedding has dimension {}, index has {}",
                q.len(),
                self.index.dim()
            )));
        }
        let hits = self.index.search(&q, top_k)?;
        hits.ids
            .iter()
            .zip(hits.distances.iter())
            .map(|(&id, &distance)| {
                let chunk = self
                    .chunks
                    .get(id)
                    .ok_or_else(|| Error::IndexLoad(format!("index returned id {id} outside metadata")))?;
                Ok(SearchResult { text: chunk.text.clone(), source: chunk.source.clone(), page: chunk.page, distance })
            })
            .collect()
    }
}
