//! Offline index build: documents -> pages -> chunks -> embeddings -> index.
//!
//! Runs as a standalone batch job. It never touches an index that a server
//! has open; the new artifacts replace the old ones only after they are
//! complete.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

use policyrag_core::chunker::Chunker;
use policyrag_core::traits::{Embedder, PageExtractor};
use policyrag_core::types::{Chunk, Document, Embedding};
use policyrag_core::{Error, Result};

use crate::documents::discover_documents;
use crate::flat::FlatL2Index;
use crate::store::{payload_digest, write_index, IndexMeta, LoadedIndex};

const EMBED_BATCH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    pub documents: usize,
    pub pages: usize,
    pub chunks: usize,
    pub dim: usize,
}

pub struct IndexBuilder<'a> {
    chunker: Chunker,
    embedder: &'a dyn Embedder,
    extractor: &'a dyn PageExtractor,
    show_progress: bool,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(chunker: Chunker, embedder: &'a dyn Embedder, extractor: &'a dyn PageExtractor) -> Self {
        Self { chunker, embedder, extractor, show_progress: false }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn load_documents(&self, documents_dir: &Path) -> Result<Vec<Document>> {
        let sources = discover_documents(documents_dir, self.extractor)?;
        tracing::info!(
            count = sources.len(),
            names = ?sources.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
            "found documents"
        );
        sources
            .into_iter()
            .map(|src| {
                let pages = self.extractor.extract_pages(&src.path)?;
                tracing::debug!(document = %src.id, pages = pages.len(), "extracted pages");
                Ok(Document { id: src.id, pages })
            })
            .collect()
    }

    /// Chunks in document order, then page order, then offset order. This
    /// order is the row order of the index.
    pub fn chunk_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        documents
            .iter()
            .flat_map(|doc| doc.pages.iter().flat_map(|page| self.chunker.chunk_page(&doc.id, page)))
            .collect()
    }

    pub fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Embedding>> {
        let pb = if self.show_progress {
            let pb = ProgressBar::new(chunks.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        } else {
            ProgressBar::hidden()
        };
        let mut embeddings = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(EMBED_BATCH) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts)?;
            if vectors.len() != texts.len() {
                return Err(Error::unavailable(format!(
                    "{} returned {} embeddings for {} texts",
                    self.embedder.embedder_id(),
                    vectors.len(),
                    texts.len()
                )));
            }
            if let Some(bad) = vectors.iter().find(|v| v.len() != self.embedder.dim()) {
                return Err(Error::unavailable(format!(
                    "{} returned a {}-dimensional vector, expected {}",
                    self.embedder.embedder_id(),
                    bad.len(),
                    self.embedder.dim()
                )));
            }
            embeddings.extend(vectors);
            pb.inc(batch.len() as u64);
        }
        pb.finish_with_message("embedded");
        Ok(embeddings)
    }

    /// Builds in memory without touching disk.
    pub fn build(&self, documents_dir: &Path) -> Result<(LoadedIndex, BuildReport)> {
        let documents = self.load_documents(documents_dir)?;
        let pages = documents.iter().map(|d| d.pages.len()).sum();
        let chunks = self.chunk_documents(&documents);
        tracing::info!(chunks = chunks.len(), pages, "chunked documents");
        if chunks.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "documents under {} contain no extractable text",
                documents_dir.display()
            )));
        }
        let embeddings = self.embed_chunks(&chunks)?;
        let index = FlatL2Index::build(&embeddings)?;
        let meta = IndexMeta {
            embedder_id: self.embedder.embedder_id().to_string(),
            dim: index.dim(),
            built_at: chrono::Utc::now().to_rfc3339(),
            payload_digest: payload_digest(&index),
            chunks,
        };
        let report = BuildReport { documents: documents.len(), pages, chunks: meta.chunks.len(), dim: index.dim() };
        Ok((LoadedIndex::new(index, meta)?, report))
    }

    pub fn build_and_persist(&self, documents_dir: &Path, index_dir: &Path) -> Result<BuildReport> {
        let (loaded, report) = self.build(documents_dir)?;
        write_index(index_dir, &loaded)?;
        Ok(report)
    }
}
