//! policyrag-index
//!
//! Exact vector index, its two-file persistence, the offline builder and the
//! query-time retriever.

pub mod builder;
pub mod documents;
pub mod flat;
pub mod retriever;
pub mod store;

pub use builder::{BuildReport, IndexBuilder};
pub use documents::{discover_documents, DocumentExtractor, PdfExtractor, SourceDocument, TextExtractor};
pub use flat::{FlatL2Index, Neighbors};
pub use retriever::Retriever;
pub use store::{load_index, payload_digest, write_index, IndexMeta, LoadedIndex, INDEX_FILE, META_FILE};
