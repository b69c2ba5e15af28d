//! Source document discovery and per-page text extraction.

use std::fs;
use std::path::{Path, PathBuf};

use policyrag_core::traits::PageExtractor;
use policyrag_core::types::Page;
use policyrag_core::{Error, Result};

/// A file selected for indexing. `id` is the file name and is what results
/// cite as their source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub id: String,
    pub path: PathBuf,
}

/// Every file under `root` that `extractor` supports, sorted by file name.
pub fn discover_documents(root: &Path, extractor: &dyn PageExtractor) -> Result<Vec<SourceDocument>> {
    let mut docs: Vec<SourceDocument> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && extractor.supports(e.path()))
        .map(|e| SourceDocument {
            id: e.file_name().to_string_lossy().to_string(),
            path: e.path().to_path_buf(),
        })
        .collect();
    if docs.is_empty() {
        return Err(Error::NoDocumentsFound(root.to_path_buf()));
    }
    docs.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.path.cmp(&b.path)));
    Ok(docs)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().and_then(|s| s.to_str()).is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn numbered(texts: impl IntoIterator<Item = String>) -> Vec<Page> {
    texts
        .into_iter()
        .zip(1u32..)
        .map(|(text, number)| Page { number, text })
        .collect()
}

pub struct PdfExtractor;

impl PageExtractor for PdfExtractor {
    fn supports(&self, path: &Path) -> bool { has_extension(path, "pdf") }

    fn extract_pages(&self, path: &Path) -> Result<Vec<Page>> {
        if !path.is_file() {
            return Err(Error::unavailable(format!("{} is not readable", path.display())));
        }
        let pages = pdf_extract::extract_text_by_pages(path)
            .map_err(|e| Error::rejected(format!("failed to extract text from {}: {e}", path.display())))?;
        Ok(numbered(pages))
    }
}

/// Plain text files; a form feed starts a new page.
pub struct TextExtractor;

impl PageExtractor for TextExtractor {
    fn supports(&self, path: &Path) -> bool { has_extension(path, "txt") }

    fn extract_pages(&self, path: &Path) -> Result<Vec<Page>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => String::from_utf8_lossy(
                &fs::read(path).map_err(|e| Error::unavailable(format!("{}: {e}", path.display())))?,
            )
            .to_string(),
        };
        Ok(numbered(content.split('\x0c').map(str::to_string)))
    }
}

/// Delegates to the first extractor that supports a path.
pub struct DocumentExtractor {
    extractors: Vec<Box<dyn PageExtractor>>,
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self { extractors: vec![Box::new(PdfExtractor), Box::new(TextExtractor)] }
    }
}

impl DocumentExtractor {
    pub fn new(extractors: Vec<Box<dyn PageExtractor>>) -> Self { Self { extractors } }
}

impl PageExtractor for DocumentExtractor {
    fn supports(&self, path: &Path) -> bool {
        self.extractors.iter().any(|x| x.supports(path))
    }

    fn extract_pages(&self, path: &Path) -> Result<Vec<Page>> {
        match self.extractors.iter().find(|x| x.supports(path)) {
            Some(x) => x.extract_pages(path),
            None => Err(Error::rejected(format!("no extractor for {}", path.display()))),
        }
    }
}
