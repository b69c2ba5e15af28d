//! On-disk layout of a built index: two artifacts that are only valid
//! together.
//!
//! `docs.index` holds the vectors:
//!
//! ```text
//! magic "PRIX" | version u32 | dim u32 | count u64 | count*dim f32 | blake3(payload) [32]
//! ```
//!
//! All integers and floats are little-endian. `docs_meta.json` holds the
//! chunk metadata in the same row order, the embedder that produced the
//! vectors, and the hex blake3 digest of the vector payload it was written
//! with. Each file is replaced atomically but the pair is not, so the digest
//! is what ties a metadata file to one specific `docs.index`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

use policyrag_core::types::Chunk;
use policyrag_core::{Error, Result};

use crate::flat::FlatL2Index;

pub const INDEX_FILE: &str = "docs.index";
pub const META_FILE: &str = "docs_meta.json";

const MAGIC: &[u8; 4] = b"PRIX";
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 4 + 8;
const DIGEST_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub embedder_id: String,
    pub dim: usize,
    /// RFC 3339 timestamp of the build.
    pub built_at: String,
    /// `payload_digest` of the index these chunks are aligned with.
    pub payload_digest: String,
    pub chunks: Vec<Chunk>,
}

/// An index and its metadata, checked to agree on count, dimension and
/// payload digest.
#[derive(Debug, Clone)]
pub struct LoadedIndex {
    pub index: FlatL2Index,
    pub meta: IndexMeta,
}

impl LoadedIndex {
    pub fn new(index: FlatL2Index, meta: IndexMeta) -> Result<Self> {
        if meta.chunks.len() != index.count() {
            return Err(Error::IndexLoad(format!(
                "metadata has {} chunks but index holds {} vectors",
                meta.chunks.len(),
                index.count()
            )));
        }
        if meta.dim != index.dim() {
            return Err(Error::IndexLoad(format!(
                "metadata dimension {} does not match index dimension {}",
                meta.dim,
                index.dim()
            )));
        }
        let digest = payload_digest(&index);
        if meta.payload_digest != digest {
            return Err(Error::IndexLoad(format!(
                "metadata belongs to index payload {} but the index payload is {digest}",
                meta.payload_digest
            )));
        }
        Ok(Self { index, meta })
    }
}

/// Writes both artifacts through temporary files in `dir`, renaming each
/// into place only once it is fully written.
pub fn write_index(dir: &Path, loaded: &LoadedIndex) -> Result<()> {
    fs::create_dir_all(dir)?;
    write_atomic(dir, INDEX_FILE, &encode_index(&loaded.index)?)?;
    write_atomic(dir, META_FILE, &serde_json::to_vec(&loaded.meta)?)?;
    tracing::info!(
        dir = %dir.display(),
        count = loaded.index.count(),
        dim = loaded.index.dim(),
        "index persisted"
    );
    Ok(())
}

fn write_atomic(dir: &Path, name: &str, bytes: &[u8]) -> Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dir.join(name)).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

pub fn load_index(dir: &Path) -> Result<LoadedIndex> {
    let index_path = dir.join(INDEX_FILE);
    let meta_path = dir.join(META_FILE);
    for p in [&index_path, &meta_path] {
        if !p.is_file() {
            return Err(Error::IndexLoad(format!("missing artifact {}", p.display())));
        }
    }
    let bytes = fs::read(&index_path)
        .map_err(|e| Error::IndexLoad(format!("reading {}: {e}", index_path.display())))?;
    let index = decode_index(&bytes)?;
    let meta_bytes = fs::read(&meta_path)
        .map_err(|e| Error::IndexLoad(format!("reading {}: {e}", meta_path.display())))?;
    let meta: IndexMeta = serde_json::from_slice(&meta_bytes)
        .map_err(|e| Error::IndexLoad(format!("parsing {}: {e}", meta_path.display())))?;
    let loaded = LoadedIndex::new(index, meta)?;
    tracing::info!(
        dir = %dir.display(),
        count = loaded.index.count(),
        dim = loaded.index.dim(),
        embedder_id = %loaded.meta.embedder_id,
        built_at = %loaded.meta.built_at,
        "index loaded"
    );
    Ok(loaded)
}

fn payload_bytes(index: &FlatL2Index) -> Vec<u8> {
    index.as_slice().iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Hex blake3 digest of the little-endian vector payload, as stored in the
/// `docs.index` trailer.
pub fn payload_digest(index: &FlatL2Index) -> String {
    blake3::hash(&payload_bytes(index)).to_hex().to_string()
}

pub fn encode_index(index: &FlatL2Index) -> Result<Vec<u8>> {
    let dim = u32::try_from(index.dim())
        .map_err(|_| Error::InvalidArgument(format!("dimension {} does not fit the index header", index.dim())))?;
    let count = u64::try_from(index.count())
        .map_err(|_| Error::InvalidArgument(format!("count {} does not fit the index header", index.count())))?;
    let payload = payload_bytes(index);
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len() + DIGEST_LEN);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&dim.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(blake3::hash(&payload).as_bytes());
    Ok(out)
}

pub fn decode_index(bytes: &[u8]) -> Result<FlatL2Index> {
    let corrupt = |why: &str| Error::IndexLoad(format!("corrupt index file: {why}"));
    if bytes.len() < HEADER_LEN + DIGEST_LEN {
        return Err(corrupt("truncated header"));
    }
    if &bytes[0..4] != MAGIC {
        return Err(corrupt("bad magic"));
    }
    let version = u32::from_le_bytes(le_array(&bytes[4..8]));
    if version != FORMAT_VERSION {
        return Err(corrupt(&format!("unsupported format version {version}")));
    }
    let dim = u32::from_le_bytes(le_array(&bytes[8..12])) as usize;
    let count = usize::try_from(u64::from_le_bytes(le_array(&bytes[12..20])))
        .map_err(|_| corrupt("count overflows usize"))?;
    let payload_len = count
        .checked_mul(dim)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| corrupt("size overflow"))?;
    if bytes.len() != HEADER_LEN + payload_len + DIGEST_LEN {
        return Err(corrupt(&format!(
            "expected {} bytes for {count} x {dim} vectors, found {}",
            HEADER_LEN + payload_len + DIGEST_LEN,
            bytes.len()
        )));
    }
    let payload = &bytes[HEADER_LEN..HEADER_LEN + payload_len];
    let digest = &bytes[HEADER_LEN + payload_len..];
    if blake3::hash(payload).as_bytes().as_slice() != digest {
        return Err(corrupt("checksum mismatch"));
    }
    let vectors = payload.chunks_exact(4).map(|b| f32::from_le_bytes(le_array(b))).collect();
    FlatL2Index::from_parts(dim, vectors).map_err(|e| Error::IndexLoad(e.to_string()))
}

fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}
