//! Exact nearest-neighbour search by squared Euclidean distance.
//!
//! Vectors are stored row-major in one contiguous buffer; row `i` is the
//! embedding of metadata entry `i`. The index is immutable once built, so a
//! single instance can be searched from many threads at once.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use policyrag_core::types::Embedding;
use policyrag_core::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct FlatL2Index {
    dim: usize,
    vectors: Vec<f32>,
}

/// Parallel arrays ordered by ascending distance.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbors {
    pub distances: Vec<f32>,
    pub ids: Vec<usize>,
}

impl FlatL2Index {
    pub fn build(embeddings: &[Embedding]) -> Result<Self> {
        let dim = embeddings
            .first()
            .map(Vec::len)
            .ok_or_else(|| Error::InvalidArgument("cannot build an index from zero embeddings".into()))?;
        let mut vectors = Vec::with_capacity(dim * embeddings.len());
        for (row, e) in embeddings.iter().enumerate() {
            if e.len() != dim {
                return Err(Error::InvalidArgument(format!(
                    "embedding {row} has dimension {}, expected {dim}",
                    e.len()
                )));
            }
            vectors.extend_from_slice(e);
        }
        Self::from_parts(dim, vectors)
    }

    pub fn from_parts(dim: usize, vectors: Vec<f32>) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidArgument("index dimension must be positive".into()));
        }
        if vectors.len() % dim != 0 {
            return Err(Error::InvalidArgument(format!(
                "vector buffer of {} floats is not a multiple of dimension {dim}",
                vectors.len()
            )));
        }
        Ok(Self { dim, vectors })
    }

    pub fn dim(&self) -> usize { self.dim }
    pub fn count(&self) -> usize { self.vectors.len() / self.dim }
    pub fn is_empty(&self) -> bool { self.vectors.is_empty() }
    pub fn as_slice(&self) -> &[f32] { &self.vectors }

    pub fn row(&self, id: usize) -> Option<&[f32]> {
        self.vectors.get(id * self.dim..(id + 1) * self.dim)
    }

    /// The `top_k` closest rows. When `top_k` exceeds the number of rows,
    /// every row is returned. Equal distances keep insertion order.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Neighbors> {
        if top_k == 0 {
            return Err(Error::InvalidArgument("top_k must be positive".into()));
        }
        if query.len() != self.dim {
            return Err(Error::InvalidArgument(format!(
                "query has dimension {}, index has {}",
                query.len(),
                self.dim
            )));
        }
        let k = top_k.min(self.count());
        let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k + 1);
        for (id, row) in self.vectors.chunks_exact(self.dim).enumerate() {
            let candidate = Candidate { distance: squared_l2(query, row), id };
            if heap.len() < k {
                heap.push(candidate);
            } else if heap.peek().is_some_and(|worst| candidate < *worst) {
                heap.pop();
                heap.push(candidate);
            }
        }
        let sorted = heap.into_sorted_vec();
        Ok(Neighbors {
            distances: sorted.iter().map(|c| c.distance).collect(),
            ids: sorted.iter().map(|c| c.id).collect(),
        })
    }
}

pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Max-heap entry: the worst kept candidate sits on top.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance: f32,
    id: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // total_cmp keeps NaN from breaking the heap; ties fall back to row order
        self.distance.total_cmp(&other.distance).then(self.id.cmp(&other.id))
    }
}
