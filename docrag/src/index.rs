//! Exact nearest-neighbour search over a flat vector array.
//!
//! [`FlatIndex`] keeps every vector in one contiguous `Vec<f32>` and scans all
//! of them per query. That is the right trade for a document-sized corpus;
//! past a few hundred thousand chunks the linear scan becomes the query cost
//! ceiling, and an approximate index would have to be introduced as a separate
//! type with its own recall guarantees.

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RagError, Result};
use crate::persist::write_atomic;

const MAGIC: &[u8; 8] = b"DRAGIDX1";
const HEADER_LEN: usize = MAGIC.len() + 2 * std::mem::size_of::<u64>();
const F32_LEN: usize = std::mem::size_of::<f32>();

/// One search hit: the stored vector's ordinal and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Insertion position of the stored vector.
    pub ordinal: usize,
    /// Squared Euclidean distance to the query.
    pub distance: f32,
}

impl Neighbor {
    fn rank(&self, other: &Self) -> Ordering {
        self.distance.total_cmp(&other.distance).then(self.ordinal.cmp(&other.ordinal))
    }
}

/// An append-only collection of equal-length vectors searched exhaustively
/// under squared Euclidean distance.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Create an empty index for vectors of length `dimension`.
    pub fn new(dimension: usize) -> Self {
        Self { dimension, data: Vec::new() }
    }

    /// Build an index from `vectors`, preserving their order as ordinals.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if any vector's length differs
    /// from `dimension`.
    pub fn build<I, V>(dimension: usize, vectors: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[f32]>,
    {
        let mut index = Self::new(dimension);
        for vector in vectors {
            index.add(vector.as_ref())?;
        }
        Ok(index)
    }

    /// Append a vector and return its ordinal.
    pub fn add(&mut self, vector: &[f32]) -> Result<usize> {
        if vector.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        let ordinal = self.len();
        self.data.extend_from_slice(vector);
        Ok(ordinal)
    }

    /// Length of every stored vector.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        if self.dimension == 0 { 0 } else { self.data.len() / self.dimension }
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The stored vector at `ordinal`.
    pub fn vector(&self, ordinal: usize) -> Option<&[f32]> {
        let start = ordinal.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension).filter(|_| self.dimension > 0)
    }

    /// Return the `k` stored vectors closest to `query`, ascending by distance
    /// with ties broken by ordinal.
    ///
    /// Returns all vectors when `k` exceeds the stored count, and nothing when
    /// the index is empty.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if `query.len()` differs from the
    /// index dimension, even when the index is empty.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let mut neighbors: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(ordinal, stored)| Neighbor { ordinal, distance: squared_l2(stored, query) })
            .collect();

        if k < neighbors.len() {
            neighbors.select_nth_unstable_by(k - 1, Neighbor::rank);
            neighbors.truncate(k);
        }
        neighbors.sort_unstable_by(Neighbor::rank);

        debug!(k, returned = neighbors.len(), scanned = self.len(), "flat index search");
        Ok(neighbors)
    }

    /// Encode as `DRAGIDX1 | count: u64 LE | dimension: u64 LE | f32 LE ...`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.data.len() * F32_LEN);
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&(self.len() as u64).to_le_bytes());
        bytes.extend_from_slice(&(self.dimension as u64).to_le_bytes());
        for value in &self.data {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    /// Decode bytes produced by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`RagError::CorruptArtifact`] on a bad magic number, a truncated
    /// payload or trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
            return Err(RagError::CorruptArtifact("not a docrag vector index".to_string()));
        }

        let count = read_u64(&bytes[8..16])?;
        let dimension = read_u64(&bytes[16..24])?;
        if dimension == 0 && count > 0 {
            return Err(RagError::CorruptArtifact("index has vectors but zero dimension".into()));
        }

        let expected_len = count
            .checked_mul(dimension)
            .and_then(|n| n.checked_mul(F32_LEN))
            .and_then(|n| n.checked_add(HEADER_LEN))
            .ok_or_else(|| RagError::CorruptArtifact("index header overflows".to_string()))?;
        if bytes.len() != expected_len {
            return Err(RagError::CorruptArtifact(format!(
                "index payload is {} bytes, header implies {expected_len}",
                bytes.len()
            )));
        }

        let data = bytes[HEADER_LEN..]
            .chunks_exact(F32_LEN)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        Ok(Self { dimension, data })
    }

    /// Persist the index, atomically replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, &self.to_bytes())?;
        info!(path = %path.display(), count = self.len(), dimension = self.dimension, "saved vector index");
        Ok(())
    }

    /// Load an index written by [`save`](Self::save).
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

fn read_u64(bytes: &[u8]) -> Result<usize> {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    usize::try_from(u64::from_le_bytes(buf))
        .map_err(|_| RagError::CorruptArtifact("index header value exceeds usize".to_string()))
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
