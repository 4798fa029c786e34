//! Shared types for the Remora deduplication protocol.
//!
//! This crate defines the core data model used across the Remora workspace:
//! identifiers ([`Digest`], [`NodeId`]), window arithmetic
//! ([`WindowGeometry`]), and the protocol's two ordered sequences
//! ([`Recipe`], [`Declaration`]).

use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

// ---------------------------------------------------------------------------
// Digest
// ---------------------------------------------------------------------------

/// Content-addressed identifier for a chunk: `sha256(window_bytes)`.
///
/// On the wire a digest is rendered as 64 lowercase hex characters, which
/// can never collide with the single-character literal marker used by the
/// block-response header.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Digest([u8; 32]);

/// Errors from parsing a digest's hex form.
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    /// The string was not exactly 64 characters.
    #[error("digest must be 64 hex characters, got {0}")]
    BadLength(usize),

    /// The string contained non-hex characters.
    #[error("invalid hex in digest: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl Digest {
    /// Compute the digest of arbitrary data with SHA-256.
    pub fn from_data(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Return the raw 32-byte representation.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse a digest from its 64-character lowercase hex form.
    pub fn from_hex(s: &str) -> Result<Self, DigestError> {
        if s.len() != 64 {
            return Err(DigestError::BadLength(s.len()));
        }
        let raw = hex::decode(s)?;
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&raw);
        Ok(Self(bytes))
    }
}

impl From<[u8; 32]> for Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self})")
    }
}

// ---------------------------------------------------------------------------
// NodeId
// ---------------------------------------------------------------------------

/// Identifier for a participating node (client, peer, or cache), as
/// reported by the surrounding service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    /// Create a node identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Window geometry
// ---------------------------------------------------------------------------

/// Fixed window geometry shared out-of-band by both sides of a transfer.
///
/// Windows are `window` bytes long and start every `shift` bytes, so with
/// `shift < window` consecutive windows overlap. This type is the single
/// source of window arithmetic: chunk hashing, encode-side literal
/// extraction, and decode-side literal extraction all go through
/// [`WindowGeometry::block_indices`], which keeps the three call sites from
/// drifting apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    window: usize,
    shift: usize,
}

/// Error from constructing an invalid [`WindowGeometry`].
#[derive(Debug, thiserror::Error)]
#[error("invalid window geometry: window={window}, shift={shift} (need 1 <= shift <= window)")]
pub struct GeometryError {
    /// Requested window size.
    pub window: usize,
    /// Requested shift.
    pub shift: usize,
}

impl WindowGeometry {
    /// Default window size in bytes.
    pub const DEFAULT_WINDOW: usize = 4096;
    /// Default shift between window starts in bytes.
    pub const DEFAULT_SHIFT: usize = 1024;

    /// Create a geometry, validating `1 <= shift <= window`.
    pub fn new(window: usize, shift: usize) -> Result<Self, GeometryError> {
        if shift == 0 || shift > window {
            return Err(GeometryError { window, shift });
        }
        Ok(Self { window, shift })
    }

    /// Window size in bytes.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Shift between window starts in bytes.
    pub fn shift(&self) -> usize {
        self.shift
    }

    /// Byte range `[start, end)` of window `i` within a blob of
    /// `total_len` bytes: `start = i * shift`,
    /// `end = min(start + window, total_len)`.
    pub fn block_indices(&self, i: usize, total_len: usize) -> (usize, usize) {
        let start = (i * self.shift).min(total_len);
        let end = (start + self.window).min(total_len);
        (start, end)
    }

    /// Number of windows covering a blob of `total_len` bytes:
    /// `ceil(total_len / shift)`, and 0 for an empty blob.
    pub fn window_count(&self, total_len: usize) -> usize {
        total_len.div_ceil(self.shift)
    }
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self {
            window: Self::DEFAULT_WINDOW,
            shift: Self::DEFAULT_SHIFT,
        }
    }
}

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

/// Ordered list of chunk digests describing a blob's window decomposition.
///
/// Immutable after creation. Regenerating a recipe for the same bytes under
/// the same geometry yields the same digests in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Recipe(Vec<Digest>);

impl Recipe {
    /// Create a recipe from an ordered digest list.
    pub fn new(digests: Vec<Digest>) -> Self {
        Self(digests)
    }

    /// Number of chunk positions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the recipe describes an empty blob.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The ordered digests.
    pub fn digests(&self) -> &[Digest] {
        &self.0
    }

    /// Iterate over the digests in chunk order.
    pub fn iter(&self) -> std::slice::Iter<'_, Digest> {
        self.0.iter()
    }
}

impl Index<usize> for Recipe {
    type Output = Digest;

    fn index(&self, i: usize) -> &Digest {
        &self.0[i]
    }
}

impl<'a> IntoIterator for &'a Recipe {
    type Item = &'a Digest;
    type IntoIter = std::slice::Iter<'a, Digest>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ---------------------------------------------------------------------------
// Declaration
// ---------------------------------------------------------------------------

/// Boolean vector aligned to a [`Recipe`]: `true` at position `i` means the
/// queried node already holds the chunk at position `i`.
///
/// Built fresh per (node, recipe) pair and consumed immediately by the
/// codec; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration(Vec<bool>);

impl Declaration {
    /// Create a declaration from a membership vector.
    pub fn new(held: Vec<bool>) -> Self {
        Self(held)
    }

    /// All-missing declaration of the given length — the conservative
    /// answer for a node with no recorded holdings.
    pub fn all_missing(len: usize) -> Self {
        Self(vec![false; len])
    }

    /// Number of chunk positions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the declaration covers zero positions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The underlying membership vector.
    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    /// Number of positions the node already holds.
    pub fn held_count(&self) -> usize {
        self.0.iter().filter(|&&h| h).count()
    }

    /// Number of positions the node is missing.
    pub fn missing_count(&self) -> usize {
        self.0.len() - self.held_count()
    }
}

impl Index<usize> for Declaration {
    type Output = bool;

    fn index(&self, i: usize) -> &bool {
        &self.0[i]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
