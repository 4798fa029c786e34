//! Typed block-response model and encoder.

use bytes::{BufMut, Bytes, BytesMut};
use remora_types::{Declaration, Digest, Recipe, WindowGeometry};

use crate::error::WireError;
use crate::{LITERAL_MARKER, TOKEN_SEPARATOR};

/// One chunk position of a block response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkEntry {
    /// Raw window bytes, transmitted because the receiver lacks them.
    Literal(Bytes),
    /// Digest of a window the receiver already holds; no payload.
    Reference(Digest),
}

impl ChunkEntry {
    /// Whether this entry carries raw bytes.
    pub fn is_literal(&self) -> bool {
        matches!(self, ChunkEntry::Literal(_))
    }

    /// Whether this entry is a digest reference.
    pub fn is_reference(&self) -> bool {
        matches!(self, ChunkEntry::Reference(_))
    }
}

/// Builds a [`BlockResponse`] from a declaration, a recipe, and the blob.
///
/// The builder owns the window geometry so literal extraction uses the
/// same `block_indices` arithmetic the chunker hashed with.
#[derive(Default)]
pub struct BlockResponseBuilder {
    geometry: WindowGeometry,
}

impl BlockResponseBuilder {
    /// Create a builder with the given window geometry.
    pub fn new(geometry: WindowGeometry) -> Self {
        Self { geometry }
    }

    /// Combine a declaration, its recipe, and the blob into a response.
    ///
    /// Positions the node holds become [`ChunkEntry::Reference`]; the rest
    /// become [`ChunkEntry::Literal`] carrying that window's bytes. An
    /// empty blob produces an empty response regardless of recipe and
    /// declaration, matching the chunker's degenerate case.
    pub fn build(
        &self,
        declaration: &Declaration,
        recipe: &Recipe,
        blob: &[u8],
    ) -> Result<BlockResponse, WireError> {
        if declaration.len() != recipe.len() {
            return Err(WireError::LengthMismatch {
                declaration: declaration.len(),
                recipe: recipe.len(),
            });
        }
        if blob.is_empty() {
            return Ok(BlockResponse {
                entries: Vec::new(),
                total_len: 0,
            });
        }

        let expected = self.geometry.window_count(blob.len());
        if recipe.len() != expected {
            return Err(WireError::WindowCountMismatch {
                recipe: recipe.len(),
                expected,
            });
        }

        let mut entries = Vec::with_capacity(recipe.len());
        for i in 0..recipe.len() {
            if declaration[i] {
                entries.push(ChunkEntry::Reference(recipe[i]));
            } else {
                let (start, end) = self.geometry.block_indices(i, blob.len());
                entries.push(ChunkEntry::Literal(Bytes::copy_from_slice(
                    &blob[start..end],
                )));
            }
        }

        Ok(BlockResponse {
            entries,
            total_len: blob.len(),
        })
    }
}

/// A block response as typed entries, serialized only as a final step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockResponse {
    entries: Vec<ChunkEntry>,
    total_len: usize,
}

impl BlockResponse {
    /// The entries in chunk order.
    pub fn entries(&self) -> &[ChunkEntry] {
        &self.entries
    }

    /// Total number of chunk positions.
    pub fn chunk_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of positions transmitted as raw bytes.
    pub fn literal_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_literal()).count()
    }

    /// Length in bytes of the original blob.
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    /// Byte length of the serialized header segment.
    pub fn header_len(&self) -> usize {
        if self.entries.is_empty() {
            return 0;
        }
        let tokens: usize = self
            .entries
            .iter()
            .map(|e| match e {
                ChunkEntry::Literal(_) => LITERAL_MARKER.len(),
                // Digests render as 64 hex characters.
                ChunkEntry::Reference(_) => 64,
            })
            .sum();
        tokens + self.entries.len() - 1
    }

    /// Sum of literal payload sizes — the bytes actually sent.
    pub fn body_len(&self) -> usize {
        self.entries
            .iter()
            .map(|e| match e {
                ChunkEntry::Literal(data) => data.len(),
                ChunkEntry::Reference(_) => 0,
            })
            .sum()
    }

    /// Serialize to `header ++ body`, returning the stream and the byte
    /// length of the header segment.
    ///
    /// Header tokens are joined by [`TOKEN_SEPARATOR`] with no leading or
    /// trailing separator; the body is the literal payloads concatenated
    /// in chunk order.
    pub fn header_and_body(&self) -> (Bytes, usize) {
        let mut header = String::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                header.push(TOKEN_SEPARATOR);
            }
            match entry {
                ChunkEntry::Literal(_) => header.push_str(LITERAL_MARKER),
                ChunkEntry::Reference(digest) => header.push_str(&digest.to_string()),
            }
        }
        let header_len = header.len();

        let mut out = BytesMut::with_capacity(header_len + self.body_len());
        out.extend_from_slice(header.as_bytes());
        for entry in &self.entries {
            if let ChunkEntry::Literal(data) = entry {
                out.extend_from_slice(data);
            }
        }
        (out.freeze(), header_len)
    }

    /// Serialize to a self-describing frame:
    /// `[header_len: u32 BE][blob_len: u64 BE][header][body]`.
    ///
    /// The fixed-width prefix is how the header length (and the blob
    /// length the decoder needs for literal spans) crosses the wire.
    /// A header too long for the u32 field is an error, never a
    /// silently truncated prefix.
    pub fn encode_frame(&self) -> Result<Bytes, WireError> {
        let (stream, header_len) = self.header_and_body();
        let prefix = u32::try_from(header_len)
            .map_err(|_| WireError::HeaderTooLarge { header_len })?;
        let mut frame = BytesMut::with_capacity(crate::FRAME_PREFIX_LEN + stream.len());
        frame.put_u32(prefix);
        frame.put_u64(self.total_len as u64);
        frame.extend_from_slice(&stream);
        Ok(frame.freeze())
    }
}
