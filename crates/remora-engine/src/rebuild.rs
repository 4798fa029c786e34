//! Consumer-side reconstruction of a blob from decoded entries.

use bytes::Bytes;
use remora_types::{Digest, WindowGeometry};
use remora_wire::{ChunkEntry, DecodedBlockResponse, WireError};

use crate::cache::ChunkCache;
use crate::error::EngineError;

/// Reconstruct a blob from decoded entries and a local chunk cache.
///
/// Entry `i` covers `block_indices(i, total_len)` of the output — the
/// same arithmetic the sender hashed and encoded with, so overlapping
/// windows land on identical bytes. Literal entries are also inserted
/// into the cache under their own digest, letting future transfers
/// reference them.
///
/// A cache miss on a reference entry means the sender's view of this
/// node's holdings was stale or wrong; it is a hard failure
/// ([`EngineError::MissingChunk`]), never skipped or zero-filled. The
/// caller should fall back to requesting the full blob or that chunk by
/// digest.
pub fn rebuild(
    entries: &[ChunkEntry],
    total_len: usize,
    geometry: WindowGeometry,
    cache: &dyn ChunkCache,
) -> Result<Bytes, EngineError> {
    let expected = geometry.window_count(total_len);
    if entries.len() != expected {
        return Err(EngineError::Wire(WireError::TokenCountMismatch {
            tokens: entries.len(),
            expected,
        }));
    }

    let mut out = vec![0u8; total_len];
    for (i, entry) in entries.iter().enumerate() {
        let (start, end) = geometry.block_indices(i, total_len);
        let (digest, bytes) = match entry {
            ChunkEntry::Literal(data) => {
                let digest = Digest::from_data(data);
                cache.insert(digest, data.clone());
                (digest, data.clone())
            }
            ChunkEntry::Reference(digest) => {
                let data = cache
                    .get(digest)
                    .ok_or(EngineError::MissingChunk { digest: *digest })?;
                (*digest, data)
            }
        };

        let span = end - start;
        if bytes.len() != span {
            return Err(EngineError::ChunkSizeMismatch {
                digest,
                expected: span,
                actual: bytes.len(),
            });
        }
        out[start..end].copy_from_slice(&bytes);
    }

    Ok(Bytes::from(out))
}

/// Convenience wrapper taking a [`DecodedBlockResponse`] directly.
pub fn rebuild_response(
    decoded: &DecodedBlockResponse,
    geometry: WindowGeometry,
    cache: &dyn ChunkCache,
) -> Result<Bytes, EngineError> {
    rebuild(decoded.entries(), decoded.total_len(), geometry, cache)
}
