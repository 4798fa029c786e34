//! Fixed-window chunker producing a blob's digest recipe.

use remora_types::{Digest, Recipe, WindowGeometry};
use tokio::io::AsyncRead;

use crate::error::ChunkError;

/// Splits a blob into fixed, overlapping windows and hashes each one.
///
/// Window `i` covers `[i * shift, min(i * shift + window, len))`, so with
/// the default geometry (window 4096, shift 1024) consecutive windows
/// overlap by 3072 bytes. The recipe has `ceil(len / shift)` entries;
/// empty input produces an empty recipe.
///
/// Chunking is a pure function of the bytes and the geometry: two machines
/// chunking the same blob independently produce identical recipes.
pub struct Chunker {
    geometry: WindowGeometry,
}

impl Chunker {
    /// Create a chunker with the given window geometry.
    pub fn new(geometry: WindowGeometry) -> Self {
        Self { geometry }
    }

    /// The geometry this chunker hashes with.
    pub fn geometry(&self) -> WindowGeometry {
        self.geometry
    }

    /// Generate the recipe for a blob held in memory.
    ///
    /// Each entry is the SHA-256 digest of one window, in window order.
    pub fn chunk(&self, blob: &[u8]) -> Recipe {
        let count = self.geometry.window_count(blob.len());
        let mut digests = Vec::with_capacity(count);

        for i in 0..count {
            let (start, end) = self.geometry.block_indices(i, blob.len());
            digests.push(Digest::from_data(&blob[start..end]));
        }

        Recipe::new(digests)
    }

    /// Generate the recipe from an async reader.
    ///
    /// Produces the same recipe as [`Chunker::chunk`] would for the full
    /// byte stream, while buffering only the bytes still needed by
    /// not-yet-complete windows. A read error aborts the whole operation.
    pub async fn chunk_stream(
        &self,
        mut reader: impl AsyncRead + Unpin,
    ) -> Result<Recipe, ChunkError> {
        use tokio::io::AsyncReadExt;

        let window = self.geometry.window();
        let shift = self.geometry.shift();

        let mut digests = Vec::new();
        // Retained bytes; `buf[0]` sits at absolute offset `buf_start`.
        let mut buf: Vec<u8> = Vec::new();
        let mut buf_start = 0usize;
        let mut total = 0usize;
        // Absolute start offset of the next window to emit.
        let mut next = 0usize;
        let mut read_buf = vec![0u8; 64 * 1024];

        loop {
            let n = reader.read(&mut read_buf).await?;
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&read_buf[..n]);
            total += n;

            // Emit every window fully contained in the bytes seen so far.
            while next + window <= total {
                let lo = next - buf_start;
                digests.push(Digest::from_data(&buf[lo..lo + window]));
                next += shift;
            }

            // Drop bytes no remaining window will read.
            if next > buf_start {
                buf.drain(..next - buf_start);
                buf_start = next;
            }
        }

        // Tail windows, cut short at end of stream.
        while next < total {
            let lo = next - buf_start;
            let hi = (next + window).min(total) - buf_start;
            digests.push(Digest::from_data(&buf[lo..hi]));
            next += shift;
        }

        Ok(Recipe::new(digests))
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(WindowGeometry::default())
    }
}
