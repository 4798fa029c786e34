//! [`DiffAssembler`] — the end-to-end encode path.

use std::sync::Arc;

use bytes::Bytes;
use remora_chunk::Chunker;
use remora_index::DeclarationSource;
use remora_store::{BlobStore, StoreError};
use remora_types::{NodeId, Recipe, WindowGeometry};
use remora_wire::BlockResponseBuilder;
use tracing::debug;

use crate::error::EngineError;

/// The outcome of assembling a blob for one node: a wire frame plus the
/// figures the transport and bookkeeping layers care about.
#[derive(Debug, Clone)]
pub struct BlockTransfer {
    /// The full frame: prefix, header, and body.
    pub frame: Bytes,
    /// Byte length of the header segment inside the frame.
    pub header_len: usize,
    /// The blob's recipe, for holdings bookkeeping after the transfer.
    pub recipe: Recipe,
    /// How many positions were sent as raw bytes.
    pub literal_count: usize,
}

/// Drives fetch → chunk → declare → encode for one (blob, node) pair.
///
/// Both collaborators are injected: the blob store behind [`BlobStore`]
/// and the availability backend behind [`DeclarationSource`]. The
/// assembler itself holds no mutable state, so one instance serves
/// concurrent assemblies.
pub struct DiffAssembler {
    blob_store: Arc<dyn BlobStore>,
    declarations: Arc<dyn DeclarationSource>,
    chunker: Chunker,
    builder: BlockResponseBuilder,
}

impl DiffAssembler {
    /// Create an assembler over the given collaborators and geometry.
    pub fn new(
        blob_store: Arc<dyn BlobStore>,
        declarations: Arc<dyn DeclarationSource>,
        geometry: WindowGeometry,
    ) -> Self {
        Self {
            blob_store,
            declarations,
            chunker: Chunker::new(geometry),
            builder: BlockResponseBuilder::new(geometry),
        }
    }

    /// The geometry this assembler chunks and encodes with.
    pub fn geometry(&self) -> WindowGeometry {
        self.chunker.geometry()
    }

    /// Assemble the deduplicated transfer of `path` for `node`.
    ///
    /// An absent blob is [`EngineError::BlobNotFound`] (not retryable); a
    /// failing availability store surfaces as [`EngineError::Index`]
    /// (retryable — the whole operation is idempotent).
    pub async fn assemble(&self, path: &str, node: &NodeId) -> Result<BlockTransfer, EngineError> {
        let blob = match self.blob_store.get_content(path).await {
            Ok(blob) => blob,
            Err(StoreError::NotFound(path)) => return Err(EngineError::BlobNotFound(path)),
            Err(err) => return Err(err.into()),
        };

        let recipe = self.chunker.chunk(&blob);
        let declaration = self.declarations.declare(node, &recipe).await?;
        let response = self.builder.build(&declaration, &recipe, &blob)?;

        let literal_count = response.literal_count();
        let header_len = response.header_len();
        let frame = response.encode_frame()?;

        debug!(
            path,
            %node,
            chunks = recipe.len(),
            literals = literal_count,
            frame_len = frame.len(),
            "assembled block response"
        );

        Ok(BlockTransfer {
            frame,
            header_len,
            recipe,
            literal_count,
        })
    }
}
