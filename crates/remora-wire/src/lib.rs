//! Block-response wire codec.
//!
//! The wire format owned by this core:
//!
//! ```text
//! [header_len: u32 BE][blob_len: u64 BE][header][body]
//! ```
//!
//! The header is one token per chunk position, joined by `-`: the literal
//! marker `0` means "raw window bytes follow in the body", any other token
//! is a hex digest meaning "the receiver already holds this window". The
//! body is the concatenation, in chunk order, of the windows the receiver
//! lacks. Window spans on both sides come from the same
//! [`WindowGeometry::block_indices`](remora_types::WindowGeometry::block_indices)
//! call, so encode and decode can never disagree about literal boundaries.
//!
//! The response is modeled as typed entries ([`ChunkEntry`]) and only
//! serialized as a final step.

mod codec;
mod error;
mod response;

pub use codec::{decode, decode_frame, DecodedBlockResponse};
pub use error::WireError;
pub use response::{BlockResponse, BlockResponseBuilder, ChunkEntry};

/// Separator between header tokens. Never appears in a digest's hex form
/// or in the literal marker.
pub const TOKEN_SEPARATOR: char = '-';

/// Header token marking a position whose raw bytes follow in the body.
pub const LITERAL_MARKER: &str = "0";

/// Byte length of the fixed frame prefix (`u32` header length plus
/// `u64` blob length).
pub const FRAME_PREFIX_LEN: usize = 12;
