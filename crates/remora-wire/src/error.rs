//! Error types for the wire codec.

use remora_types::DigestError;

/// Errors that can occur while encoding or decoding a block response.
///
/// Every malformed input surfaces here; nothing is recovered silently.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Declaration and recipe cover different numbers of chunk positions.
    #[error("length mismatch: declaration has {declaration} positions, recipe has {recipe}")]
    LengthMismatch {
        /// Positions in the declaration.
        declaration: usize,
        /// Positions in the recipe.
        recipe: usize,
    },

    /// The recipe does not match the blob's window count under the
    /// shared geometry.
    #[error("recipe has {recipe} entries but blob spans {expected} windows")]
    WindowCountMismatch {
        /// Entries in the recipe.
        recipe: usize,
        /// Windows implied by the blob length.
        expected: usize,
    },

    /// The serialized header does not fit the frame prefix's u32 field.
    #[error("header length {header_len} exceeds the u32 frame prefix")]
    HeaderTooLarge {
        /// Byte length of the serialized header.
        header_len: usize,
    },

    /// The frame is shorter than its fixed prefix.
    #[error("frame too short: {len} bytes, need at least {needed}")]
    TruncatedFrame {
        /// Minimum bytes required.
        needed: usize,
        /// Bytes actually present.
        len: usize,
    },

    /// The declared header length extends past the end of the stream.
    #[error("header length {header_len} exceeds stream length {stream_len}")]
    TruncatedHeader {
        /// Declared header byte length.
        header_len: usize,
        /// Bytes actually present.
        stream_len: usize,
    },

    /// The header segment is not valid UTF-8.
    #[error("header is not valid utf-8")]
    NonUtf8Header,

    /// A header token is neither the literal marker nor a valid digest.
    #[error("bad header token at position {position}: {source}")]
    BadToken {
        /// Chunk position of the offending token.
        position: usize,
        /// Why the token failed to parse as a digest.
        source: DigestError,
    },

    /// Header token count disagrees with the blob's window count.
    #[error("header has {tokens} tokens but blob length implies {expected} windows")]
    TokenCountMismatch {
        /// Tokens found in the header.
        tokens: usize,
        /// Windows implied by the declared blob length.
        expected: usize,
    },

    /// The body ended before the literal spans implied by the header.
    #[error("body truncated: literal at position {position} needs bytes up to offset {needed}, body has {available}")]
    TruncatedBody {
        /// Chunk position of the literal that ran out of bytes.
        position: usize,
        /// Body offset the literal extends to.
        needed: usize,
        /// Body bytes actually present.
        available: usize,
    },

    /// The body is longer than the literal spans implied by the header.
    #[error("body has {actual} bytes but literal spans account for {expected}")]
    BodyLengthMismatch {
        /// Bytes accounted for by literal spans.
        expected: usize,
        /// Bytes actually present.
        actual: usize,
    },
}
