//! Decoder for block-response streams.

use bytes::Bytes;
use remora_types::{Digest, WindowGeometry};

use crate::error::WireError;
use crate::response::ChunkEntry;
use crate::{FRAME_PREFIX_LEN, LITERAL_MARKER, TOKEN_SEPARATOR};

/// A decoded block response: entries in original chunk order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBlockResponse {
    entries: Vec<ChunkEntry>,
    literal_count: usize,
    total_len: usize,
}

impl DecodedBlockResponse {
    /// The entries in chunk order.
    pub fn entries(&self) -> &[ChunkEntry] {
        &self.entries
    }

    /// Number of chunk positions.
    pub fn chunk_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of literal entries carried in the body.
    pub fn literal_count(&self) -> usize {
        self.literal_count
    }

    /// Length in bytes of the original blob.
    pub fn total_len(&self) -> usize {
        self.total_len
    }
}

/// Decode a `header ++ body` stream.
///
/// `header_len` and `total_len` (the original blob length) arrive via the
/// frame prefix or a side channel. Literal spans are computed with the
/// same `block_indices` call the encoder used — position `i`'s literal
/// covers `block_indices(i, total_len)` — walking a running body offset in
/// literal order.
///
/// Malformed input is always an error: a header extending past the
/// stream, a token that is neither the marker nor a digest, a token count
/// that disagrees with `total_len`, or a body shorter or longer than the
/// literal spans imply.
pub fn decode(
    header_len: usize,
    total_len: usize,
    stream: &[u8],
    geometry: WindowGeometry,
) -> Result<DecodedBlockResponse, WireError> {
    if header_len > stream.len() {
        return Err(WireError::TruncatedHeader {
            header_len,
            stream_len: stream.len(),
        });
    }
    let header = &stream[..header_len];
    let body = &stream[header_len..];

    let tokens: Vec<&str> = if header.is_empty() {
        Vec::new()
    } else {
        std::str::from_utf8(header)
            .map_err(|_| WireError::NonUtf8Header)?
            .split(TOKEN_SEPARATOR)
            .collect()
    };

    // The declared blob length is untrusted input: nothing is sized from
    // it until the header's token count has confirmed it.
    let expected_chunks = geometry.window_count(total_len);
    if tokens.len() != expected_chunks {
        return Err(WireError::TokenCountMismatch {
            tokens: tokens.len(),
            expected: expected_chunks,
        });
    }

    let mut entries = Vec::with_capacity(tokens.len());
    let mut literal_count = 0usize;
    let mut body_offset = 0usize;

    for (position, token) in tokens.into_iter().enumerate() {
        if token == LITERAL_MARKER {
            let (start, end) = geometry.block_indices(position, total_len);
            let span = end - start;
            let needed = body_offset + span;
            if needed > body.len() {
                return Err(WireError::TruncatedBody {
                    position,
                    needed,
                    available: body.len(),
                });
            }
            entries.push(ChunkEntry::Literal(Bytes::copy_from_slice(
                &body[body_offset..needed],
            )));
            body_offset = needed;
            literal_count += 1;
        } else {
            let digest = Digest::from_hex(token)
                .map_err(|source| WireError::BadToken { position, source })?;
            entries.push(ChunkEntry::Reference(digest));
        }
    }

    if body_offset != body.len() {
        return Err(WireError::BodyLengthMismatch {
            expected: body_offset,
            actual: body.len(),
        });
    }

    Ok(DecodedBlockResponse {
        entries,
        literal_count,
        total_len,
    })
}

/// Decode a self-describing frame produced by
/// [`BlockResponse::encode_frame`](crate::BlockResponse::encode_frame).
pub fn decode_frame(
    frame: &[u8],
    geometry: WindowGeometry,
) -> Result<DecodedBlockResponse, WireError> {
    if frame.len() < FRAME_PREFIX_LEN {
        return Err(WireError::TruncatedFrame {
            needed: FRAME_PREFIX_LEN,
            len: frame.len(),
        });
    }
    let header_len = u32::from_be_bytes(frame[0..4].try_into().expect("4-byte slice")) as usize;
    let total_len = u64::from_be_bytes(frame[4..12].try_into().expect("8-byte slice")) as usize;
    decode(header_len, total_len, &frame[FRAME_PREFIX_LEN..], geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use remora_chunk::Chunker;
    use remora_types::{Declaration, Recipe};

    use crate::response::BlockResponseBuilder;

    fn test_blob(size: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(size);
        let mut state: u32 = 0xDEAD_BEEF;
        for _ in 0..size {
            state = state.wrapping_mul(1103515245).wrapping_add(12345);
            data.push((state >> 16) as u8);
        }
        data
    }

    fn encode(
        blob: &[u8],
        held: &[bool],
        geometry: WindowGeometry,
    ) -> (Bytes, usize, Recipe) {
        let chunker = Chunker::new(geometry);
        let recipe = chunker.chunk(blob);
        let declaration = Declaration::new(held.to_vec());
        let response = BlockResponseBuilder::new(geometry)
            .build(&declaration, &recipe, blob)
            .unwrap();
        let (stream, header_len) = response.header_and_body();
        (stream, header_len, recipe)
    }

    #[test]
    fn test_builder_rejects_length_mismatch() {
        let geometry = WindowGeometry::default();
        let blob = test_blob(5000);
        let recipe = Chunker::new(geometry).chunk(&blob);
        let declaration = Declaration::all_missing(3); // recipe has 5

        let err = BlockResponseBuilder::new(geometry)
            .build(&declaration, &recipe, &blob)
            .unwrap_err();
        assert!(matches!(err, WireError::LengthMismatch { .. }));
    }

    #[test]
    fn test_builder_rejects_wrong_window_count() {
        let geometry = WindowGeometry::default();
        let blob = test_blob(5000);
        // Recipe and declaration agree with each other but not the blob.
        let recipe = Chunker::new(geometry).chunk(&test_blob(9000));
        let declaration = Declaration::all_missing(recipe.len());

        let err = BlockResponseBuilder::new(geometry)
            .build(&declaration, &recipe, &blob)
            .unwrap_err();
        assert!(matches!(err, WireError::WindowCountMismatch { .. }));
    }

    #[test]
    fn test_empty_blob_encodes_empty_response() {
        let geometry = WindowGeometry::default();
        let response = BlockResponseBuilder::new(geometry)
            .build(&Declaration::all_missing(0), &Recipe::default(), b"")
            .unwrap();

        assert_eq!(response.chunk_count(), 0);
        let (stream, header_len) = response.header_and_body();
        assert_eq!(header_len, 0);
        assert!(stream.is_empty());

        let decoded = decode(0, 0, &stream, geometry).unwrap();
        assert_eq!(decoded.chunk_count(), 0);
        assert_eq!(decoded.literal_count(), 0);
    }

    #[test]
    fn test_spec_scenario_5000_bytes() {
        // 5000-byte blob, W=4096, S=1024: 5 windows. Node holds windows
        // 1 and 3; body carries windows 0, 2, 4 in that order.
        let geometry = WindowGeometry::default();
        let blob = test_blob(5000);
        let held = [false, true, false, true, false];
        let (stream, header_len, recipe) = encode(&blob, &held, geometry);

        let decoded = decode(header_len, blob.len(), &stream, geometry).unwrap();
        assert_eq!(decoded.chunk_count(), 5);
        assert_eq!(decoded.literal_count(), 3);

        let expected_body: usize = [0usize, 2, 4]
            .iter()
            .map(|&i| {
                let (s, e) = geometry.block_indices(i, blob.len());
                e - s
            })
            .sum();
        assert_eq!(stream.len() - header_len, expected_body);

        for (i, entry) in decoded.entries().iter().enumerate() {
            let (start, end) = geometry.block_indices(i, blob.len());
            match entry {
                ChunkEntry::Literal(data) => {
                    assert!(!held[i], "held position {i} must not be literal");
                    assert_eq!(&data[..], &blob[start..end]);
                }
                ChunkEntry::Reference(digest) => {
                    assert!(held[i], "missing position {i} must not be a reference");
                    assert_eq!(*digest, recipe[i]);
                }
            }
        }
    }

    #[test]
    fn test_all_held_sends_no_body() {
        let geometry = WindowGeometry::default();
        let blob = test_blob(5000);
        let (stream, header_len, _) = encode(&blob, &[true; 5], geometry);

        assert_eq!(stream.len(), header_len, "body must be empty");
        let decoded = decode(header_len, blob.len(), &stream, geometry).unwrap();
        assert_eq!(decoded.literal_count(), 0);
        assert!(decoded.entries().iter().all(|e| e.is_reference()));
    }

    #[test]
    fn test_all_missing_sends_every_window() {
        let geometry = WindowGeometry::default();
        let blob = test_blob(5000);
        let (stream, header_len, _) = encode(&blob, &[false; 5], geometry);

        let decoded = decode(header_len, blob.len(), &stream, geometry).unwrap();
        assert_eq!(decoded.literal_count(), 5);

        let expected_body: usize = (0..5)
            .map(|i| {
                let (s, e) = geometry.block_indices(i, blob.len());
                e - s
            })
            .sum();
        assert_eq!(stream.len() - header_len, expected_body);
    }

    #[test]
    fn test_bandwidth_property() {
        // Body bytes == sum of spans at missing positions, nothing more.
        let geometry = WindowGeometry::default();
        let blob = test_blob(10_240);
        let chunker = Chunker::new(geometry);
        let recipe = chunker.chunk(&blob);
        let held: Vec<bool> = (0..recipe.len()).map(|i| i % 3 == 0).collect();

        let response = BlockResponseBuilder::new(geometry)
            .build(&Declaration::new(held.clone()), &recipe, &blob)
            .unwrap();

        let expected: usize = held
            .iter()
            .enumerate()
            .filter(|(_, &h)| !h)
            .map(|(i, _)| {
                let (s, e) = geometry.block_indices(i, blob.len());
                e - s
            })
            .sum();
        assert_eq!(response.body_len(), expected);
    }

    #[test]
    fn test_frame_roundtrip() {
        let geometry = WindowGeometry::default();
        let blob = test_blob(7000);
        let chunker = Chunker::new(geometry);
        let recipe = chunker.chunk(&blob);
        let held: Vec<bool> = (0..recipe.len()).map(|i| i % 2 == 1).collect();

        let response = BlockResponseBuilder::new(geometry)
            .build(&Declaration::new(held), &recipe, &blob)
            .unwrap();
        let frame = response.encode_frame().unwrap();

        let decoded = decode_frame(&frame, geometry).unwrap();
        assert_eq!(decoded.chunk_count(), response.chunk_count());
        assert_eq!(decoded.literal_count(), response.literal_count());
        assert_eq!(decoded.total_len(), blob.len());
        assert_eq!(decoded.entries(), response.entries());
    }

    #[test]
    fn test_decode_rejects_truncated_frame() {
        let geometry = WindowGeometry::default();
        let err = decode_frame(&[0u8; 5], geometry).unwrap_err();
        assert!(matches!(err, WireError::TruncatedFrame { .. }));
    }

    #[test]
    fn test_decode_rejects_header_past_stream_end() {
        let geometry = WindowGeometry::default();
        let err = decode(100, 0, b"short", geometry).unwrap_err();
        assert!(matches!(err, WireError::TruncatedHeader { .. }));
    }

    #[test]
    fn test_decode_rejects_bad_token() {
        let geometry = WindowGeometry::default();
        let blob = test_blob(2048);
        let (stream, header_len, _) = encode(&blob, &[true, true], geometry);

        // Corrupt the first digest token.
        let mut bytes = stream.to_vec();
        bytes[0] = b'z';
        let err = decode(header_len, blob.len(), &bytes, geometry).unwrap_err();
        assert!(matches!(err, WireError::BadToken { position: 0, .. }));
    }

    #[test]
    fn test_decode_rejects_truncated_body() {
        let geometry = WindowGeometry::default();
        let blob = test_blob(5000);
        let (stream, header_len, _) = encode(&blob, &[false; 5], geometry);

        let chopped = &stream[..stream.len() - 100];
        let err = decode(header_len, blob.len(), chopped, geometry).unwrap_err();
        assert!(matches!(err, WireError::TruncatedBody { .. }));
    }

    #[test]
    fn test_decode_rejects_trailing_body_bytes() {
        let geometry = WindowGeometry::default();
        let blob = test_blob(5000);
        let (stream, header_len, _) = encode(&blob, &[false; 5], geometry);

        let mut padded = stream.to_vec();
        padded.extend_from_slice(b"garbage");
        let err = decode(header_len, blob.len(), &padded, geometry).unwrap_err();
        assert!(matches!(err, WireError::BodyLengthMismatch { .. }));
    }

    #[test]
    fn test_decode_rejects_absurd_declared_blob_len() {
        // A minimal frame claiming a u64::MAX blob must be rejected
        // outright; nothing may be sized from the declared length.
        let geometry = WindowGeometry::default();
        let mut frame = Vec::with_capacity(FRAME_PREFIX_LEN);
        frame.extend_from_slice(&0u32.to_be_bytes());
        frame.extend_from_slice(&u64::MAX.to_be_bytes());

        let err = decode_frame(&frame, geometry).unwrap_err();
        assert!(matches!(
            err,
            WireError::TokenCountMismatch { tokens: 0, .. }
        ));
    }

    #[test]
    fn test_decode_rejects_non_utf8_header() {
        let geometry = WindowGeometry::default();
        // One window implied, but the header bytes are not UTF-8.
        let stream = [0xFFu8, 0xFE, 0xFD];
        let err = decode(3, 1024, &stream, geometry).unwrap_err();
        assert!(matches!(err, WireError::NonUtf8Header));
    }

    #[test]
    fn test_decode_rejects_token_count_disagreeing_with_blob_len() {
        let geometry = WindowGeometry::default();
        let blob = test_blob(5000);
        let (stream, header_len, _) = encode(&blob, &[true; 5], geometry);

        // Claim a blob twice the size: 5 tokens can't cover 10 windows.
        let err = decode(header_len, 10_000, &stream, geometry).unwrap_err();
        assert!(matches!(err, WireError::TokenCountMismatch { .. }));
    }
}
