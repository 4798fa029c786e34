//! Deterministic chunking and recipe generation.
//!
//! This crate provides [`Chunker`], which splits a blob into fixed,
//! overlapping windows and hashes each window with SHA-256, producing a
//! [`Recipe`](remora_types::Recipe) — the ordered digest list both sides
//! of a transfer agree on. Window boundaries are fixed-offset, never
//! content-defined.

mod chunker;
mod error;

pub use chunker::Chunker;
pub use error::ChunkError;
