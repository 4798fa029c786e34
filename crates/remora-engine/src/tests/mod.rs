//! End-to-end tests for the assemble → decode → rebuild pipeline.

mod helpers;
