//! Integration tests for Layer 1: Storage
//!
//! Tests for observation datasets and probability tables.

mod datasets;
mod tables;
