//! Property-based tests for identity determinism and incremental file sets

mod identity;
