//! Property-based tests for scan semantics
