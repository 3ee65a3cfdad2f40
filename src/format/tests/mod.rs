//! Unit tests for label file serialization.
//!
//! These tests verify line formatting, parsing failures and round-trip
//! conversions between pixel and normalized coordinates.
