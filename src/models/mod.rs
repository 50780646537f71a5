//! Data models for suggestd.
//!
//! This module contains the core data structures used throughout the system.

mod entry;

pub use entry::{BuildStats, Entry, RawDataset, RawEntry};
