//! # tardelta Core Library
//!
//! This crate provides the core functionality for the `tardelta` archive
//! comparison tool.
//!
//! It is designed to be used by the `tardelta` command-line application, but
//! its public API can also be used to programmatically diff two tar archives
//! and assemble a delta archive of the changes.
//!
//! ## Key Modules
//!
//! - [`entry`]: The per-member descriptor, entry-type model and comparator.
//! - [`fingerprint`]: Block-wise SHA-1 content fingerprinting.
//! - [`reader`]: Reads an archive (plain, gzip, xz or zstd) into a snapshot.
//! - [`diff`]: Matches two snapshots and classifies every change.
//! - [`report`]: Renders the stable, colon-delimited change records.
//! - [`writer`]: Writes the added/modified entries into a delta archive.

pub mod cli;
pub mod diff;
pub mod entry;
pub mod error;
pub mod fingerprint;
pub mod reader;
pub mod report;
pub mod writer;

pub use error::DiffError;
