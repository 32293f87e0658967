//! Asset loading data - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in asset_operations.rs

use crate::error::ViewerError;
use std::collections::HashMap;
use std::path::PathBuf;

/// Outcome of polling a background load
#[derive(Debug)]
pub enum AssetState<T> {
    Pending,
    Ready(T),
    Failed(ViewerError),
}

/// Payload-free view of a load, for bookkeeping and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Pending,
    Ready,
    Failed,
}

/// Message sent from a loader worker back to the render thread
#[derive(Debug)]
pub enum LoadEvent<T> {
    /// Raw bytes fetched, decoding still to come
    Progress { loaded_bytes: usize },
    Ready(T),
    Failed(ViewerError),
}

/// A load in flight.
///
/// `Ready` and `Failed` are yielded exactly once; after that the load is
/// settled and the owner is expected to drop it.
#[derive(Debug)]
pub struct AssetLoad<T> {
    pub label: String,
    pub receiver: flume::Receiver<LoadEvent<T>>,
    pub loaded_bytes: Option<usize>,
    pub settled: bool,
}

/// Reads assets from a directory on disk
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    pub root: PathBuf,
}

/// Serves assets from memory, keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub entries: HashMap<String, Vec<u8>>,
}
