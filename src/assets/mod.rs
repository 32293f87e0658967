/// Assets Module - Data-Oriented Programming (DOP) style
///
/// - asset_data.rs: load states, events and sources
/// - asset_operations.rs: background fetch/decode and polling
///

pub mod asset_data;
pub mod asset_operations;

pub use asset_data::{AssetLoad, AssetState, FileSystemSource, LoadEvent, LoadStatus, MemorySource};

pub use asset_operations::{
    filesystem_source, insert_memory_asset, poll_load, spawn_load, AssetSource,
};
