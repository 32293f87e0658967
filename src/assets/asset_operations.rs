//! Asset loading operations
//!
//! Loads are fetched and decoded on the rayon pool. Results come back over a
//! flume channel and are only observed when the render thread polls, so
//! nothing the renderer reads is ever mutated off-thread.

use super::asset_data::{AssetLoad, AssetState, FileSystemSource, LoadEvent, MemorySource};
use crate::error::{ViewerError, ViewerResult};
use std::path::Path;
use std::sync::Arc;

/// Where asset bytes come from
pub trait AssetSource: Send + Sync {
    fn fetch(&self, path: &str) -> ViewerResult<Vec<u8>>;
}

impl AssetSource for FileSystemSource {
    fn fetch(&self, path: &str) -> ViewerResult<Vec<u8>> {
        let full = self.root.join(path);
        std::fs::read(&full).map_err(|e| ViewerError::AssetFetch {
            path: full.display().to_string(),
            error: e.to_string(),
        })
    }
}

impl AssetSource for MemorySource {
    fn fetch(&self, path: &str) -> ViewerResult<Vec<u8>> {
        self.entries
            .get(path)
            .cloned()
            .ok_or_else(|| ViewerError::AssetFetch {
                path: path.to_string(),
                error: "not found".to_string(),
            })
    }
}

pub fn filesystem_source(root: &Path) -> FileSystemSource {
    FileSystemSource {
        root: root.to_path_buf(),
    }
}

pub fn insert_memory_asset(source: &mut MemorySource, path: &str, bytes: Vec<u8>) {
    source.entries.insert(path.to_string(), bytes);
}

/// Fetch `path` and decode it in the background.
///
/// Returns immediately. The decode closure receives the path and the fetched
/// bytes.
pub fn spawn_load<T, F>(source: Arc<dyn AssetSource>, path: &str, decode: F) -> AssetLoad<T>
where
    T: Send + 'static,
    F: FnOnce(&str, Vec<u8>) -> ViewerResult<T> + Send + 'static,
{
    let (sender, receiver) = flume::unbounded();
    let owned_path = path.to_string();

    rayon::spawn(move || {
        // Send failures mean the viewer is gone; nothing left to notify.
        let bytes = match source.fetch(&owned_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = sender.send(LoadEvent::Failed(e));
                return;
            }
        };

        let _ = sender.send(LoadEvent::Progress {
            loaded_bytes: bytes.len(),
        });

        let event = match decode(&owned_path, bytes) {
            Ok(value) => LoadEvent::Ready(value),
            Err(e) => LoadEvent::Failed(e),
        };
        let _ = sender.send(event);
    });

    log::debug!("[asset_operations::spawn_load] Started load of {}", path);

    AssetLoad {
        label: path.to_string(),
        receiver,
        loaded_bytes: None,
        settled: false,
    }
}

/// Drain pending events without blocking
pub fn poll_load<T>(load: &mut AssetLoad<T>) -> AssetState<T> {
    if load.settled {
        return AssetState::Failed(ViewerError::StateError {
            expected: format!("pending load of {}", load.label),
            actual: "settled load".to_string(),
        });
    }

    loop {
        match load.receiver.try_recv() {
            Ok(event) => {
                if let Some(state) = apply_event(load, event) {
                    return state;
                }
            }
            Err(flume::TryRecvError::Empty) => return AssetState::Pending,
            Err(flume::TryRecvError::Disconnected) => {
                load.settled = true;
                return AssetState::Failed(ViewerError::ChannelClosed {
                    name: load.label.clone(),
                });
            }
        }
    }
}

fn apply_event<T>(load: &mut AssetLoad<T>, event: LoadEvent<T>) -> Option<AssetState<T>> {
    match event {
        LoadEvent::Progress { loaded_bytes } => {
            log::debug!(
                "[asset_operations::poll_load] {} fetched ({} bytes)",
                load.label,
                loaded_bytes
            );
            load.loaded_bytes = Some(loaded_bytes);
            None
        }
        LoadEvent::Ready(value) => {
            load.settled = true;
            log::info!("[asset_operations::poll_load] {} loaded", load.label);
            Some(AssetState::Ready(value))
        }
        LoadEvent::Failed(e) => {
            load.settled = true;
            Some(AssetState::Failed(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    const WAIT: Duration = Duration::from_secs(10);

    /// Block until the load settles or `timeout` elapses
    fn wait_load<T>(load: &mut AssetLoad<T>, timeout: Duration) -> AssetState<T> {
        let deadline = Instant::now() + timeout;

        while !load.settled {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match load.receiver.recv_timeout(remaining) {
                Ok(event) => {
                    if let Some(state) = apply_event(load, event) {
                        return state;
                    }
                }
                Err(flume::RecvTimeoutError::Timeout) => return AssetState::Pending,
                Err(flume::RecvTimeoutError::Disconnected) => {
                    load.settled = true;
                    return AssetState::Failed(ViewerError::ChannelClosed {
                        name: load.label.clone(),
                    });
                }
            }
        }

        poll_load(load)
    }

    fn memory_source(path: &str, bytes: &[u8]) -> Arc<dyn AssetSource> {
        let mut source = MemorySource::default();
        insert_memory_asset(&mut source, path, bytes.to_vec());
        Arc::new(source)
    }

    #[test]
    fn test_load_resolves_ready() {
        let source = memory_source("a.bin", b"abcd");
        let mut load = spawn_load(source, "a.bin", |_, bytes| Ok(bytes.len()));

        match wait_load(&mut load, WAIT) {
            AssetState::Ready(len) => assert_eq!(len, 4),
            other => panic!("unexpected state: {:?}", other),
        }
        assert!(load.settled);
        assert_eq!(load.loaded_bytes, Some(4));
    }

    #[test]
    fn test_missing_asset_fails_without_decoding() {
        let source: Arc<dyn AssetSource> = Arc::new(MemorySource::default());
        let mut load = spawn_load(source, "missing.glb", |_, _| -> ViewerResult<()> {
            panic!("decode must not run")
        });

        match wait_load(&mut load, WAIT) {
            AssetState::Failed(ViewerError::AssetFetch { path, .. }) => {
                assert_eq!(path, "missing.glb")
            }
            other => panic!("unexpected state: {:?}", other),
        }
        assert_eq!(load.loaded_bytes, None);
    }

    #[test]
    fn test_decode_error_is_reported() {
        let source = memory_source("bad.jpg", b"nope");
        let mut load = spawn_load(source, "bad.jpg", |path, _| -> ViewerResult<()> {
            Err(ViewerError::ImageDecode {
                path: path.to_string(),
                error: "garbage".to_string(),
            })
        });

        assert!(matches!(
            wait_load(&mut load, WAIT),
            AssetState::Failed(ViewerError::ImageDecode { .. })
        ));
    }

    #[test]
    fn test_settled_load_is_not_yielded_twice() {
        let source = memory_source("a.bin", b"x");
        let mut load = spawn_load(source, "a.bin", |_, _| Ok(()));
        assert!(matches!(wait_load(&mut load, WAIT), AssetState::Ready(())));

        assert!(matches!(
            poll_load(&mut load),
            AssetState::Failed(ViewerError::StateError { .. })
        ));
    }

    #[test]
    fn test_filesystem_source_reads_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tile.bin"), [1u8, 2, 3]).unwrap();

        let source = filesystem_source(dir.path());
        assert_eq!(source.fetch("tile.bin").unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            source.fetch("absent.bin"),
            Err(ViewerError::AssetFetch { .. })
        ));
    }
}
