//! Media probing for grid aspect ratios.
//!
//! - Reads only image headers (`image` crate) to get dimensions
//! - Memoizes results in an LRU keyed by xxhash of (path + mtime + size)
//! - Probes a whole catalog on a small worker pool fed over flume channels
//!
//! Missing, remote, video and broken media yield `None`; the catalog loader
//! substitutes the fallback aspect ratio.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::UNIX_EPOCH;

use image::ImageReader;
use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::models::{is_remote, MediaType};

/// Default number of probe worker threads.
pub const DEFAULT_WORKERS: usize = 2;

/// Maximum number of probe worker threads.
const MAX_WORKERS: usize = 4;

/// Maximum number of queued probe jobs.
const MAX_QUEUE_SIZE: usize = 256;

/// Default capacity of the probe cache (number of entries).
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Bump when probing semantics change.
const PROBE_CACHE_VERSION: u8 = 1;

/// Pixel dimensions as (width, height).
pub type Dimensions = (u32, u32);

/// Cache key for probe lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProbeKey(u64);

impl ProbeKey {
    pub fn new(path: &Path, mtime: i64, size: u64) -> Self {
        let path_str = path.to_string_lossy();
        let mut data = Vec::with_capacity(path_str.len() + 17);
        data.push(PROBE_CACHE_VERSION);
        data.extend_from_slice(path_str.as_bytes());
        data.extend_from_slice(&mtime.to_le_bytes());
        data.extend_from_slice(&size.to_le_bytes());
        Self(xxh3_64(&data))
    }
}

/// Thread-safe LRU of probe results, including negative results.
#[derive(Clone)]
pub struct ProbeCache {
    entries: Arc<Mutex<LruCache<ProbeKey, Option<Dimensions>>>>,
}

impl ProbeCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    pub fn get(&self, key: ProbeKey) -> Option<Option<Dimensions>> {
        self.entries.lock().get(&key).copied()
    }

    pub fn insert(&self, key: ProbeKey, dims: Option<Dimensions>) {
        self.entries.lock().put(key, dims);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for ProbeCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

/// Resolves catalog media paths under a site root and reads their dimensions.
pub struct MediaProbe {
    root: PathBuf,
    cache: ProbeCache,
    workers: usize,
}

impl MediaProbe {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_cache(root, DEFAULT_WORKERS, ProbeCache::default())
    }

    pub fn with_cache(root: impl Into<PathBuf>, workers: usize, cache: ProbeCache) -> Self {
        Self {
            root: root.into(),
            cache,
            workers: workers.clamp(1, MAX_WORKERS),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache(&self) -> &ProbeCache {
        &self.cache
    }

    /// Maps a catalog path (`images/a.jpg` or `/images/a.jpg`) to a file under
    /// the root. Remote URLs have no local file.
    pub fn resolve(&self, media: &str) -> Option<PathBuf> {
        if media.is_empty() || is_remote(media) {
            return None;
        }
        Some(self.root.join(media.trim_start_matches('/')))
    }

    pub fn dimensions(&self, media: &str) -> Option<Dimensions> {
        let path = self.resolve(media)?;
        self.dimensions_at(&path)
    }

    fn dimensions_at(&self, path: &Path) -> Option<Dimensions> {
        let meta = match std::fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) => {
                warn!(?path, error = %e, "Media file not readable");
                return None;
            }
        };
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        let key = ProbeKey::new(path, mtime, meta.len());

        if let Some(hit) = self.cache.get(key) {
            trace!(?path, "Probe cache hit");
            return hit;
        }
        let dims = read_dimensions(path);
        self.cache.insert(key, dims);
        dims
    }

    /// Probes every source, preserving input order in the result.
    pub fn probe_all(&self, sources: &[Option<String>]) -> Vec<Option<Dimensions>> {
        let mut results = vec![None; sources.len()];
        let jobs: Vec<(usize, PathBuf)> = sources
            .iter()
            .enumerate()
            .filter_map(|(i, src)| src.as_deref().and_then(|s| self.resolve(s)).map(|p| (i, p)))
            .collect();

        if jobs.len() < 2 || self.workers == 1 {
            for (index, path) in jobs {
                results[index] = self.dimensions_at(&path);
            }
            return results;
        }

        let num_workers = self.workers.min(jobs.len());
        let job_count = jobs.len();
        let (job_tx, job_rx) = flume::bounded::<(usize, PathBuf)>(MAX_QUEUE_SIZE);
        let (result_tx, result_rx) = flume::unbounded();
        let mut unsent = Vec::new();

        thread::scope(|s| {
            for worker_id in 0..num_workers {
                let rx = job_rx.clone();
                let tx = result_tx.clone();
                let spawned = thread::Builder::new()
                    .name(format!("probe-worker-{}", worker_id))
                    .spawn_scoped(s, move || {
                        for (index, path) in rx.iter() {
                            let dims = self.dimensions_at(&path);
                            if tx.send((index, dims)).is_err() {
                                break;
                            }
                        }
                        trace!(worker_id, "Probe worker exiting");
                    });
                if let Err(e) = spawned {
                    warn!(worker_id, error = %e, "Failed to spawn probe worker");
                }
            }
            drop(job_rx);
            drop(result_tx);

            for job in jobs {
                // Every worker gone: finish the rest on this thread.
                if let Err(flume::SendError(job)) = job_tx.send(job) {
                    unsent.push(job);
                }
            }
            drop(job_tx);

            for (index, dims) in result_rx.iter() {
                results[index] = dims;
            }
        });

        for (index, path) in unsent {
            results[index] = self.dimensions_at(&path);
        }

        debug!(jobs = job_count, workers = num_workers, "Probed media dimensions");
        results
    }
}

/// Reads image dimensions from the header only.
fn read_dimensions(path: &Path) -> Option<Dimensions> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match MediaType::from_extension(&ext) {
        Some(MediaType::Image) => {}
        Some(other) => {
            debug!(?path, kind = ?other, "No dimension probe for media kind");
            return None;
        }
        None => {
            warn!("Unknown media type for extension: {}", ext);
            return None;
        }
    }

    match ImageReader::open(path).map(|r| r.into_dimensions()) {
        Ok(Ok((width, height))) if width > 0 && height > 0 => {
            trace!("Got dimensions {}x{} for {:?}", width, height, path);
            Some((width, height))
        }
        Ok(Ok(_)) => {
            warn!(?path, "Image reports zero dimensions");
            None
        }
        Ok(Err(e)) => {
            warn!("Failed to read image dimensions for {:?}: {}", path, e);
            None
        }
        Err(e) => {
            warn!("Failed to open image {:?}: {}", path, e);
            None
        }
    }
}
