//! Order persistence.
//!
//! Two backends sit behind [`OrderStore`]: one JSON document per order on
//! disk, and a process-lifetime map. [`FallbackStore`] pairs them so a host
//! whose filesystem turns read-only keeps accepting saves.
//!
//! Writes are last-writer-wins; there is no locking across requests.

use crate::config::Config;
use crate::error::{NotchError, Result};
use crate::io::{atomic_write, probe_writable};
use crate::order::{Order, Placement, Step};
use crate::paths::{order_key, order_path};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

pub trait OrderStore: Send + Sync {
    /// Load an order. `OrderNotFound` when absent, `Storage` when present but
    /// unreadable.
    fn get(&self, order_no: &str) -> Result<Order>;

    /// Replace the stored record for `order.order_no`.
    fn put(&self, order: &Order) -> Result<Placement>;

    /// Human-readable location, for logs.
    fn location(&self) -> String;

    fn contains(&self, order_no: &str) -> Result<bool> {
        match self.get(order_no) {
            Ok(_) => Ok(true),
            Err(NotchError::OrderNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

// ---------------------------------------------------------------------------
// DiskStore
// ---------------------------------------------------------------------------

pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    /// Create the directory if needed and confirm it accepts writes.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        probe_writable(&dir)?;
        Ok(Self { dir })
    }

    /// Open an existing directory for reading without probing it.
    pub fn open_existing(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(NotchError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("data directory not found: {}", dir.display()),
            )));
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, order_no: &str) -> Result<PathBuf> {
        Ok(order_path(&self.dir, &order_key(order_no)?))
    }
}

/// Key for a read. A number with no usable characters can never have been
/// saved, so it reads as not found rather than invalid.
fn lookup_key(order_no: &str) -> Result<String> {
    order_key(order_no).map_err(|_| NotchError::OrderNotFound(order_no.to_string()))
}

impl OrderStore for DiskStore {
    fn get(&self, order_no: &str) -> Result<Order> {
        let path = order_path(&self.dir, &lookup_key(order_no)?);
        if !path.exists() {
            return Err(NotchError::OrderNotFound(order_no.to_string()));
        }
        let data = std::fs::read_to_string(&path).map_err(|e| NotchError::Storage {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&data).map_err(|e| NotchError::Storage {
            path,
            reason: e.to_string(),
        })
    }

    fn put(&self, order: &Order) -> Result<Placement> {
        let path = self.path_for(&order.order_no)?;
        let data = serde_json::to_string_pretty(order)?;
        atomic_write(&path, data.as_bytes())?;
        Ok(Placement::Disk(path))
    }

    fn location(&self) -> String {
        self.dir.display().to_string()
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStore {
    orders: Mutex<HashMap<String, Order>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Order>> {
        // A panic while holding the lock cannot leave a half-written Order.
        self.orders.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn remove(&self, order_no: &str) -> Result<Option<Order>> {
        let key = order_key(order_no)?;
        Ok(self.lock().remove(&key))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OrderStore for MemoryStore {
    fn get(&self, order_no: &str) -> Result<Order> {
        let key = lookup_key(order_no)?;
        self.lock()
            .get(&key)
            .cloned()
            .ok_or_else(|| NotchError::OrderNotFound(order_no.to_string()))
    }

    fn put(&self, order: &Order) -> Result<Placement> {
        let key = order_key(&order.order_no)?;
        self.lock().insert(key, order.clone());
        Ok(Placement::Memory)
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

// ---------------------------------------------------------------------------
// FallbackStore
// ---------------------------------------------------------------------------

/// Disk first, memory when a disk write fails.
///
/// A memory entry only exists while it is newer than the disk copy: a later
/// successful disk write evicts it. Reads therefore check memory first.
pub struct FallbackStore {
    disk: DiskStore,
    memory: MemoryStore,
}

impl FallbackStore {
    pub fn new(disk: DiskStore) -> Self {
        Self {
            disk,
            memory: MemoryStore::new(),
        }
    }

    /// Number of orders currently held only in memory.
    pub fn memory_only_count(&self) -> usize {
        self.memory.len()
    }
}

impl OrderStore for FallbackStore {
    fn get(&self, order_no: &str) -> Result<Order> {
        match self.memory.get(order_no) {
            Ok(order) => Ok(order),
            Err(NotchError::OrderNotFound(_)) => self.disk.get(order_no),
            Err(e) => Err(e),
        }
    }

    fn put(&self, order: &Order) -> Result<Placement> {
        match self.disk.put(order) {
            Ok(placement) => {
                self.memory.remove(&order.order_no)?;
                Ok(placement)
            }
            Err(e @ NotchError::Validation(_)) => Err(e),
            Err(e) => {
                tracing::warn!(
                    order_no = %order.order_no,
                    dir = %self.disk.dir().display(),
                    error = %e,
                    "disk write failed, keeping order in memory"
                );
                self.memory.put(order)
            }
        }
    }

    fn location(&self) -> String {
        format!("{} (memory fallback)", self.disk.location())
    }
}

// ---------------------------------------------------------------------------
// Construction and save
// ---------------------------------------------------------------------------

/// Pick the storage backend once, at startup.
pub fn open_store(config: &Config) -> Arc<dyn OrderStore> {
    if config.memory_only {
        tracing::info!("memory-only storage requested; orders will not survive a restart");
        return Arc::new(MemoryStore::new());
    }

    for dir in config.data_dir_candidates() {
        match DiskStore::open(&dir) {
            Ok(disk) => {
                tracing::info!(dir = %dir.display(), "storing orders on disk");
                return Arc::new(FallbackStore::new(disk));
            }
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "data directory not writable");
            }
        }
    }

    tracing::error!("no writable data directory; orders will be kept in memory only");
    Arc::new(MemoryStore::new())
}

/// Build a full-replace record for `order_no` and store it.
pub fn save_order(
    store: &dyn OrderStore,
    order_no: &str,
    steps: Vec<Step>,
) -> Result<(Order, Placement)> {
    let order_no = order_no.trim();
    order_key(order_no)?;
    let order = Order::new(order_no, steps)?;
    let placement = store.put(&order)?;
    Ok((order, placement))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
