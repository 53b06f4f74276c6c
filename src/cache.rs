use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::error::PingError;
use crate::pinger::StatusPinger;
use crate::status::ServerStatus;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug)]
struct Entry {
    synced: Instant,
    status: ServerStatus,
}

/// Remembers successful query results per `host:port` for a fixed time.
///
/// Only results are shared. Every miss still opens its own connection, and failures are
/// never stored.
#[derive(Debug)]
pub struct StatusCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl StatusCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn key(host: &str, port: u16) -> String {
        format!("{host}:{port}")
    }

    /// Returns the entry if it is still fresh. A stale entry is removed.
    pub fn get(&self, host: &str, port: u16) -> Option<ServerStatus> {
        let key = Self::key(host, port);
        let mut entries = self.entries.lock();
        let entry = entries.get(&key)?;
        if entry.synced.elapsed() < self.ttl {
            return Some(entry.status.clone());
        }
        entries.remove(&key);
        None
    }

    /// Stores `status` and drops every other stale entry.
    pub fn insert(&self, host: &str, port: u16, status: ServerStatus) {
        let ttl = self.ttl;
        let mut entries = self.entries.lock();
        entries.retain(|_, entry| entry.synced.elapsed() < ttl);
        entries.insert(
            Self::key(host, port),
            Entry {
                synced: Instant::now(),
                status,
            },
        );
    }

    /// Drops every entry older than the TTL.
    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.entries
            .lock()
            .retain(|_, entry| entry.synced.elapsed() < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cached status for the pinger's target if it is still fresh, otherwise
    /// queries the server and caches the result on success.
    pub async fn get_or_query(&self, pinger: &StatusPinger) -> Result<ServerStatus, PingError> {
        let (host, port) = pinger.target();
        if let Some(status) = self.get(host, port) {
            return Ok(status);
        }
        let status = pinger.query().await?;
        self.insert(host, port, status.clone());
        Ok(status)
    }
}

impl Default for StatusCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
