use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Source of the number of members currently connected to the server
pub trait PopulationSource: Send + Sync {
    fn count(&self) -> usize;
}

#[derive(Debug, Default)]
struct RosterInner {
    online: BTreeSet<String>,
    visits: BTreeMap<String, u32>,
}

/// In-memory player list maintained by the host
#[derive(Debug, Default)]
pub struct Roster {
    inner: Mutex<RosterInner>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` as online. Returns false if they already were.
    pub fn join(&self, name: &str) -> bool {
        let mut inner = self.inner.lock();
        if !inner.online.insert(name.to_string()) {
            return false;
        }
        *inner.visits.entry(name.to_string()).or_insert(0) += 1;
        debug!(player = name, online = inner.online.len(), "Player joined roster");
        true
    }

    /// Mark `name` as offline. Returns false if they were not online.
    pub fn leave(&self, name: &str) -> bool {
        let mut inner = self.inner.lock();
        let removed = inner.online.remove(name);
        if removed {
            debug!(player = name, online = inner.online.len(), "Player left roster");
        }
        removed
    }

    pub fn online(&self) -> Vec<String> {
        self.inner.lock().online.iter().cloned().collect()
    }

    /// Number of sessions each player has started since the process began
    pub fn visits(&self) -> BTreeMap<String, u32> {
        self.inner.lock().visits.clone()
    }
}

impl PopulationSource for Roster {
    fn count(&self) -> usize {
        self.inner.lock().online.len()
    }
}
