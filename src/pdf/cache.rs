use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use sha2::{Digest, Sha256};

use super::InvoiceDocument;

/// Content fingerprint over the whole document, so any field change is a miss.
pub fn fingerprint(document: &InvoiceDocument) -> String {
    let mut hasher = Sha256::new();
    match serde_json::to_vec(document) {
        Ok(bytes) => hasher.update(&bytes),
        // Serializing plain data cannot fail; fall back to the debug form anyway.
        Err(_) => hasher.update(format!("{document:?}").as_bytes()),
    }
    hex::encode(hasher.finalize())
}

struct Entries {
    map: HashMap<String, Arc<Vec<u8>>>,
    order: VecDeque<String>,
}

/// Bounded cache of rendered documents; the oldest insertion is evicted first.
pub struct RenderCache {
    capacity: usize,
    entries: Mutex<Entries>,
}

impl RenderCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(Entries {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<Vec<u8>>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.map.get(key).cloned()
    }

    pub fn insert(&self, key: String, bytes: Arc<Vec<u8>>) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.map.insert(key.clone(), bytes).is_some() {
            return;
        }
        entries.order.push_back(key);
        while entries.order.len() > self.capacity {
            if let Some(oldest) = entries.order.pop_front() {
                entries.map.remove(&oldest);
            }
        }
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.map.clear();
        entries.order.clear();
    }
}
