use parking_lot::RwLock;
use std::sync::Arc;

/// The public host short URLs are built from, e.g. `https://sn.ip`.
///
/// Clones share one value, so a [`set`](HostConfig::set) is seen by every
/// holder on its next read. Nothing derived from the host is stored.
#[derive(Debug, Clone)]
pub struct HostConfig {
    host: Arc<RwLock<String>>,
}

impl HostConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: Arc::new(RwLock::new(host.into())),
        }
    }

    pub fn get(&self) -> String {
        self.host.read().clone()
    }

    pub fn set(&self, host: impl Into<String>) {
        *self.host.write() = host.into();
    }
}
