pub mod storage;

use crate::infrastructure::server_impl::connection::ReadPolicy;
use std::sync::Arc;
use storage::Storage;

/// Read-only state shared by every connection.
#[derive(Clone, Debug)]
pub struct ServerData {
    pub storage: Arc<dyn Storage>,
    pub read_policy: ReadPolicy,
}

impl ServerData {
    pub fn new(storage: impl Storage + 'static, read_policy: ReadPolicy) -> Self {
        Self {
            storage: Arc::new(storage),
            read_policy,
        }
    }
}
