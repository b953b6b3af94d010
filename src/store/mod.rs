//! In-memory mapping store.
//!
//! A single actor task owns the table. Everything else reaches it through a
//! [`Shortener`] handle that sends commands over a bounded channel and waits
//! for a oneshot reply.

pub mod actor;
pub mod messages;

use std::collections::HashMap;

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::shortener::Shortener;
pub use actor::MappingStoreActor;
pub use messages::StoreCommand;

pub const DEFAULT_INBOX_CAPACITY: usize = 64;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 8;

/// What to do when a freshly generated code is already in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Replace the existing mapping without complaint.
    Overwrite,
    /// Draw another code; fail with `CodeSpaceExhausted` after
    /// `max_attempts` collisions in a row.
    Regenerate { max_attempts: u32 },
}

impl Default for CollisionPolicy {
    fn default() -> Self {
        Self::Regenerate {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Bound of the actor's inbox; senders wait while it is full
    pub inbox_capacity: usize,

    pub collisions: CollisionPolicy,

    /// Fixed seed for the code generator. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
            collisions: CollisionPolicy::default(),
            seed: None,
        }
    }
}

/// A running mapping store: the actor task plus the means to stop it.
pub struct MappingStore {
    shortener: Shortener,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl MappingStore {
    /// Spawn an empty store on the current tokio runtime.
    pub fn spawn(config: StoreConfig) -> Self {
        Self::builder().config(config).spawn()
    }

    pub fn builder() -> StoreBuilder {
        StoreBuilder::default()
    }

    /// A handle for issuing requests. Handles are cheap to clone.
    pub fn shortener(&self) -> Shortener {
        self.shortener.clone()
    }

    /// Stop the actor and wait for it to exit.
    ///
    /// Requests still queued are dropped; their callers see `StoreClosed`.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            tracing::error!("Mapping store task failed: {:?}", e);
        }
    }
}

#[derive(Debug, Default)]
pub struct StoreBuilder {
    config: StoreConfig,
    entries: HashMap<String, String>,
}

impl StoreBuilder {
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn collisions(mut self, collisions: CollisionPolicy) -> Self {
        self.config.collisions = collisions;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn inbox_capacity(mut self, capacity: usize) -> Self {
        self.config.inbox_capacity = capacity;
        self
    }

    /// Mappings the table starts out with.
    pub fn entries<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.entries
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Build the actor without starting it.
    pub(crate) fn build(self) -> (MappingStoreActor, Shortener) {
        // mpsc::channel panics on zero capacity
        let (tx, rx) = mpsc::channel(self.config.inbox_capacity.max(1));
        let actor = MappingStoreActor::new(&self.config, self.entries, rx);
        (actor, Shortener::new(tx))
    }

    pub fn spawn(self) -> MappingStore {
        let (actor, shortener) = self.build();
        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(actor.run(shutdown_rx));

        MappingStore {
            shortener,
            shutdown,
            task,
        }
    }
}
