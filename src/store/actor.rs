use std::collections::HashMap;

use rand::{rngs::StdRng, SeedableRng};
use tokio::sync::{mpsc, oneshot};

use super::{messages::StoreCommand, CollisionPolicy, StoreConfig};
use crate::{
    code::random_code,
    error::{Result, ShortenError},
};

/// Sole owner of the code -> original table.
///
/// Commands are taken off the inbox and handled one at a time, so the table
/// is never read and written concurrently and needs no lock.
pub struct MappingStoreActor {
    table: HashMap<String, String>,
    rng: StdRng,
    collisions: CollisionPolicy,
    inbox: mpsc::Receiver<StoreCommand>,
}

impl MappingStoreActor {
    pub(crate) fn new(
        config: &StoreConfig,
        table: HashMap<String, String>,
        inbox: mpsc::Receiver<StoreCommand>,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            table,
            rng,
            collisions: config.collisions,
            inbox,
        }
    }

    /// Run the actor event loop.
    ///
    /// Stops when `shutdown` fires or every sender of the inbox is gone.
    /// If the shutdown sender is dropped without firing, the loop keeps
    /// serving until the inbox closes.
    pub async fn run(mut self, mut shutdown: oneshot::Receiver<()>) {
        tracing::info!(
            entries = self.table.len(),
            collisions = ?self.collisions,
            "Mapping store started"
        );

        let mut listening = true;
        loop {
            let command = tokio::select! {
                biased;
                signal = &mut shutdown, if listening => match signal {
                    Ok(()) => break,
                    Err(_) => {
                        listening = false;
                        continue;
                    }
                },
                command = self.inbox.recv() => match command {
                    Some(command) => command,
                    None => break,
                },
            };

            self.handle(command);
        }

        tracing::info!(entries = self.table.len(), "Mapping store stopped");
    }

    fn handle(&mut self, command: StoreCommand) {
        match command {
            StoreCommand::Create { original, reply } => {
                let res = self.create(original);
                // The caller may have given up; the mapping stays either way.
                let _ = reply.send(res);
            }

            StoreCommand::Lookup { code, reply } => {
                let original = self.table.get(&code).cloned();
                tracing::debug!(%code, found = original.is_some(), "Lookup");
                let _ = reply.send(original);
            }

            StoreCommand::Count { reply } => {
                let _ = reply.send(self.table.len());
            }
        }
    }

    fn create(&mut self, original: String) -> Result<String> {
        let code = match self.collisions {
            CollisionPolicy::Overwrite => {
                let code = random_code(&mut self.rng);
                if self.table.contains_key(&code) {
                    tracing::warn!(%code, "Code collision, overwriting existing mapping");
                }
                code
            }
            CollisionPolicy::Regenerate { max_attempts } => self.unused_code(max_attempts)?,
        };

        tracing::debug!(%code, %original, "Mapping created");
        self.table.insert(code.clone(), original);
        Ok(code)
    }

    /// Draw codes until one is not already taken, giving up after
    /// `max_attempts` collisions.
    fn unused_code(&mut self, max_attempts: u32) -> Result<String> {
        for attempt in 1..=max_attempts {
            let code = random_code(&mut self.rng);
            if !self.table.contains_key(&code) {
                return Ok(code);
            }
            tracing::warn!(%code, attempt, "Code collision, regenerating");
        }

        tracing::error!(max_attempts, "No free code found");
        Err(ShortenError::CodeSpaceExhausted {
            attempts: max_attempts,
        })
    }
}
