use tokio::{
    sync::{mpsc, oneshot},
    time::Instant,
};

use crate::{
    error::{Result, ShortenError},
    scope::{Interrupted, RequestScope},
    store::StoreCommand,
};

/// Client handle to a running mapping store.
///
/// Each call packages a command with a fresh oneshot reply channel, hands
/// it to the store actor and waits for whichever comes first: the reply or
/// the interruption of the caller's [`RequestScope`]. An interrupted call
/// does not retract a command the actor has already received; the actor
/// still applies it and its reply is dropped.
#[derive(Clone, Debug)]
pub struct Shortener {
    inbox: mpsc::Sender<StoreCommand>,
}

impl Shortener {
    pub(crate) fn new(inbox: mpsc::Sender<StoreCommand>) -> Self {
        Self { inbox }
    }

    /// Create a mapping for `original` and return its new code.
    pub async fn shorten(&self, original: &str, scope: &RequestScope) -> Result<String> {
        if original.is_empty() {
            return Err(ShortenError::MissingInput { field: "original" });
        }

        let original = original.to_owned();
        let code = self
            .request(scope, |reply| StoreCommand::Create { original, reply })
            .await??;
        Ok(code)
    }

    /// Look up the original stored under `code`.
    pub async fn resolve(&self, code: &str, scope: &RequestScope) -> Result<String> {
        if code.is_empty() {
            return Err(ShortenError::MissingInput { field: "code" });
        }

        let key = code.to_owned();
        self.request(scope, |reply| StoreCommand::Lookup { code: key, reply })
            .await?
            .ok_or_else(|| ShortenError::NotFound {
                code: code.to_owned(),
            })
    }

    /// Number of mappings the store currently holds.
    pub async fn count(&self, scope: &RequestScope) -> Result<usize> {
        self.request(scope, |reply| StoreCommand::Count { reply })
            .await
    }

    /// Send a command and wait for its reply, racing both steps against
    /// the scope.
    async fn request<T>(
        &self,
        scope: &RequestScope,
        make_command: impl FnOnce(oneshot::Sender<T>) -> StoreCommand,
    ) -> Result<T> {
        let started = Instant::now();
        if let Some(reason) = scope.interrupted() {
            return Err(interrupted(reason, started));
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        let command = make_command(reply_tx);

        // The send only waits while the inbox is full. A scope interrupted
        // here means the command was never enqueued.
        tokio::select! {
            biased;
            reason = scope.done() => return Err(interrupted(reason, started)),
            sent = self.inbox.send(command) => sent.map_err(|_| ShortenError::StoreClosed)?,
        }

        let reply = tokio::select! {
            biased;
            reason = scope.done() => return Err(interrupted(reason, started)),
            reply = reply_rx => reply.map_err(|_| ShortenError::StoreClosed)?,
        };

        // A reply that raced past an expired scope is discarded.
        match scope.interrupted() {
            Some(reason) => Err(interrupted(reason, started)),
            None => Ok(reply),
        }
    }
}

fn interrupted(reason: Interrupted, started: Instant) -> ShortenError {
    tracing::debug!(?reason, "Store request abandoned");
    match reason {
        Interrupted::Cancelled => ShortenError::Cancelled,
        Interrupted::DeadlineExceeded => ShortenError::Timeout {
            after: started.elapsed(),
        },
    }
}
