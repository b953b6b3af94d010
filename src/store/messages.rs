//! Commands accepted by the mapping store actor.
//!
//! Every command carries its own oneshot reply channel. The actor is the
//! only writer of that channel, the caller that built the command is the
//! only reader, and the channel is consumed by the single reply.

use tokio::sync::oneshot;

use crate::error::Result;

#[derive(Debug)]
pub enum StoreCommand {
    /// Generate a code for `original` and record the mapping
    Create {
        original: String,
        reply: oneshot::Sender<Result<String>>,
    },

    /// Read the original stored under `code`; `None` when absent
    Lookup {
        code: String,
        reply: oneshot::Sender<Option<String>>,
    },

    /// Number of mappings currently held
    Count { reply: oneshot::Sender<usize> },
}
