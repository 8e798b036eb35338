//! Shared plumbing for optimistic mutations.
//!
//! # Responsibility
//! - Bound every gateway call by the configured deadline.
//! - Log start/outcome of each call and forward failures to the notifier.
//! - Release save-state markers on every exit path, including a dropped
//!   future.

use crate::board::save_state::StructuralHold;
use crate::board::store::BoardHandle;
use crate::gateway::GatewayResult;
use crate::model::item::ItemKey;
use crate::service::error::{BoardError, MutationOp};
use crate::service::notify::{Notice, Notifier};
use log::{debug, info, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// State shared by all board services of one session.
#[derive(Clone)]
pub struct MutationContext {
    pub(crate) board: BoardHandle,
    pub(crate) timeout: Duration,
    pub(crate) notifier: Arc<dyn Notifier>,
}

impl MutationContext {
    pub fn new(board: BoardHandle, timeout: Duration, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            board,
            timeout,
            notifier,
        }
    }

    pub fn board(&self) -> &BoardHandle {
        &self.board
    }

    /// Runs one gateway call under the deadline and logs its outcome.
    pub(crate) async fn dispatch<T, F>(
        &self,
        op: MutationOp,
        key: Option<ItemKey>,
        call: F,
    ) -> Result<T, BoardError>
    where
        F: Future<Output = GatewayResult<T>>,
    {
        let started_at = Instant::now();
        let item = key.map_or_else(|| "none".to_string(), |key| key.to_string());
        debug!("event={op} module=service status=start item={item}");

        let outcome = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(BoardError::Gateway { op, source }),
            Err(_) => Err(BoardError::TimedOut {
                op,
                after: self.timeout,
            }),
        };

        let duration_ms = started_at.elapsed().as_millis();
        match &outcome {
            Ok(_) => info!("event={op} module=service status=ok item={item} duration_ms={duration_ms}"),
            Err(BoardError::TimedOut { .. }) => warn!(
                "event={op} module=service status=error item={item} duration_ms={duration_ms} error_code=timeout"
            ),
            Err(err) => warn!(
                "event={op} module=service status=error item={item} duration_ms={duration_ms} error_code=gateway error={err}"
            ),
        }
        outcome
    }

    /// Forwards a mutation failure to the notification surface.
    pub(crate) fn report(&self, op: MutationOp, key: Option<ItemKey>) {
        self.notifier.notify(Notice::error(op.failure_message(), key));
    }
}

/// Ends save-state markers for `keys` when dropped.
///
/// Takes ownership of keys, and an optional structural hold, already begun
/// under the store lock.
pub(crate) struct InFlightGuard {
    board: BoardHandle,
    keys: Vec<ItemKey>,
    hold: Option<StructuralHold>,
}

impl InFlightGuard {
    pub(crate) fn new(board: &BoardHandle, keys: Vec<ItemKey>) -> Self {
        Self {
            board: board.clone(),
            keys,
            hold: None,
        }
    }

    pub(crate) fn holding(mut self, hold: StructuralHold) -> Self {
        self.hold = Some(hold);
        self
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let keys = std::mem::take(&mut self.keys);
        let hold = self.hold.take();
        self.board.write(|store| {
            let tracker = store.save_state_mut();
            tracker.end_all(&keys);
            if let Some(hold) = hold {
                tracker.release(hold);
            }
        });
    }
}
