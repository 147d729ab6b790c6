//! Dispatch session: runs each batch through
//! `Idle -> Validating -> (Rejected | Dispatching) -> Aggregating -> Settled`
//! and keeps the settled result until the next batch or a reset.
//!
//! Only the most recent invocation owns the session state. An older batch
//! that is still in flight when a newer one begins (or a reset happens)
//! still answers its own caller, but its phase changes and result are
//! dropped.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use super::batcher::dispatch_all;
use super::outcome::{BatchResult, aggregate};
use crate::error::{Error, InputError};
use crate::gateway::SmsGateway;
use crate::pairing::{MAX_LIMIT, Pair, Pairing};

/// Where the session is in its per-batch lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Validating,
    Rejected,
    Dispatching,
    Aggregating,
    Settled,
}

#[derive(Debug)]
struct SessionState {
    phase: Phase,
    last_result: Option<BatchResult>,
    /// Batch that currently owns `phase` and `last_result`.
    current: Option<Uuid>,
}

impl SessionState {
    fn owned_by(&self, batch_id: Uuid) -> bool {
        self.current == Some(batch_id)
    }
}

/// Owns the gateway and the latest batch result.
pub struct DispatchSession {
    gateway: Arc<dyn SmsGateway>,
    group_size: usize,
    state: RwLock<SessionState>,
}

impl DispatchSession {
    pub fn new(gateway: Arc<dyn SmsGateway>, group_size: usize) -> Arc<Self> {
        Arc::new(Self {
            gateway,
            group_size: group_size.max(1),
            state: RwLock::new(SessionState {
                phase: Phase::Idle,
                last_result: None,
                current: None,
            }),
        })
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    pub async fn phase(&self) -> Phase {
        self.state.read().await.phase
    }

    pub async fn last_result(&self) -> Option<BatchResult> {
        self.state.read().await.last_result.clone()
    }

    /// Drop the settled result and return to `Idle`.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        state.phase = Phase::Idle;
        state.last_result = None;
        state.current = None;
        info!("Dispatch session reset");
    }

    /// Dispatch a pairing of two text blocks. Refused unless it is balanced.
    pub async fn send_pairing(
        &self,
        pairing: Pairing,
        sender: Option<&str>,
    ) -> Result<BatchResult, Error> {
        let batch_id = self.begin().await;
        if let Err(e) = pairing.ensure_ready() {
            return Err(self.reject(batch_id, e.into()).await);
        }
        self.run(batch_id, pairing.into_pairs(), sender).await
    }

    /// Dispatch explicit (recipient, message) items.
    pub async fn send_items(
        &self,
        pairs: Vec<Pair>,
        sender: Option<&str>,
    ) -> Result<BatchResult, Error> {
        let batch_id = self.begin().await;
        if pairs.is_empty() {
            return Err(self.reject(batch_id, InputError::InvalidItems.into()).await);
        }
        if pairs.len() > MAX_LIMIT {
            let err = InputError::TooManyItems {
                count: pairs.len(),
                max: MAX_LIMIT,
            };
            return Err(self.reject(batch_id, err.into()).await);
        }
        self.run(batch_id, pairs, sender).await
    }

    /// Take ownership of the session for a new batch, superseding any
    /// previous result.
    async fn begin(&self) -> Uuid {
        let batch_id = Uuid::new_v4();
        let mut state = self.state.write().await;
        state.phase = Phase::Validating;
        state.last_result = None;
        state.current = Some(batch_id);
        batch_id
    }

    async fn reject(&self, batch_id: Uuid, err: Error) -> Error {
        self.set_phase(batch_id, Phase::Rejected).await;
        info!(%batch_id, error = %err, "Dispatch rejected");
        err
    }

    /// Returns false when a newer batch or a reset has taken over.
    async fn set_phase(&self, batch_id: Uuid, phase: Phase) -> bool {
        let mut state = self.state.write().await;
        if !state.owned_by(batch_id) {
            return false;
        }
        state.phase = phase;
        true
    }

    async fn settle(&self, batch_id: Uuid, result: &BatchResult) -> bool {
        let mut state = self.state.write().await;
        if !state.owned_by(batch_id) {
            return false;
        }
        state.phase = Phase::Settled;
        state.last_result = Some(result.clone());
        true
    }

    async fn run(
        &self,
        batch_id: Uuid,
        pairs: Vec<Pair>,
        sender: Option<&str>,
    ) -> Result<BatchResult, Error> {
        if let Err(e) = self.gateway.check_ready() {
            return Err(self.reject(batch_id, e.into()).await);
        }

        let total = pairs.len();
        let span = info_span!("batch", %batch_id, total, gateway = self.gateway.name());

        async {
            info!(group_size = self.group_size, "Dispatch started");
            self.set_phase(batch_id, Phase::Dispatching).await;
            let outcomes =
                dispatch_all(self.gateway.as_ref(), &pairs, sender, self.group_size).await;

            self.set_phase(batch_id, Phase::Aggregating).await;
            match aggregate(outcomes, total) {
                Ok(result) => {
                    info!(sent = result.sent, failed = result.failed(), "Dispatch settled");
                    if !self.settle(batch_id, &result).await {
                        info!("Batch superseded; result not kept");
                    }
                    Ok(result)
                }
                Err(e) => {
                    error!(error = %e, "Dispatch outcomes failed reassembly");
                    self.set_phase(batch_id, Phase::Idle).await;
                    Err(Error::from(e))
                }
            }
        }
        .instrument(span)
        .await
    }
}
