//! Bounded-concurrency fan-out of pairs to a gateway.
//!
//! Pairs are split into fixed-size groups. Sends inside a group are polled
//! together on the caller's task; the next group starts only once every send of
//! the current one has settled. Each send yields its own outcome, so a failure
//! never reaches the sibling sends.

use futures::future::join_all;
use tracing::{debug, warn};

use super::outcome::DispatchOutcome;
use crate::gateway::SmsGateway;
use crate::pairing::Pair;

/// Send every pair through `gateway`, `group_size` at a time.
///
/// Outcomes come back in dispatch order, one per pair. A `group_size` of zero
/// is treated as one.
pub async fn dispatch_all(
    gateway: &dyn SmsGateway,
    pairs: &[Pair],
    sender: Option<&str>,
    group_size: usize,
) -> Vec<DispatchOutcome> {
    let group_size = group_size.max(1);
    let mut outcomes = Vec::with_capacity(pairs.len());

    for (group, chunk) in pairs.chunks(group_size).enumerate() {
        debug!(group, size = chunk.len(), "Dispatching group");
        let sends = chunk
            .iter()
            .map(|pair| dispatch_one(gateway, pair, sender));
        outcomes.extend(join_all(sends).await);
    }

    outcomes
}

async fn dispatch_one(
    gateway: &dyn SmsGateway,
    pair: &Pair,
    sender: Option<&str>,
) -> DispatchOutcome {
    let result = gateway.send(&pair.recipient, &pair.message, sender).await;
    match &result {
        Ok(_) => debug!(index = pair.index, gateway = gateway.name(), "SMS sent"),
        Err(e) => warn!(
            index = pair.index,
            gateway = gateway.name(),
            kind = %e.kind,
            local = e.kind.is_local(),
            status = ?e.status,
            error = %e,
            "SMS send failed"
        ),
    }
    DispatchOutcome::from_result(pair, result)
}
