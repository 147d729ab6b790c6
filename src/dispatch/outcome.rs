//! Per-pair outcomes and their reassembly into a batch result.

use serde::{Serialize, Serializer};

use crate::error::{AggregateError, GatewayError, GatewayErrorKind};
use crate::gateway::ProviderResponse;
use crate::pairing::Pair;

/// What happened to one pair.
#[derive(Debug, Clone)]
pub enum Delivery {
    Sent(ProviderResponse),
    Failed(GatewayError),
}

/// Outcome of dispatching one pair. Immutable once produced.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub index: usize,
    pub recipient: String,
    pub delivery: Delivery,
}

impl DispatchOutcome {
    pub fn from_result(pair: &Pair, result: Result<ProviderResponse, GatewayError>) -> Self {
        let delivery = match result {
            Ok(response) => Delivery::Sent(response),
            Err(error) => Delivery::Failed(error),
        };
        Self {
            index: pair.index,
            recipient: pair.recipient.clone(),
            delivery,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.delivery, Delivery::Sent(_))
    }

    pub fn error(&self) -> Option<&GatewayError> {
        match &self.delivery {
            Delivery::Failed(error) => Some(error),
            Delivery::Sent(_) => None,
        }
    }
}

#[derive(Serialize)]
struct OutcomeBody<'a> {
    index: usize,
    to: &'a str,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<&'a ProviderResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<GatewayErrorKind>,
}

impl Serialize for DispatchOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = match &self.delivery {
            Delivery::Sent(response) => OutcomeBody {
                index: self.index,
                to: &self.recipient,
                ok: true,
                response: Some(response),
                error: None,
                kind: None,
            },
            Delivery::Failed(error) => OutcomeBody {
                index: self.index,
                to: &self.recipient,
                ok: false,
                response: None,
                error: Some(error.report()),
                kind: Some(error.kind),
            },
        };
        body.serialize(serializer)
    }
}

/// Summary of one dispatch invocation, results in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub total: usize,
    #[serde(rename = "enviados")]
    pub sent: usize,
    #[serde(rename = "resultados")]
    pub results: Vec<DispatchOutcome>,
}

impl BatchResult {
    pub fn failed(&self) -> usize {
        self.total - self.sent
    }
}

/// Restore input order and count successes.
///
/// Every index in `0..total_pairs` must appear exactly once; anything else means
/// the dispatch stage lost or duplicated a pair.
pub fn aggregate(
    mut outcomes: Vec<DispatchOutcome>,
    total_pairs: usize,
) -> Result<BatchResult, AggregateError> {
    if outcomes.len() != total_pairs {
        return Err(AggregateError::CountMismatch {
            expected: total_pairs,
            actual: outcomes.len(),
        });
    }

    let mut seen = vec![false; total_pairs];
    for outcome in &outcomes {
        let slot = seen
            .get_mut(outcome.index)
            .ok_or(AggregateError::IndexOutOfRange {
                index: outcome.index,
                total: total_pairs,
            })?;
        if *slot {
            return Err(AggregateError::DuplicateIndex {
                index: outcome.index,
            });
        }
        *slot = true;
    }

    outcomes.sort_by_key(|o| o.index);
    let sent = outcomes.iter().filter(|o| o.is_ok()).count();

    Ok(BatchResult {
        total: total_pairs,
        sent,
        results: outcomes,
    })
}
