//! Line pairing: zips a block of recipients with a block of commands by position.

use serde::Serialize;

use crate::error::InputError;

/// Smallest accepted send limit.
pub const MIN_LIMIT: usize = 1;
/// Largest accepted send limit.
pub const MAX_LIMIT: usize = 5000;
/// Limit used when the caller does not supply one.
pub const DEFAULT_LIMIT: usize = 50;
/// Number of pairs the panel shows in its preview table.
pub const PREVIEW_LEN: usize = 5;

/// One recipient matched by position to one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pair {
    pub index: usize,
    #[serde(rename = "to")]
    pub recipient: String,
    pub message: String,
}

impl Pair {
    pub fn new(index: usize, recipient: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            index,
            recipient: recipient.into(),
            message: message.into(),
        }
    }
}

/// Which side is short, and by how many lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "missing", content = "count", rename_all = "snake_case")]
pub enum Shortfall {
    Commands(usize),
    Recipients(usize),
}

/// Result of pairing two raw blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    pub pairs: Vec<Pair>,
    pub total_recipients: usize,
    pub total_commands: usize,
    pub is_balanced: bool,
}

impl Pairing {
    /// `None` when both sides have the same number of lines.
    pub fn shortfall(&self) -> Option<Shortfall> {
        use std::cmp::Ordering;
        match self.total_recipients.cmp(&self.total_commands) {
            Ordering::Greater => Some(Shortfall::Commands(
                self.total_recipients - self.total_commands,
            )),
            Ordering::Less => Some(Shortfall::Recipients(
                self.total_commands - self.total_recipients,
            )),
            Ordering::Equal => None,
        }
    }

    pub fn preview(&self, len: usize) -> &[Pair] {
        &self.pairs[..self.pairs.len().min(len)]
    }

    /// Gate for dispatch: both sides non-empty and of equal length.
    pub fn ensure_ready(&self) -> Result<(), InputError> {
        if self.total_recipients == 0 && self.total_commands == 0 {
            return Err(InputError::Empty);
        }
        if !self.is_balanced || self.pairs.is_empty() {
            return Err(InputError::Unbalanced {
                recipients: self.total_recipients,
                commands: self.total_commands,
            });
        }
        Ok(())
    }

    pub fn into_pairs(self) -> Vec<Pair> {
        self.pairs
    }
}

/// Split text into trimmed, non-empty lines, keeping their order.
pub fn parse_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Clamp a requested limit into `[MIN_LIMIT, MAX_LIMIT]`.
pub fn clamp_limit(limit: i64) -> usize {
    limit.clamp(MIN_LIMIT as i64, MAX_LIMIT as i64) as usize
}

/// Pair recipients with commands by position, up to `limit` pairs.
///
/// Pairs are produced even when the two sides differ in length, so a preview can
/// be shown while the input is being fixed; use [`Pairing::ensure_ready`] before
/// dispatching.
pub fn pair(recipients_text: &str, commands_text: &str, limit: i64) -> Pairing {
    let recipients = parse_lines(recipients_text);
    let commands = parse_lines(commands_text);

    let total_recipients = recipients.len();
    let total_commands = commands.len();
    let count = total_recipients.min(total_commands).min(clamp_limit(limit));

    let pairs = recipients
        .iter()
        .zip(commands.iter())
        .take(count)
        .enumerate()
        .map(|(index, (to, message))| Pair::new(index, *to, *message))
        .collect();

    Pairing {
        pairs,
        total_recipients,
        total_commands,
        is_balanced: total_recipients == total_commands && total_recipients > 0,
    }
}
