//! Batch dispatch: fan-out, reassembly and the per-batch session.

pub mod batcher;
pub mod outcome;
pub mod session;

pub use batcher::dispatch_all;
pub use outcome::{BatchResult, Delivery, DispatchOutcome, aggregate};
pub use session::{DispatchSession, Phase};
