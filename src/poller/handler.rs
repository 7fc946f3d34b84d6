//! Sample delivery.
//!
//! A [`PollHandler`] receives one call per variable retrieved. Handlers are
//! injected at poller construction; a handler error is logged and the
//! remaining samples of the batch still arrive.

use std::time::SystemTime;

use crate::varbind::VarBind;

/// Error a handler may return for a single sample.
///
/// Returning an error never aborts the poll cycle; the poller logs it and
/// moves on to the next binding.
pub type SampleError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Receives retrieved variables.
///
/// `at` is the observation timestamp: when the datagram carrying the value
/// arrived, shared by every binding decoded from that datagram.
pub trait PollHandler: Send {
    /// Called once per successfully retrieved variable.
    fn on_sample(&mut self, varbind: VarBind, at: SystemTime) -> Result<(), SampleError>;
}

/// Handler that discards every sample.
///
/// Useful when only the side effects of polling matter (reachability
/// probing) or as a placeholder during wiring.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopHandler;

impl PollHandler for NopHandler {
    fn on_sample(&mut self, _varbind: VarBind, _at: SystemTime) -> Result<(), SampleError> {
        Ok(())
    }
}

impl<F> PollHandler for F
where
    F: FnMut(VarBind, SystemTime) -> Result<(), SampleError> + Send,
{
    fn on_sample(&mut self, varbind: VarBind, at: SystemTime) -> Result<(), SampleError> {
        self(varbind, at)
    }
}
