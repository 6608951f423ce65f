//! Per-façade re-entrancy guard: one action in flight at a time. A trigger
//! that arrives while another is pending is turned away before it issues a
//! request or touches the loading slot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const BUSY_MESSAGE: &str = "Please wait for the current request to finish.";

#[derive(Debug, Default, Clone)]
pub struct InFlight(Arc<AtomicBool>);

impl InFlight {
    /// Claims the façade, or `None` when another action holds it.
    pub fn try_begin(&self) -> Option<InFlightToken> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightToken(Arc::clone(&self.0)))
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[must_use = "the façade is released as soon as the token is dropped"]
#[derive(Debug)]
pub struct InFlightToken(Arc<AtomicBool>);

impl Drop for InFlightToken {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_claim_is_refused_until_release() {
        let flight = InFlight::default();
        let token = flight.try_begin().expect("first claim");
        assert!(flight.is_busy());
        assert!(flight.try_begin().is_none());
        drop(token);
        assert!(!flight.is_busy());
        assert!(flight.try_begin().is_some());
    }
}
