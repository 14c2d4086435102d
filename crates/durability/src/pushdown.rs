//! Request-scoped predicate binding for engine push-down.
//!
//! Each `filter`/`exclude` call builds one [`PushdownContext`] and moves it
//! into the scalar function registered on the calling thread's connection.
//! Predicate state therefore lives on the call stack of the current
//! operation, never on the store instance, so nothing needs clearing after
//! the query beyond unregistering the function.

use std::panic::RefUnwindSafe;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

use litestore_core::{Error, PredicateSet, RecordCodec, Result};

/// Marker returned when evaluation inside the engine scan failed; the typed
/// error is parked in the context's failure slot for the query path.
pub(crate) struct PushdownAborted;

/// Everything one push-down call binds to the engine callback: the
/// predicate conjunction, the codec, the binding thread, and a slot for the
/// first failure raised during the scan.
pub(crate) struct PushdownContext<V> {
    predicates: PredicateSet<V>,
    codec: Arc<dyn RecordCodec<V>>,
    bound_by: ThreadId,
    failure: Mutex<Option<Error>>,
}

// The engine catches callback panics at the FFI boundary, and the only
// interior state here is the mutex-guarded failure slot, which a panic
// cannot leave torn.
impl<V> RefUnwindSafe for PushdownContext<V> {}

impl<V> PushdownContext<V> {
    pub(crate) fn new(predicates: PredicateSet<V>, codec: Arc<dyn RecordCodec<V>>) -> Arc<Self> {
        Arc::new(Self {
            predicates,
            codec,
            bound_by: thread::current().id(),
            failure: Mutex::new(None),
        })
    }

    /// Decode one stored row and evaluate the bound predicate conjunction.
    ///
    /// Called by the engine for every row of the scan.
    pub(crate) fn matches(&self, raw: &[u8]) -> std::result::Result<bool, PushdownAborted> {
        match self.evaluate(raw) {
            Ok(hit) => Ok(hit),
            Err(err) => {
                let mut slot = self.failure.lock();
                if slot.is_none() {
                    *slot = Some(err);
                }
                Err(PushdownAborted)
            }
        }
    }

    fn evaluate(&self, raw: &[u8]) -> Result<bool> {
        // Function bindings are connection-scoped and connections are
        // thread-affine: the callback running anywhere but the binding
        // thread means the instance lock was bypassed.
        let current = thread::current().id();
        if current != self.bound_by {
            return Err(Error::ConcurrencyInvariant(format!(
                "push-down callback ran on {current:?} but was bound by {:?}",
                self.bound_by
            )));
        }

        let record = self.codec.decode(raw)?;
        self.predicates.matches(&record)
    }

    /// The typed failure recorded during the scan, if any; otherwise the
    /// engine's own error mapped into the store taxonomy.
    pub(crate) fn failure_or_engine(&self, err: rusqlite::Error) -> Error {
        self.failure
            .lock()
            .take()
            .unwrap_or_else(|| Error::engine(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use litestore_core::{BincodeCodec, FalliblePredicate};

    fn context(predicates: PredicateSet<u64>) -> Arc<PushdownContext<u64>> {
        PushdownContext::new(predicates, Arc::new(BincodeCodec::new()))
    }

    fn encode(value: u64) -> Vec<u8> {
        BincodeCodec::new().encode(&value).unwrap()
    }

    #[test]
    fn test_empty_set_matches_every_row() {
        let ctx = context(PredicateSet::all());
        assert!(ctx.matches(&encode(9)).unwrap_or(false));
    }

    #[test]
    fn test_conjunction_applied_to_decoded_record() {
        let ctx = context(
            PredicateSet::all()
                .with(|n: &u64| *n > 10)
                .with(|n: &u64| n % 2 == 0),
        );
        assert!(ctx.matches(&encode(12)).unwrap_or(false));
        assert!(!ctx.matches(&encode(11)).unwrap_or(true));
    }

    #[test]
    fn test_undecodable_row_parks_decoding_error() {
        let ctx = context(PredicateSet::all());
        assert!(ctx.matches(&[0xFF; 2]).is_err());

        let err = ctx.failure_or_engine(rusqlite::Error::InvalidQuery);
        assert!(matches!(err, Error::Decoding(_)));
    }

    #[test]
    fn test_predicate_failure_parks_predicate_error() {
        let ctx = context(PredicateSet::all().with(FalliblePredicate::new(|_: &u64| {
            Err(Error::predicate("no verdict"))
        })));
        assert!(ctx.matches(&encode(1)).is_err());

        let err = ctx.failure_or_engine(rusqlite::Error::InvalidQuery);
        assert!(matches!(err, Error::Predicate(_)));
    }

    #[test]
    fn test_first_failure_wins() {
        let ctx = context(PredicateSet::all());
        let _ = ctx.matches(&[0xFF; 2]);
        let _ = ctx.matches(&[0xAB; 3]);

        // Only one parked failure; the second take sees the engine error.
        assert!(matches!(
            ctx.failure_or_engine(rusqlite::Error::InvalidQuery),
            Error::Decoding(_)
        ));
        assert!(matches!(
            ctx.failure_or_engine(rusqlite::Error::InvalidQuery),
            Error::Engine(_)
        ));
    }
}
