//! Predicates: boolean tests over decoded records.
//!
//! A predicate is supplied per call and never stored beyond the call's
//! duration. Plain closures work directly through a blanket impl; tests
//! that can themselves fail implement [`Predicate`] (or wrap a fallible
//! closure in [`FalliblePredicate`]) and surface
//! [`Error::Predicate`](crate::Error::Predicate).
//!
//! [`PredicateSet`] is the per-call container used by the durable backend:
//! it is moved into the engine callback at registration time, so predicate
//! state is request-scoped rather than shared on the store instance.

use crate::error::Result;

/// Boolean test over a decoded record.
///
/// Predicates must be pure with respect to shared state: they may capture
/// data, but must never mutate the store they are being evaluated against.
pub trait Predicate<V>: Send + Sync {
    /// Evaluate this predicate against a single record.
    fn eval(&self, record: &V) -> Result<bool>;
}

impl<V, F> Predicate<V> for F
where
    F: Fn(&V) -> bool + Send + Sync,
{
    fn eval(&self, record: &V) -> Result<bool> {
        Ok(self(record))
    }
}

/// Adapter turning a fallible closure into a [`Predicate`].
///
/// ```
/// use litestore_core::{Error, FalliblePredicate, Predicate};
///
/// let positive = FalliblePredicate::new(|n: &i64| {
///     if *n == 0 {
///         Err(Error::predicate("zero is neither"))
///     } else {
///         Ok(*n > 0)
///     }
/// });
///
/// assert!(positive.eval(&5).unwrap());
/// assert!(positive.eval(&0).is_err());
/// ```
pub struct FalliblePredicate<F>(F);

impl<F> FalliblePredicate<F> {
    /// Wrap a `Fn(&V) -> Result<bool>` closure.
    pub fn new(test: F) -> Self {
        Self(test)
    }
}

impl<V, F> Predicate<V> for FalliblePredicate<F>
where
    F: Fn(&V) -> Result<bool> + Send + Sync,
{
    fn eval(&self, record: &V) -> Result<bool> {
        (self.0)(record)
    }
}

/// Per-call predicate container with conjunction semantics.
///
/// A record matches when **all** contained predicates hold; the empty set
/// matches everything. Built with [`PredicateSet::all`] and
/// [`PredicateSet::with`], or converted from a single predicate via `From`.
pub struct PredicateSet<V> {
    predicates: Vec<Box<dyn Predicate<V>>>,
}

impl<V> PredicateSet<V> {
    /// The empty set: matches every record.
    pub fn all() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    /// Add a predicate to the conjunction.
    pub fn with(mut self, predicate: impl Predicate<V> + 'static) -> Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    /// Number of predicates in the set.
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// True when the set contains no predicates (matches everything).
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Evaluate the conjunction against a record.
    ///
    /// Short-circuits on the first non-match; the first predicate failure
    /// aborts evaluation.
    pub fn matches(&self, record: &V) -> Result<bool> {
        for predicate in &self.predicates {
            if !predicate.eval(record)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<V> Default for PredicateSet<V> {
    fn default() -> Self {
        Self::all()
    }
}

impl<V> std::fmt::Debug for PredicateSet<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredicateSet")
            .field("len", &self.predicates.len())
            .finish()
    }
}

impl<V, F> From<F> for PredicateSet<V>
where
    F: Fn(&V) -> bool + Send + Sync + 'static,
{
    fn from(predicate: F) -> Self {
        Self::all().with(predicate)
    }
}

impl<V, F> From<FalliblePredicate<F>> for PredicateSet<V>
where
    F: Fn(&V) -> Result<bool> + Send + Sync + 'static,
{
    fn from(predicate: FalliblePredicate<F>) -> Self {
        Self::all().with(predicate)
    }
}
