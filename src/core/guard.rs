//! Guard predicates for controlling state transitions.
//!
//! Guards decide whether a candidate transition may execute. They are
//! predicates over the caller's context: they must not mutate machine
//! state, but they may read external state (balances, sibling machines)
//! and therefore may suspend.

use futures::future::{ready, BoxFuture};
use futures::FutureExt;
use std::sync::Arc;

type GuardFn<C> = Arc<dyn for<'a> Fn(&'a C) -> BoxFuture<'a, bool> + Send + Sync>;

/// Predicate that determines whether a transition candidate is selected.
///
/// Candidates for a `(state, event)` pair are tried in declaration order;
/// the first whose guard passes wins. Guards are evaluated before commit
/// and never after it.
///
/// # Example
///
/// ```rust
/// use turnstile::core::Guard;
///
/// struct Deposit {
///     amount_cents: i64,
/// }
///
/// let non_zero = Guard::new(|d: &Deposit| d.amount_cents > 0);
///
/// let accepted = futures::executor::block_on(
///     non_zero.check(&Deposit { amount_cents: 10_000 }),
/// );
/// assert!(accepted);
/// ```
pub struct Guard<C> {
    run: GuardFn<C>,
}

impl<C> Guard<C> {
    /// Create a guard from a synchronous predicate.
    ///
    /// The predicate must not mutate machine state and must be thread-safe
    /// (`Send + Sync`). This is the common case: a cheap check over data the
    /// caller already holds.
    ///
    /// # Example
    ///
    /// ```rust
    /// use turnstile::core::Guard;
    ///
    /// struct Ledger {
    ///     pending: usize,
    /// }
    ///
    /// let drained = Guard::new(|l: &Ledger| l.pending == 0);
    /// assert!(futures::executor::block_on(drained.check(&Ledger { pending: 0 })));
    /// assert!(!futures::executor::block_on(drained.check(&Ledger { pending: 3 })));
    /// ```
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        Guard {
            run: Arc::new(move |ctx| ready(predicate(ctx)).boxed()),
        }
    }

    /// Create a guard from an asynchronous predicate.
    ///
    /// Use this when the check must read external state, e.g. an aggregate
    /// guard reading linked child machines. The closure returns a boxed
    /// future borrowing the context.
    ///
    /// # Example
    ///
    /// ```rust
    /// use futures::FutureExt;
    /// use turnstile::core::Guard;
    ///
    /// struct Accounts {
    ///     cleared: bool,
    /// }
    ///
    /// impl Accounts {
    ///     async fn all_cleared(&self) -> bool {
    ///         self.cleared
    ///     }
    /// }
    ///
    /// let guard = Guard::new_async(|a: &Accounts| {
    ///     async move { a.all_cleared().await }.boxed()
    /// });
    /// assert!(futures::executor::block_on(guard.check(&Accounts { cleared: true })));
    /// ```
    pub fn new_async<F>(predicate: F) -> Self
    where
        F: for<'a> Fn(&'a C) -> BoxFuture<'a, bool> + Send + Sync + 'static,
    {
        Guard {
            run: Arc::new(predicate),
        }
    }

    /// Evaluate the guard against the caller's context.
    ///
    /// Evaluation has no effect on machine state regardless of outcome.
    pub async fn check(&self, ctx: &C) -> bool {
        (self.run)(ctx).await
    }
}

impl<C> Clone for Guard<C> {
    fn clone(&self) -> Self {
        Guard {
            run: Arc::clone(&self.run),
        }
    }
}
