//! Named side-effecting actions attached to transitions.
//!
//! Actions are how the engine calls out to external collaborators:
//! persistence writes, job enqueues, notification dispatch. The engine
//! never interprets what an action does; it only sequences them around the
//! commit point. Before-actions run before commit and abort the transition
//! on failure. After-actions run strictly after the commit is durable and
//! can no longer roll it back.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;
use thiserror::Error;

type ActionFn<C> = Arc<dyn for<'a> Fn(&'a C) -> BoxFuture<'a, anyhow::Result<()>> + Send + Sync>;

/// Failure raised by a named action.
///
/// Whether this aborts the transition depends on where the action sits:
/// a before-action failure surfaces as `FireError::BeforeAction` with the
/// state unchanged; an after-action failure rides back in
/// `FireReport::after_failures` with the state already committed.
#[derive(Debug, Error)]
#[error("Action '{action}' failed: {source}")]
pub struct ActionFailure {
    /// Name the action was registered under.
    pub action: String,
    /// Collaborator error, unchanged.
    #[source]
    pub source: anyhow::Error,
}

/// A named side-effecting operation taking the caller's context.
///
/// The name identifies the action in error reports and logs, which is what
/// lets a caller decide between retry and compensation when a follow-up
/// fails.
///
/// # Example
///
/// ```rust
/// use turnstile::core::Action;
///
/// struct Mailer {
///     outbox: std::sync::Mutex<Vec<String>>,
/// }
///
/// let notify = Action::new("notify_investor", |m: &Mailer| {
///     m.outbox.lock().unwrap().push("deposit settled".to_string());
///     Ok(())
/// });
///
/// let mailer = Mailer { outbox: Default::default() };
/// futures::executor::block_on(notify.run(&mailer)).unwrap();
/// assert_eq!(mailer.outbox.lock().unwrap().len(), 1);
/// ```
pub struct Action<C> {
    name: String,
    run: ActionFn<C>,
}

impl<C> Action<C> {
    /// Create an action from a synchronous closure.
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&C) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Action {
            name: name.into(),
            run: Arc::new(move |ctx| ready_result(f(ctx))),
        }
    }

    /// Create an action from an asynchronous closure.
    ///
    /// The closure returns a boxed future borrowing the context; this is
    /// the shape to use for actions that enqueue jobs, write through a
    /// repository, or fire events on other machines.
    ///
    /// # Example
    ///
    /// ```rust
    /// use futures::FutureExt;
    /// use turnstile::core::Action;
    ///
    /// struct Jobs;
    ///
    /// impl Jobs {
    ///     async fn enqueue(&self, _job: &str) -> anyhow::Result<()> {
    ///         Ok(())
    ///     }
    /// }
    ///
    /// let enqueue = Action::new_async("enqueue_transfer", |jobs: &Jobs| {
    ///     async move { jobs.enqueue("transfer").await }.boxed()
    /// });
    /// futures::executor::block_on(enqueue.run(&Jobs)).unwrap();
    /// ```
    pub fn new_async<F>(name: impl Into<String>, f: F) -> Self
    where
        F: for<'a> Fn(&'a C) -> BoxFuture<'a, anyhow::Result<()>> + Send + Sync + 'static,
    {
        Action {
            name: name.into(),
            run: Arc::new(f),
        }
    }

    /// Name the action was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute the action, wrapping any collaborator error with the
    /// action's name.
    pub async fn run(&self, ctx: &C) -> Result<(), ActionFailure> {
        (self.run)(ctx).await.map_err(|source| ActionFailure {
            action: self.name.clone(),
            source,
        })
    }
}

impl<C> Clone for Action<C> {
    fn clone(&self) -> Self {
        Action {
            name: self.name.clone(),
            run: Arc::clone(&self.run),
        }
    }
}

fn ready_result<'a>(result: anyhow::Result<()>) -> BoxFuture<'a, anyhow::Result<()>> {
    futures::future::ready(result).boxed()
}
