//! Deferred work that eventually produces screen messages.

use std::future::Future;

use futures::future::{self, BoxFuture, FutureExt};

/// A set of futures, each resolving to one message for the screen that
/// created it. Screens return these instead of awaiting anything themselves.
pub struct Task<M> {
    futures: Vec<BoxFuture<'static, M>>,
}

impl<M: Send + 'static> Task<M> {
    pub fn none() -> Self {
        Self {
            futures: Vec::new(),
        }
    }

    /// Run `future` and map its output into a message.
    pub fn perform<T, F>(future: F, f: impl FnOnce(T) -> M + Send + 'static) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self {
            futures: vec![future.map(f).boxed()],
        }
    }

    /// Deliver `message` after `delay`.
    pub fn after(delay: std::time::Duration, message: M) -> Self {
        Self::perform(tokio::time::sleep(delay), move |()| message)
    }

    pub fn batch(tasks: impl IntoIterator<Item = Task<M>>) -> Self {
        Self {
            futures: tasks.into_iter().flat_map(|t| t.futures).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.futures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.futures.is_empty()
    }

    pub fn into_futures(self) -> Vec<BoxFuture<'static, M>> {
        self.futures
    }

    /// Await every future and return the messages in task order.
    pub async fn collect(self) -> Vec<M> {
        future::join_all(self.futures).await
    }
}

impl<M> std::fmt::Debug for Task<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("futures", &self.futures.len())
            .finish()
    }
}
