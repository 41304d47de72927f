//! Background task runtime.
//!
//! # Component model
//!
//! A [`Component`] is any independently-runnable unit of the server: the
//! HTTP listener, the feed refresher. Components are constructed with their
//! shared state already captured inside them, then handed to
//! [`spawn_components`].
//!
//! [`spawn_components`] returns a [`RuntimeHandle`] that the caller can
//! `.await`. Any component error cancels the shared [`CancellationToken`]
//! so sibling components shut down too.

use std::future::Future;
use std::pin::Pin;

use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::AppError;

/// A boxed, owned future returned by [`Component::run`].
pub type ComponentFuture = Pin<Box<dyn Future<Output = Result<(), AppError>> + Send + 'static>>;

/// A self-contained, concurrently-runnable unit.
///
/// [`Component::run`] is called once by [`spawn_components`] and should run
/// until `shutdown` is cancelled or the component's own work is done.
pub trait Component: Send + 'static {
    /// Stable identifier used in log messages.
    fn id(&self) -> &str;

    /// Consume the component and return its run-loop as a boxed future.
    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture;
}

/// Handle to the running component set.
pub struct RuntimeHandle {
    inner: JoinHandle<Result<(), AppError>>,
}

impl RuntimeHandle {
    /// Await all components and return the first error, if any.
    pub async fn join(self) -> Result<(), AppError> {
        match self.inner.await {
            Ok(r) => r,
            Err(e) => Err(AppError::Server(format!("runtime task panicked: {e}"))),
        }
    }
}

/// Spawn each [`Component`] as an independent Tokio task.
///
/// If any component returns `Err` or panics, `shutdown` is cancelled and the
/// first error is returned once every component has exited.
pub fn spawn_components(
    components: Vec<Box<dyn Component>>,
    shutdown: CancellationToken,
) -> RuntimeHandle {
    let handle = tokio::spawn(async move {
        let mut set: JoinSet<Result<(), AppError>> = JoinSet::new();

        for component in components {
            let id = component.id().to_string();
            debug!(component = %id, "spawning component");
            let fut = component.run(shutdown.clone());
            set.spawn(async move {
                let result = fut.await;
                if result.is_ok() {
                    info!(component = %id, "component stopped");
                }
                result
            });
        }

        let mut first_err: Option<AppError> = None;

        while let Some(res) = set.join_next().await {
            match res {
                Err(e) => {
                    error!("component panicked: {e}");
                    shutdown.cancel();
                    first_err.get_or_insert_with(|| AppError::Server(format!("component panicked: {e}")));
                }
                Ok(Err(e)) => {
                    error!("component error: {e}");
                    shutdown.cancel();
                    first_err.get_or_insert(e);
                }
                Ok(Ok(())) => {}
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    });

    RuntimeHandle { inner: handle }
}
