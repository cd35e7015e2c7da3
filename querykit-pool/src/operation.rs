//! Deferred units of work.

use std::future::Future;

use futures::future::BoxFuture;

use crate::error::BoxError;

/// A boxed unit of work that may fail.
///
/// Nothing runs until a worker polls it.
pub type Operation = BoxFuture<'static, Result<(), BoxError>>;

/// Box any fallible future as an [`Operation`].
pub fn operation<F, E>(future: F) -> Operation
where
    F: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<BoxError>,
{
    Box::pin(async move { future.await.map_err(Into::into) })
}
