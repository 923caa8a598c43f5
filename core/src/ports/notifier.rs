//! Change notification port (interface).

/// Hook invoked by a worker after each status table write.
///
/// Carries no payload: a renderer reacts by re-reading the table snapshot.
/// Implementations must be cheap and must not block, since they run inline
/// on the worker's task.
pub trait ChangeNotifier: Send + Sync {
    /// Signal that some entry of the status table changed.
    fn notify(&self);
}

impl<F> ChangeNotifier for F
where
    F: Fn() + Send + Sync,
{
    fn notify(&self) {
        self()
    }
}
