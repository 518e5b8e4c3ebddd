/// Error taxonomy for the detection core.
///
/// Most abnormal conditions are deliberately not errors: malformed
/// observations are dropped by the classifier (counted in a diagnostic
/// counter), and capacity eviction is an expected, logged transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The queried key was evicted or never existed. Recoverable: the
    /// caller refetches the list view.
    NotFound,
    /// A threshold write was outside its documented valid range. The
    /// value never reaches runtime state.
    ConfigOutOfRange,
    /// An ingest arrived after `shutdown()`. A programmer error in the
    /// integration: producers must be stopped and drained before the
    /// store is reclaimed.
    ProducerStillActive,
}
