use crate::{
    metrics::Accumulator,
    GatherErrors,
};
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
};

/// Trait for gathering metrics into an accumulator
pub trait Collector: Send + Sync {
    /// Run one gather cycle, emitting every record into `acc`
    fn gather(&self, acc: Arc<dyn Accumulator>) -> Pin<Box<dyn Future<Output = Result<(), GatherErrors>> + Send + '_>>;

    /// Get the name of this collector
    fn name(&self) -> &'static str;

    /// One-line description of what this collector reads
    fn description(&self) -> &'static str;
}
