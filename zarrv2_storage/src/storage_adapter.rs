//! Storage adapters which wrap an underlying store.

pub mod performance_metrics;

#[cfg(feature = "async")]
pub mod sync_to_async;
