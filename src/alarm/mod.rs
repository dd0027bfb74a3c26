//! Alarm storage.
//!
//! - [`heap`]: Fixed-capacity binary min-heap
//! - [`registry`]: Heap of deadlines plus pending/expired counters

pub mod heap;
pub mod registry;

pub use heap::MinHeap;
pub use registry::{AlarmCounts, AlarmRegistry, DEFAULT_CAPACITY};
