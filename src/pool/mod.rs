//! Thread pool and worker implementations

pub mod thread_pool;

pub(crate) mod shared;
pub(crate) mod worker;

pub use thread_pool::{ThreadPool, ThreadPoolConfig};
