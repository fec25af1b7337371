pub mod aggregator;
pub mod config;
#[cfg(feature = "runtime")]
pub mod db;
pub mod distance;
pub mod error;
pub mod invocation;
pub mod order_type;
pub mod pipeline;
pub mod report;
pub mod segments;
pub mod source;
pub mod timezone;
