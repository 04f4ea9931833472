//! Payment streams drawn from a sender's accrual.
//!
//! A stream pays `rate_per_second` from its sender to its recipient over
//! `[start_time, stop_time]`. Accrual freezes at `stop_time`; expired
//! streams stay queryable forever. Streams are created once and only ever
//! mutated by withdrawals and by the sender's consolidation (`debited`).

pub mod error;
pub mod registry;
pub mod stream;

pub use error::StreamError;
pub use registry::{SenderContext, StreamRegistry};
pub use stream::{CreateStream, Stream, StreamId};
