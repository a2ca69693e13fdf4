//! Token record model and expiry math.

pub mod record;

pub use record::{EpochMillis, TokenPayload, TokenRecord, TokenStatus};
