//! Database driver implementations.
//!
//! - [`oracle`]: [`QueryEngine`](crate::core::traits::QueryEngine) over the
//!   `oracle` crate, gated by the `oracle` feature (on by default)
//!
//! The schema layer never names a driver type directly; tests substitute an
//! in-memory engine.

#[cfg(feature = "oracle")]
pub mod oracle;

#[cfg(feature = "oracle")]
pub use self::oracle::OracleEngine;
