//! Resilient chat-completion call layer.
//!
//! Issues a single logical request against an OpenAI-style chat endpoint,
//! bounds it with a deadline, classifies whatever failure occurs into a fixed
//! taxonomy, and retries transparently when the classification says the
//! failure is transient. Callers hand in parameters plus an optional error
//! callback and get back a uniform [`Outcome`]; raw failures never cross the
//! boundary.

pub mod classify;
pub mod client;
pub mod errors;
pub mod executor;
pub mod retry;
pub mod transport;
pub mod types;

pub use classify::*;
pub use client::*;
pub use errors::*;
pub use executor::*;
pub use retry::*;
pub use transport::*;
pub use types::*;
