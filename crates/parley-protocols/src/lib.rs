//! Protocol scenarios on the Parley agent runtime.
//!
//! Each module builds an [`Environment`](parley_core::Environment) with fixed
//! agent names, wires the links the protocol needs and returns the collected
//! per-agent outcomes.
//!
//! - [`exchange`]: repeated AEAD request/reply between two parties
//! - [`relay`]: bulk payload checked by a digest relayed through a third party
//! - [`oneshot`]: single RSA-OAEP message to a key holder
//!
//! Every module exposes `environment(..)` to build without starting (so
//! callers can install interceptors), `collect(env)` to run a prepared
//! environment, and `run(..)` for both at once.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod wire;

pub mod exchange;
pub mod oneshot;
pub mod relay;

pub use error::ProtocolError;
