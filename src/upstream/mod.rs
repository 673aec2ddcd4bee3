//! Upstream web application access
//!
//! The [`Transport`] trait is the seam between the engine and the network;
//! [`ReqwestTransport`] is the production implementation.

pub mod client;
pub mod sse;
pub mod transport;
pub mod wire;

pub use client::ReqwestTransport;
pub use sse::{SseDecoder, SseFrame};
pub use transport::{ByteStream, Transport};
