//! Exposes desktop control readiness across a process boundary.

pub mod client;
pub mod router;
pub mod transport;

pub use client::{fallback_snapshot, ReadinessClient, IPC_INVALID_RESPONSE, IPC_INVOKE_FAILED};
pub use router::{
    BridgeError, BridgeRouter, Operation, ReadinessRequest, READINESS_ALIASES, READINESS_REQUEST,
};
pub use transport::{channel, serve, BridgeRequest, ChannelTransport, Transport, TransportError};
