//! Troupe A2A wire protocol.
//!
//! The message envelope shape, its exhaustive validator, and the JSON-RPC
//! response plumbing used by the A2A HTTP surface. Everything here is pure
//! and transport-agnostic.

pub mod envelope;
pub mod rpc;

pub use envelope::{
    EnvelopeReport, EnvelopeValidationError, EnvelopeViolation, JSONRPC_VERSION, MessageEnvelope,
    validate_envelope,
};
pub use rpc::{RpcError, RpcResponse, error_codes};
