use crate::networking::correlator::RequestKind;
use crate::networking::message_type::MessageType;
use thiserror::Error;

/// Errors surfaced by the session layer.
///
/// Transport, protocol and correlation failures that happen inside the socket
/// reader never reach a caller directly. They are logged and the frame is
/// dropped. Callers of the request operations only ever see the variants that
/// settle their own future.
#[derive(Debug, Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("connection lost")]
    ConnectionLost,

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(#[source] prost::DecodeError),

    #[error("malformed {message_type} payload: {source}")]
    MalformedPayload {
        message_type: MessageType,
        #[source]
        source: prost::DecodeError,
    },

    #[error("unknown message type {0:?}")]
    UnknownMessageType(String),

    #[error("{0} request was answered with a different response type")]
    UnexpectedResponse(RequestKind),

    #[error("{kind} request timed out after {} seconds", .after.as_secs())]
    Timeout {
        kind: RequestKind,
        after: std::time::Duration,
    },

    #[error("websocket is not connected or handshake has not completed")]
    NotConnected,

    #[error("a {0} request is already in progress")]
    RequestInFlight(RequestKind),

    #[error("{0} request was superseded by a newer one")]
    Superseded(RequestKind),

    /// The reason as logged when the session closed, e.g. a node address
    /// other than the configured `server_address`.
    #[error("{0}")]
    HandshakeRejected(String),

    #[error("signing error: {0}")]
    Crypto(#[from] secp256k1::Error),

    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("input of {len} bytes exceeds {max} bytes")]
    IntegerOverflow { len: usize, max: usize },

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
