/// Errors that can occur in the transport layer.
///
/// The game engine treats every one of these on the read side as a
/// disconnect, so the variants exist mostly for logging.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer (or our own close frame) already ended the connection.
    #[error("connection closed")]
    Closed,

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting TCP connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// The TCP connection was accepted but the WebSocket upgrade failed.
    #[error("upgrade failed: {0}")]
    UpgradeFailed(String),
}
