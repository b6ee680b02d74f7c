pub mod bytes_message;
pub mod call_data;
pub mod handshake;
pub mod ping_pong;
pub mod receipt;
pub mod transaction;
