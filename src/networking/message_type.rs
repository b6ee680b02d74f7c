use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// Discriminant carried in every message header. It selects both the payload
/// schema and, for responses, the correlator slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Ping,
    Pong,
    PeerList,

    HandshakeInit,
    HandshakeAck,
    HandshakeConfirm,

    SendTransaction,

    CallSmartContract,
    CallResult,

    GetBalance,
    Balance,

    GetNonce,
    Nonce,

    GetReceipt,
    Receipt,

    GetReceipts,
    Receipts,

    GetValidators,
    Validators,

    GetHeadBlock,
    HeadBlock,

    GetBlock,
    Block,

    TxMined,

    ChainEvent,
}

impl MessageType {
    pub const ALL: [MessageType; 25] = [
        MessageType::Ping,
        MessageType::Pong,
        MessageType::PeerList,
        MessageType::HandshakeInit,
        MessageType::HandshakeAck,
        MessageType::HandshakeConfirm,
        MessageType::SendTransaction,
        MessageType::CallSmartContract,
        MessageType::CallResult,
        MessageType::GetBalance,
        MessageType::Balance,
        MessageType::GetNonce,
        MessageType::Nonce,
        MessageType::GetReceipt,
        MessageType::Receipt,
        MessageType::GetReceipts,
        MessageType::Receipts,
        MessageType::GetValidators,
        MessageType::Validators,
        MessageType::GetHeadBlock,
        MessageType::HeadBlock,
        MessageType::GetBlock,
        MessageType::Block,
        MessageType::TxMined,
        MessageType::ChainEvent,
    ];

    /// The string the node puts on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Ping => "ping",
            MessageType::Pong => "pong",
            MessageType::PeerList => "peer_list",
            MessageType::HandshakeInit => "handshake_init",
            MessageType::HandshakeAck => "handshake_ack",
            MessageType::HandshakeConfirm => "handshake_confirm",
            MessageType::SendTransaction => "send_transaction",
            MessageType::CallSmartContract => "call_smart_contract",
            MessageType::CallResult => "call_result",
            MessageType::GetBalance => "get_balance",
            MessageType::Balance => "balance",
            MessageType::GetNonce => "get_nonce",
            MessageType::Nonce => "nonce",
            MessageType::GetReceipt => "get_receipt",
            MessageType::Receipt => "receipt",
            MessageType::GetReceipts => "get_receipts",
            MessageType::Receipts => "receipts",
            MessageType::GetValidators => "get_validators",
            // the node names the response "validator", singular
            MessageType::Validators => "validator",
            MessageType::GetHeadBlock => "get_head_block",
            MessageType::HeadBlock => "head_block",
            MessageType::GetBlock => "get_block",
            MessageType::Block => "block",
            MessageType::TxMined => "tx_mined",
            MessageType::ChainEvent => "chain_event",
        }
    }
}

impl FromStr for MessageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageType::ALL
            .iter()
            .find(|message_type| message_type.as_str() == s)
            .copied()
            .ok_or_else(|| Error::UnknownMessageType(s.to_string()))
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
