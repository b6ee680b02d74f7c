use crate::error::{Error, Result};
use crate::networking::message_type::MessageType;
use crate::networking::message_types::{
    bytes_message::BytesMessage,
    call_data::{CallSmartContractData, CallSmartContractResponse},
    handshake::{HandshakeAck, HandshakeConfirm, HandshakeInit},
    ping_pong::{Ping, Pong},
    receipt::Receipt,
    transaction::Transaction,
};
use bigint::U256;
use prost::Message;

const U64_WIDTH: usize = 8;
const U256_WIDTH: usize = 32;

/// A decoded envelope payload. The variant is fully determined by the
/// envelope's `MessageType`.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Empty,
    Ping(Ping),
    Pong(Pong),
    HandshakeInit(HandshakeInit),
    HandshakeAck(HandshakeAck),
    HandshakeConfirm(HandshakeConfirm),
    Transaction(Transaction),
    CallSmartContract(CallSmartContractData),
    CallResult(CallSmartContractResponse),
    Bytes(BytesMessage),
    Receipt(Receipt),
    /// Message kinds the session does not interpret
    Opaque(Vec<u8>),
}

fn decode_as<M: Message + Default>(message_type: MessageType, bytes: &[u8]) -> Result<M> {
    M::decode(bytes).map_err(|source| Error::MalformedPayload {
        message_type,
        source,
    })
}

/// Decode `bytes` with the schema `message_type` selects.
pub fn decode_payload(message_type: MessageType, bytes: &[u8]) -> Result<Payload> {
    let payload = match message_type {
        MessageType::Ping => Payload::Ping(decode_as(message_type, bytes)?),
        MessageType::Pong => Payload::Pong(decode_as(message_type, bytes)?),
        MessageType::HandshakeInit => Payload::HandshakeInit(decode_as(message_type, bytes)?),
        MessageType::HandshakeAck => Payload::HandshakeAck(decode_as(message_type, bytes)?),
        MessageType::HandshakeConfirm => {
            Payload::HandshakeConfirm(decode_as(message_type, bytes)?)
        }
        MessageType::SendTransaction => Payload::Transaction(decode_as(message_type, bytes)?),
        // handed back verbatim in get_receipt, never interpreted
        MessageType::TxMined => Payload::Opaque(bytes.to_vec()),
        MessageType::CallSmartContract => {
            Payload::CallSmartContract(decode_as(message_type, bytes)?)
        }
        MessageType::CallResult => Payload::CallResult(decode_as(message_type, bytes)?),
        MessageType::GetNonce
        | MessageType::Nonce
        | MessageType::Balance
        | MessageType::GetReceipt => Payload::Bytes(decode_as(message_type, bytes)?),
        MessageType::Receipt => Payload::Receipt(decode_as(message_type, bytes)?),
        // the node identifies the wallet from the session
        MessageType::GetBalance => Payload::Empty,
        MessageType::PeerList
        | MessageType::GetValidators
        | MessageType::Validators
        | MessageType::GetHeadBlock
        | MessageType::HeadBlock
        | MessageType::GetBlock
        | MessageType::Block
        | MessageType::GetReceipts
        | MessageType::Receipts
        | MessageType::ChainEvent => Payload::Opaque(bytes.to_vec()),
    };
    Ok(payload)
}

pub fn encode_payload(payload: &Payload) -> Vec<u8> {
    match payload {
        Payload::Empty => vec![],
        Payload::Ping(ping) => ping.encode_to_vec(),
        Payload::Pong(pong) => pong.encode_to_vec(),
        Payload::HandshakeInit(init) => init.encode_to_vec(),
        Payload::HandshakeAck(ack) => ack.encode_to_vec(),
        Payload::HandshakeConfirm(confirm) => confirm.encode_to_vec(),
        Payload::Transaction(transaction) => transaction.encode_to_vec(),
        Payload::CallSmartContract(call) => call.encode_to_vec(),
        Payload::CallResult(response) => response.encode_to_vec(),
        Payload::Bytes(bytes_message) => bytes_message.encode_to_vec(),
        Payload::Receipt(receipt) => receipt.encode_to_vec(),
        Payload::Opaque(bytes) => bytes.clone(),
    }
}

/// Interpret up to 8 big-endian bytes as a `u64`. Shorter input is
/// left-padded, so an empty slice is zero.
pub fn bytes_to_u64(bytes: &[u8]) -> Result<u64> {
    if bytes.len() > U64_WIDTH {
        return Err(Error::IntegerOverflow {
            len: bytes.len(),
            max: U64_WIDTH,
        });
    }
    let mut padded = [0u8; U64_WIDTH];
    padded[U64_WIDTH - bytes.len()..].copy_from_slice(bytes);
    Ok(u64::from_be_bytes(padded))
}

/// Minimal big-endian form: no leading zero bytes, zero is the empty string.
/// The node hashes these exact bytes when it verifies a signature.
pub fn u256_to_bytes(value: U256) -> Vec<u8> {
    let mut buffer = [0u8; U256_WIDTH];
    value.to_big_endian(&mut buffer);
    let first = buffer
        .iter()
        .position(|byte| *byte != 0)
        .unwrap_or(U256_WIDTH);
    buffer[first..].to_vec()
}

/// Inverse of `u256_to_bytes`. Leading zero bytes are tolerated.
pub fn bytes_to_u256(bytes: &[u8]) -> Result<U256> {
    let first = bytes
        .iter()
        .position(|byte| *byte != 0)
        .unwrap_or(bytes.len());
    let significant = &bytes[first..];
    if significant.len() > U256_WIDTH {
        return Err(Error::IntegerOverflow {
            len: significant.len(),
            max: U256_WIDTH,
        });
    }
    Ok(U256::from_big_endian(significant))
}
