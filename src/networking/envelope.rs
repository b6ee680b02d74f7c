use crate::error::{Error, Result};
use crate::networking::message_type::MessageType;
use prost::Message;

/// Metadata attached to every frame.
#[derive(Clone, PartialEq, Message)]
pub struct MessageHeader {
    #[prost(uint32, tag = "1")]
    pub version: u32,
    /// EIP-55 address of the sending wallet
    #[prost(string, tag = "2")]
    pub sender_id: String,
    #[prost(string, tag = "3")]
    pub message_type: String,
    /// unix seconds
    #[prost(int64, tag = "4")]
    pub timestamp: i64,
    /// unused, always empty; the handshake authenticates the session
    #[prost(bytes = "vec", tag = "5")]
    pub signature: Vec<u8>,
}

/// The outer frame: one envelope per websocket binary message.
#[derive(Clone, PartialEq, Message)]
pub struct Envelope {
    #[prost(message, optional, tag = "1")]
    pub header: Option<MessageHeader>,
    #[prost(bytes = "vec", tag = "2")]
    pub payload: Vec<u8>,
}

impl Envelope {
    pub fn new(
        version: u32,
        sender_id: String,
        message_type: MessageType,
        timestamp: u64,
        payload: Vec<u8>,
    ) -> Envelope {
        Envelope {
            header: Some(MessageHeader {
                version,
                sender_id,
                message_type: message_type.as_str().to_string(),
                timestamp: timestamp as i64,
                signature: vec![],
            }),
            payload,
        }
    }

    /// The raw header string, whether or not we know the type.
    pub fn message_type_str(&self) -> Option<&str> {
        self.header
            .as_ref()
            .map(|header| header.message_type.as_str())
    }

    pub fn message_type(&self) -> Result<MessageType> {
        match self.message_type_str() {
            Some(message_type) => message_type.parse(),
            None => Err(Error::UnknownMessageType(String::new())),
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Envelope> {
        Envelope::decode(bytes).map_err(Error::MalformedEnvelope)
    }
}
