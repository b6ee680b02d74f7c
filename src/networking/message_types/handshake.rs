use crate::crypto::{keccak256, recover_address, FichainAddress};
use crate::error::Result;
use crate::keypair::Keypair;
use prost::Message;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The anti-replay nonce a client binds to its wallet address in
/// `handshake_init`. Serialized as `{"time":<secs>,"uuid":"<v4>"}`.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct HandshakeNonce {
    pub time: u64,
    pub uuid: String,
}

impl HandshakeNonce {
    pub fn new(time: u64) -> Self {
        HandshakeNonce {
            time,
            uuid: Uuid::new_v4().to_string(),
        }
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Step 1, client to node.
#[derive(Clone, PartialEq, Message)]
pub struct HandshakeInit {
    #[prost(bytes = "vec", tag = "1")]
    pub wallet_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub payload: Vec<u8>,
}

impl HandshakeInit {
    pub fn new(wallet_address: FichainAddress, nonce: &HandshakeNonce) -> Result<Self> {
        Ok(HandshakeInit {
            wallet_address: wallet_address.to_vec(),
            payload: nonce.serialize()?,
        })
    }
}

/// Step 2, node to client. `payload` is the challenge the client must sign;
/// `signature` is the node's own signature over the init payload.
#[derive(Clone, PartialEq, Message)]
pub struct HandshakeAck {
    #[prost(bytes = "vec", tag = "1")]
    pub wallet_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub payload: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub signature: Vec<u8>,
}

impl HandshakeAck {
    /// Recover the node's address from its signature over our init payload.
    /// Returns `None` when the node did not sign.
    pub fn recover_server_address(&self, init_payload: &[u8]) -> Result<Option<FichainAddress>> {
        if self.signature.is_empty() {
            return Ok(None);
        }
        let digest = keccak256(init_payload);
        Ok(Some(recover_address(&digest, &self.signature)?))
    }
}

/// Step 3, client to node.
#[derive(Clone, PartialEq, Message)]
pub struct HandshakeConfirm {
    #[prost(bytes = "vec", tag = "1")]
    pub signature: Vec<u8>,
}

impl HandshakeConfirm {
    /// Sign `keccak256(ack.payload)` with the wallet key.
    pub fn sign(ack: &HandshakeAck, keypair: &Keypair) -> Result<Self> {
        let digest = keccak256(&ack.payload);
        Ok(HandshakeConfirm {
            signature: keypair.sign_digest(&digest)?.to_vec(),
        })
    }
}
