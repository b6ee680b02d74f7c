use crate::crypto::{keccak256, recover_address, FichainAddress, FichainHash};
use crate::error::Result;
use crate::keypair::Keypair;
use crate::networking::codec::{bytes_to_u256, u256_to_bytes};
use bigint::U256;
use prost::Message;

/// A signed value transfer or contract invocation, as shipped in
/// `send_transaction`. `amount` and `gas_price` are minimal big-endian
/// integers; the node hashes those exact bytes when verifying `sign`.
#[derive(Clone, PartialEq, Message)]
pub struct Transaction {
    #[prost(bytes = "vec", tag = "1")]
    pub to_address: Vec<u8>,
    #[prost(uint64, tag = "2")]
    pub nonce: u64,
    #[prost(bytes = "vec", tag = "3")]
    pub amount: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub data: Vec<u8>,
    #[prost(uint64, tag = "5")]
    pub gas: u64,
    #[prost(bytes = "vec", tag = "6")]
    pub gas_price: Vec<u8>,
    #[prost(string, tag = "7")]
    pub message: String,
    #[prost(bytes = "vec", tag = "8")]
    pub sign: Vec<u8>,
    #[prost(bytes = "vec", tag = "9")]
    pub hash: Vec<u8>,
}

/// The pre-image that is hashed and signed. Same fields as `Transaction`
/// without the signature, bound to a chain id.
#[derive(Clone, PartialEq, Message)]
pub struct TransactionSignData {
    #[prost(bytes = "vec", tag = "1")]
    pub to_address: Vec<u8>,
    #[prost(uint64, tag = "2")]
    pub nonce: u64,
    #[prost(bytes = "vec", tag = "3")]
    pub amount: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub data: Vec<u8>,
    #[prost(uint64, tag = "5")]
    pub gas: u64,
    #[prost(bytes = "vec", tag = "6")]
    pub gas_price: Vec<u8>,
    #[prost(string, tag = "7")]
    pub message: String,
    #[prost(bytes = "vec", tag = "8")]
    pub chain_id: Vec<u8>,
}

/// The pre-image of the transaction hash: the signed fields plus the signature.
#[derive(Clone, PartialEq, Message)]
pub struct TransactionHashData {
    #[prost(bytes = "vec", tag = "1")]
    pub to_address: Vec<u8>,
    #[prost(uint64, tag = "2")]
    pub nonce: u64,
    #[prost(bytes = "vec", tag = "3")]
    pub amount: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub data: Vec<u8>,
    #[prost(uint64, tag = "5")]
    pub gas: u64,
    #[prost(bytes = "vec", tag = "6")]
    pub gas_price: Vec<u8>,
    #[prost(string, tag = "7")]
    pub message: String,
    #[prost(bytes = "vec", tag = "8")]
    pub sign: Vec<u8>,
}

impl Transaction {
    pub fn new(
        to_address: FichainAddress,
        nonce: u64,
        amount: U256,
        data: Vec<u8>,
        gas: u64,
        gas_price: U256,
        message: String,
    ) -> Transaction {
        Transaction {
            to_address: to_address.to_vec(),
            nonce,
            amount: u256_to_bytes(amount),
            data,
            gas,
            gas_price: u256_to_bytes(gas_price),
            message,
            sign: vec![],
            hash: vec![],
        }
    }

    pub fn get_amount(&self) -> Result<U256> {
        bytes_to_u256(&self.amount)
    }

    pub fn get_gas_price(&self) -> Result<U256> {
        bytes_to_u256(&self.gas_price)
    }

    pub fn is_signed(&self) -> bool {
        !self.sign.is_empty()
    }

    pub fn sign_data(&self, chain_id: u64) -> TransactionSignData {
        TransactionSignData {
            to_address: self.to_address.clone(),
            nonce: self.nonce,
            amount: self.amount.clone(),
            data: self.data.clone(),
            gas: self.gas,
            gas_price: self.gas_price.clone(),
            message: self.message.clone(),
            chain_id: u256_to_bytes(U256::from(chain_id)),
        }
    }

    pub fn hash_for_signature(&self, chain_id: u64) -> FichainHash {
        keccak256(&self.sign_data(chain_id).encode_to_vec())
    }

    /// Sign the chain-bound pre-image and store the 65 byte signature.
    pub fn sign(&mut self, keypair: &Keypair, chain_id: u64) -> Result<()> {
        let signature = keypair.sign_digest(&self.hash_for_signature(chain_id))?;
        self.sign = signature.to_vec();
        Ok(())
    }

    /// Recover the address that signed this transaction.
    pub fn sender(&self, chain_id: u64) -> Result<FichainAddress> {
        recover_address(&self.hash_for_signature(chain_id), &self.sign)
    }

    /// The transaction hash as the node computes it.
    pub fn get_hash(&self) -> FichainHash {
        let hash_data = TransactionHashData {
            to_address: self.to_address.clone(),
            nonce: self.nonce,
            amount: self.amount.clone(),
            data: self.data.clone(),
            gas: self.gas,
            gas_price: self.gas_price.clone(),
            message: self.message.clone(),
            sign: self.sign.clone(),
        };
        keccak256(&hash_data.encode_to_vec())
    }
}
