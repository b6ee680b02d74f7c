use crate::error::Result;
use crate::networking::codec::bytes_to_u256;
use bigint::U256;
use prost::Message;

pub const RECEIPT_STATUS_FAILED: u32 = 0;
pub const RECEIPT_STATUS_SUCCESS: u32 = 1;

/// Outcome of a mined transaction, answered by the node to `get_receipt`.
#[derive(Clone, PartialEq, Message)]
pub struct Receipt {
    #[prost(bytes = "vec", tag = "1")]
    pub tx_hash: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub block_hash: Vec<u8>,
    #[prost(uint64, tag = "3")]
    pub block_number: u64,
    #[prost(uint32, tag = "4")]
    pub tx_index: u32,
    #[prost(bytes = "vec", tag = "5")]
    pub from: Vec<u8>,
    /// empty for contract creation
    #[prost(bytes = "vec", tag = "6")]
    pub to: Vec<u8>,
    #[prost(bytes = "vec", tag = "7")]
    pub amount: Vec<u8>,
    #[prost(uint64, tag = "8")]
    pub cumulative_gas_used: u64,
    #[prost(uint64, tag = "9")]
    pub gas_used: u64,
    /// empty unless the transaction created a contract
    #[prost(bytes = "vec", tag = "10")]
    pub contract_address: Vec<u8>,
    #[prost(message, repeated, tag = "11")]
    pub logs: Vec<Log>,
    #[prost(bytes = "vec", tag = "12")]
    pub post_state: Vec<u8>,
    #[prost(bytes = "vec", tag = "13")]
    pub logs_bloom: Vec<u8>,
    #[prost(uint32, tag = "14")]
    pub status: u32,
}

/// An event emitted by a contract during execution.
#[derive(Clone, PartialEq, Message)]
pub struct Log {
    #[prost(bytes = "vec", tag = "1")]
    pub address: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub topics: Vec<Vec<u8>>,
    #[prost(bytes = "vec", tag = "3")]
    pub data: Vec<u8>,
    #[prost(uint32, tag = "4")]
    pub log_index: u32,
    #[prost(uint64, tag = "5")]
    pub block_number: u64,
    #[prost(bytes = "vec", tag = "6")]
    pub tx_hash: Vec<u8>,
    #[prost(uint32, tag = "7")]
    pub tx_index: u32,
    #[prost(bytes = "vec", tag = "8")]
    pub block_hash: Vec<u8>,
    #[prost(bool, tag = "9")]
    pub removed: bool,
}

impl Receipt {
    pub fn is_success(&self) -> bool {
        self.status == RECEIPT_STATUS_SUCCESS
    }

    pub fn get_amount(&self) -> Result<U256> {
        bytes_to_u256(&self.amount)
    }
}
