use prost::Message;

/// A bare byte blob. Carries the wallet address in `get_nonce`, the
/// big-endian integer in `nonce` and `balance`, and the transaction
/// reference in `get_receipt`.
#[derive(Clone, PartialEq, Message)]
pub struct BytesMessage {
    #[prost(bytes = "vec", tag = "1")]
    pub data: Vec<u8>,
}

impl BytesMessage {
    pub fn new(data: Vec<u8>) -> Self {
        BytesMessage { data }
    }
}
