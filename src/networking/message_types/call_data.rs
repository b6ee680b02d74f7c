use crate::crypto::{keccak256, recover_address, FichainAddress, FichainHash};
use crate::error::Result;
use crate::keypair::Keypair;
use prost::Message;

/// A read-only contract invocation. The node executes it as a static call
/// from the recovered signer.
#[derive(Clone, PartialEq, Message)]
pub struct CallSmartContractData {
    #[prost(bytes = "vec", tag = "1")]
    pub to_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub data: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub sign: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct CallSmartContractHashData {
    #[prost(bytes = "vec", tag = "1")]
    pub to_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub data: Vec<u8>,
}

/// `hash` echoes the call's signing hash, `data` is the raw return value.
#[derive(Clone, PartialEq, Message)]
pub struct CallSmartContractResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub hash: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub data: Vec<u8>,
}

impl CallSmartContractData {
    pub fn new(to_address: FichainAddress, data: Vec<u8>) -> CallSmartContractData {
        CallSmartContractData {
            to_address: to_address.to_vec(),
            data,
            sign: vec![],
        }
    }

    pub fn hash_for_signature(&self) -> FichainHash {
        let hash_data = CallSmartContractHashData {
            to_address: self.to_address.clone(),
            data: self.data.clone(),
        };
        keccak256(&hash_data.encode_to_vec())
    }

    pub fn sign(&mut self, keypair: &Keypair) -> Result<()> {
        self.sign = keypair.sign_digest(&self.hash_for_signature())?.to_vec();
        Ok(())
    }

    pub fn sender(&self) -> Result<FichainAddress> {
        recover_address(&self.hash_for_signature(), &self.sign)
    }
}

impl CallSmartContractResponse {
    /// Whether this response answers the given call.
    pub fn answers(&self, call: &CallSmartContractData) -> bool {
        self.hash == call.hash_for_signature().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utilities::{test_keypair, test_server_keypair};

    #[test]
    fn call_data_sign_test() {
        let keypair = test_keypair();
        let mut call = CallSmartContractData::new(
            test_server_keypair().address(),
            vec![0x70, 0xa0, 0x82, 0x31],
        );
        assert!(call.sender().is_err());

        let pre_image = call.hash_for_signature();
        call.sign(&keypair).unwrap();
        assert_eq!(call.hash_for_signature(), pre_image);
        assert_eq!(call.sender().unwrap(), keypair.address());

        let response = CallSmartContractResponse {
            hash: pre_image.to_vec(),
            data: vec![0; 32],
        };
        assert!(response.answers(&call));

        let other = CallSmartContractData::new(test_server_keypair().address(), vec![]);
        assert!(!response.answers(&other));
    }
}
