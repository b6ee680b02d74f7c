use crate::crypto::FichainAddress;
use crate::keypair::Keypair;
use crate::networking::envelope::Envelope;
use crate::networking::message_type::MessageType;
use crate::networking::message_types::{receipt::Receipt, transaction::Transaction};
use crate::settings::DEFAULT_CHAIN_ID;
use bigint::U256;

/// A frame as the node would send it.
pub fn make_mock_frame(node: &Keypair, message_type: MessageType, payload: Vec<u8>) -> Vec<u8> {
    Envelope::new(1, node.checksum_address(), message_type, 1_700_000_000, payload).serialize()
}

pub fn make_mock_transaction(keypair: &Keypair, nonce: u64) -> Transaction {
    let to_address: FichainAddress = [0x42; 20];
    let mut transaction = Transaction::new(
        to_address,
        nonce,
        U256::from(1_000u64),
        vec![],
        21_000,
        U256::from(1u64),
        String::from("mock"),
    );
    transaction.sign(keypair, DEFAULT_CHAIN_ID).unwrap();
    transaction
}

pub fn make_mock_receipt(transaction: &Transaction, status: u32) -> Receipt {
    Receipt {
        tx_hash: transaction.get_hash().to_vec(),
        block_hash: vec![0x0b; 32],
        block_number: 1,
        tx_index: 0,
        from: transaction
            .sender(DEFAULT_CHAIN_ID)
            .map(|address| address.to_vec())
            .unwrap_or_default(),
        to: transaction.to_address.clone(),
        amount: transaction.amount.clone(),
        cumulative_gas_used: 21_000,
        gas_used: 21_000,
        status,
        ..Receipt::default()
    }
}
