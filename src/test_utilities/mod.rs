use crate::keypair::Keypair;
use crate::settings::ClientSettings;

pub mod mocks;
pub mod test_manager;

pub const TEST_SECRET_KEY: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000001";
pub const TEST_SERVER_SECRET_KEY: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000002";

/// The wallet under test, address 0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf
pub fn test_keypair() -> Keypair {
    Keypair::from_secret_hex(TEST_SECRET_KEY).unwrap()
}

/// The node's wallet
pub fn test_server_keypair() -> Keypair {
    Keypair::from_secret_hex(TEST_SERVER_SECRET_KEY).unwrap()
}

pub fn test_settings() -> ClientSettings {
    ClientSettings {
        log_capacity: 50,
        ..ClientSettings::default()
    }
}
