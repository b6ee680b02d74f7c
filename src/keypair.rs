use crate::crypto::{
    keccak256, parse_private_key, public_key_to_address, sign_digest, to_checksum_address,
    FichainAddress, FichainHash, FichainSignature,
};
use crate::error::{Error, Result};
use secp256k1::{PublicKey, SecretKey, SECP256K1};
use std::fmt;

/// An secp256k1 keypair identifying a wallet on the network.
///
/// The private key never leaves this struct: the node only ever sees the
/// signatures produced here.
#[derive(PartialEq)]
pub struct Keypair {
    secret_key: SecretKey,
    public_key: PublicKey,
    address: FichainAddress,
}

impl Keypair {
    /// Create and return a keypair with a randomly generated private key.
    pub fn new() -> Keypair {
        let (secret_key, public_key) =
            SECP256K1.generate_keypair(&mut secp256k1::rand::thread_rng());
        Keypair {
            secret_key,
            public_key,
            address: public_key_to_address(&public_key),
        }
    }

    /// Create and return a keypair with the given bytes as the private key
    pub fn from_secret_slice(slice: &[u8]) -> Result<Keypair> {
        let secret_key =
            SecretKey::from_slice(slice).map_err(|err| Error::InvalidKey(err.to_string()))?;
        Ok(Keypair::from_secret_key(secret_key))
    }

    /// Create and return a keypair from a hex private key, `0x` prefix optional
    pub fn from_secret_hex(secret_hex: &str) -> Result<Keypair> {
        Ok(Keypair::from_secret_key(parse_private_key(secret_hex)?))
    }

    fn from_secret_key(secret_key: SecretKey) -> Keypair {
        let public_key = PublicKey::from_secret_key(&SECP256K1, &secret_key);
        Keypair {
            secret_key,
            public_key,
            address: public_key_to_address(&public_key),
        }
    }

    pub fn address(&self) -> FichainAddress {
        self.address
    }

    /// The wallet address in EIP-55 form, as carried in message headers
    pub fn checksum_address(&self) -> String {
        to_checksum_address(&self.address)
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    /// Sign a precomputed keccak256 digest
    pub fn sign_digest(&self, digest: &FichainHash) -> Result<FichainSignature> {
        sign_digest(&self.secret_key, digest)
    }

    /// Hash and sign message bytes
    pub fn sign_bytes(&self, message_bytes: &[u8]) -> Result<FichainSignature> {
        self.sign_digest(&keccak256(message_bytes))
    }
}

impl Default for Keypair {
    fn default() -> Self {
        Keypair::new()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.checksum_address())
            .finish()
    }
}

impl fmt::Display for Keypair {
    /// formats a Keypair for println! without leaking the private key
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "address:{}", self.checksum_address())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::recover_address;

    const MOCK_SECRET_KEY: &str =
        "0x0000000000000000000000000000000000000000000000000000000000000001";

    #[test]
    fn keypair_new_from_secret_key_test() {
        let keypair = Keypair::from_secret_hex(MOCK_SECRET_KEY).unwrap();
        assert_eq!(
            keypair.checksum_address(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );

        assert!(Keypair::from_secret_hex("randomtext").is_err());
        assert!(Keypair::from_secret_hex("").is_err());
        assert!(Keypair::from_secret_slice(&[0u8; 32]).is_err());
    }

    #[test]
    fn keypair_signing_test() {
        let keypair = Keypair::from_secret_hex(MOCK_SECRET_KEY).unwrap();
        let signature = keypair.sign_bytes(b"hello world").unwrap();
        assert_eq!(signature.to_vec(), keypair.sign_bytes(b"hello world").unwrap().to_vec());
        assert_eq!(
            recover_address(&keccak256(b"hello world"), &signature).unwrap(),
            keypair.address()
        );
    }

    #[test]
    fn keypair_new_test() {
        let keypair = Keypair::new();
        let restored = Keypair::from_secret_slice(&keypair.secret_key()[..]).unwrap();
        assert_eq!(keypair.address(), restored.address());
        assert!(!format!("{}", keypair).contains(&hex::encode(&keypair.secret_key()[..])));
    }
}
