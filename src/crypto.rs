use crate::error::{Error, Result};
use secp256k1::recovery::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, SecretKey, SECP256K1};
use sha3::{Digest, Keccak256};

pub type FichainHash = [u8; 32];
pub type FichainAddress = [u8; 20];
// r (32) || s (32) || recovery id (1)
pub type FichainSignature = [u8; 65];

pub const SIGNATURE_SIZE: usize = 65;

pub fn keccak256(data: &[u8]) -> FichainHash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Parse a hex private key, with or without the `0x` prefix.
pub fn parse_private_key(private_key_hex: &str) -> Result<SecretKey> {
    let trimmed = strip_hex_prefix(private_key_hex.trim());
    let bytes = hex::decode(trimmed).map_err(|err| Error::InvalidKey(err.to_string()))?;
    if bytes.len() != 32 {
        return Err(Error::InvalidKey(format!(
            "expected 32 bytes, got {}",
            bytes.len()
        )));
    }
    SecretKey::from_slice(&bytes).map_err(|err| Error::InvalidKey(err.to_string()))
}

/// Sign a 32 byte digest. The output is `r || s || v` with `v` in {0, 1}.
pub fn sign_digest(secret_key: &SecretKey, digest: &FichainHash) -> Result<FichainSignature> {
    let message = Message::from_slice(digest)?;
    let signature = SECP256K1.sign_recoverable(&message, secret_key);
    let (recovery_id, compact) = signature.serialize_compact();

    let mut output = [0u8; SIGNATURE_SIZE];
    output[..64].copy_from_slice(&compact);
    output[64] = recovery_id.to_i32() as u8;
    Ok(output)
}

pub fn sign(private_key_hex: &str, digest: &FichainHash) -> Result<FichainSignature> {
    let secret_key = parse_private_key(private_key_hex)?;
    sign_digest(&secret_key, digest)
}

/// Recover the signer's address from a digest and a 65 byte signature.
/// Both the raw (0/1) and the legacy (27/28) recovery byte are accepted.
pub fn recover_address(digest: &FichainHash, signature: &[u8]) -> Result<FichainAddress> {
    if signature.len() != SIGNATURE_SIZE {
        return Err(Error::Crypto(secp256k1::Error::InvalidSignature));
    }
    let v = match signature[64] {
        27 | 28 => signature[64] - 27,
        v => v,
    };
    let recovery_id = RecoveryId::from_i32(v as i32)?;
    let recoverable = RecoverableSignature::from_compact(&signature[..64], recovery_id)?;
    let message = Message::from_slice(digest)?;
    let public_key = SECP256K1.recover(&message, &recoverable)?;
    Ok(public_key_to_address(&public_key))
}

/// Last 20 bytes of keccak256 over the uncompressed public key (without the 0x04 tag).
pub fn public_key_to_address(public_key: &PublicKey) -> FichainAddress {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// EIP-55 mixed-case rendering of an address.
pub fn to_checksum_address(address: &FichainAddress) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());
    let mut output = String::with_capacity(42);
    output.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            output.push(c.to_ascii_uppercase());
        } else {
            output.push(c);
        }
    }
    output
}

pub fn parse_address(address: &str) -> Result<FichainAddress> {
    let bytes = hex::decode(strip_hex_prefix(address.trim()))
        .map_err(|err| Error::InvalidAddress(err.to_string()))?;
    if bytes.len() != 20 {
        return Err(Error::InvalidAddress(format!(
            "expected 20 bytes, got {}",
            bytes.len()
        )));
    }
    let mut output = [0u8; 20];
    output.copy_from_slice(&bytes);
    Ok(output)
}

fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";

    #[test]
    fn keccak256_empty_input_test() {
        assert_eq!(
            hex::encode(keccak256(&[])),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn parse_private_key_accepts_prefix_test() {
        let bare = parse_private_key(KEY_ONE).unwrap();
        let prefixed = parse_private_key(&format!("0x{}", KEY_ONE)).unwrap();
        assert_eq!(bare, prefixed);

        assert!(parse_private_key("0x1234").is_err());
        assert!(parse_private_key("not hex at all").is_err());
        assert!(parse_private_key("").is_err());
    }

    #[test]
    fn address_derivation_test() {
        let secret_key = parse_private_key(KEY_ONE).unwrap();
        let public_key = PublicKey::from_secret_key(&SECP256K1, &secret_key);
        let address = public_key_to_address(&public_key);
        assert_eq!(
            to_checksum_address(&address),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
        assert_eq!(
            parse_address("0x7e5f4552091a69125d5dfcb7b8c2659029395bdf").unwrap(),
            address
        );
    }

    #[test]
    fn sign_is_deterministic_and_recoverable_test() {
        let digest = keccak256(b"challenge");
        let first = sign(KEY_ONE, &digest).unwrap();
        let second = sign(&format!("0x{}", KEY_ONE), &digest).unwrap();
        assert_eq!(first.to_vec(), second.to_vec());
        assert!(first[64] == 0 || first[64] == 1);

        let secret_key = parse_private_key(KEY_ONE).unwrap();
        let public_key = PublicKey::from_secret_key(&SECP256K1, &secret_key);
        assert_eq!(
            recover_address(&digest, &first).unwrap(),
            public_key_to_address(&public_key)
        );

        let mut legacy = first;
        legacy[64] += 27;
        assert_eq!(
            recover_address(&digest, &legacy).unwrap(),
            public_key_to_address(&public_key)
        );
    }

    #[test]
    fn recover_rejects_short_signature_test() {
        let digest = keccak256(b"challenge");
        assert!(recover_address(&digest, &[0u8; 64]).is_err());
    }
}
