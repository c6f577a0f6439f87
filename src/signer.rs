//! Account identity and transaction signing
//!
//! Holds the faucet's secp256k1 signing key, derives its public address
//! once at startup, and produces EIP-155 signed legacy transfers as
//! hex-armored raw transaction bytes.

use crate::error::{FaucetError, FaucetResult};
use crate::types::{Address, Hash, ADDRESS_LENGTH};
use k256::ecdsa::SigningKey;
use rlp::RlpStream;
use zeroize::Zeroize;

/// A value transfer about to be signed. Consumed by signing; never
/// retained after the raw bytes are produced.
#[derive(Debug, Clone)]
pub struct TransferTx {
    pub nonce: u64,
    pub to: Address,
    pub value: u128,
    pub gas_limit: u64,
    pub gas_price: u128,
    pub chain_id: u64,
}

/// The faucet's signing credential and derived public address.
pub struct FaucetSigner {
    key: SigningKey,
    address: Address,
}

impl FaucetSigner {
    /// Build a signer from a hex-encoded private key (`0x` prefix
    /// optional). The decoded key material is wiped after the signing
    /// key has been constructed.
    pub fn from_hex(private_key: &str) -> FaucetResult<Self> {
        let hex_part = private_key.strip_prefix("0x").unwrap_or(private_key);

        let mut bytes = hex::decode(hex_part)
            .map_err(|e| FaucetError::Config(format!("private key is not valid hex: {}", e)))?;

        if bytes.len() != 32 {
            bytes.zeroize();
            return Err(FaucetError::Config(format!(
                "private key must be 32 bytes, got {}",
                bytes.len()
            )));
        }

        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        bytes.zeroize();

        let key = SigningKey::from_bytes(&arr.into())
            .map_err(|e| FaucetError::Config(format!("invalid private key: {}", e)));
        arr.zeroize();
        let key = key?;

        let address = derive_address(&key);

        Ok(Self { key, address })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a transfer, binding sender, nonce, value, gas parameters and
    /// chain id into one signature (EIP-155). Returns the RLP-encoded
    /// signed transaction ready for submission.
    pub fn sign_transfer(&self, tx: &TransferTx) -> FaucetResult<Vec<u8>> {
        let digest = signing_digest(tx);

        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&digest.0)
            .map_err(|e| FaucetError::Signing(e.to_string()))?;

        let v = tx.chain_id * 2 + 35 + recovery_id.to_byte() as u64;
        let r: [u8; 32] = signature.r().to_bytes().into();
        let s: [u8; 32] = signature.s().to_bytes().into();

        let mut stream = RlpStream::new_list(9);
        append_body(&mut stream, tx);
        stream.append(&v);
        stream.append(&trim_be(&r));
        stream.append(&trim_be(&s));

        Ok(stream.out().to_vec())
    }
}

/// Keccak of the uncompressed public key, last 20 bytes.
fn derive_address(key: &SigningKey) -> Address {
    let point = key.verifying_key().to_encoded_point(false);
    let digest = keccak_hash::keccak(&point.as_bytes()[1..]); // skip the 0x04 tag
    let mut out = [0u8; ADDRESS_LENGTH];
    out.copy_from_slice(&digest.0[12..]);
    Address(out)
}

/// EIP-155 signing hash: keccak of the transaction body with
/// `(chain_id, 0, 0)` in the signature slots.
pub(crate) fn signing_digest(tx: &TransferTx) -> Hash {
    let mut stream = RlpStream::new_list(9);
    append_body(&mut stream, tx);
    stream.append(&tx.chain_id);
    stream.append(&0u8);
    stream.append(&0u8);

    Hash(keccak_hash::keccak(stream.out()).0)
}

/// The six fields shared by the signing payload and the signed encoding.
fn append_body(stream: &mut RlpStream, tx: &TransferTx) {
    stream.append(&tx.nonce);
    stream.append(&trim_be(&tx.gas_price.to_be_bytes()));
    stream.append(&tx.gas_limit);
    stream.append(&tx.to.0.to_vec());
    stream.append(&trim_be(&tx.value.to_be_bytes()));
    stream.append_empty_data(); // no calldata for a plain transfer
}

/// RLP integers are minimal big-endian: strip leading zero bytes.
fn trim_be(bytes: &[u8]) -> Vec<u8> {
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[first..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
    use rlp::Rlp;

    // Well-known test vector: private key 0x...01
    const KEY_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";
    const ADDR_ONE: &str = "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf";

    fn sample_tx() -> TransferTx {
        TransferTx {
            nonce: 7,
            to: "0x00000000000000000000000000000000000000aa".parse().unwrap(),
            value: 1000,
            gas_limit: 21000,
            gas_price: 1_000_000_000,
            chain_id: 1337,
        }
    }

    #[test]
    fn test_address_derivation_known_vector() {
        let signer = FaucetSigner::from_hex(KEY_ONE).unwrap();
        assert_eq!(signer.address(), ADDR_ONE.parse().unwrap());

        // 0x prefix is accepted too
        let signer = FaucetSigner::from_hex(&format!("0x{}", KEY_ONE)).unwrap();
        assert_eq!(signer.address(), ADDR_ONE.parse().unwrap());
    }

    #[test]
    fn test_rejects_malformed_keys() {
        assert!(FaucetSigner::from_hex("").is_err());
        assert!(FaucetSigner::from_hex("abcd").is_err());
        assert!(FaucetSigner::from_hex(&"zz".repeat(32)).is_err());
        // Zero is not a valid scalar
        assert!(FaucetSigner::from_hex(&"00".repeat(32)).is_err());
    }

    #[test]
    fn test_signed_transfer_structure() {
        let signer = FaucetSigner::from_hex(KEY_ONE).unwrap();
        let tx = sample_tx();
        let raw = signer.sign_transfer(&tx).unwrap();

        let rlp = Rlp::new(&raw);
        assert!(rlp.is_list());
        assert_eq!(rlp.item_count().unwrap(), 9);

        assert_eq!(rlp.val_at::<u64>(0).unwrap(), tx.nonce);
        assert_eq!(rlp.val_at::<Vec<u8>>(1).unwrap(), vec![0x3b, 0x9a, 0xca, 0x00]);
        assert_eq!(rlp.val_at::<u64>(2).unwrap(), tx.gas_limit);
        assert_eq!(rlp.val_at::<Vec<u8>>(3).unwrap(), tx.to.0.to_vec());
        // Value is minimal big-endian: 1000 = 0x03e8
        assert_eq!(rlp.val_at::<Vec<u8>>(4).unwrap(), vec![0x03, 0xe8]);
        assert_eq!(rlp.val_at::<Vec<u8>>(5).unwrap(), Vec::<u8>::new());

        let v = rlp.val_at::<u64>(6).unwrap();
        assert!(v == tx.chain_id * 2 + 35 || v == tx.chain_id * 2 + 36);
    }

    #[test]
    fn test_signature_recovers_to_signer_address() {
        let signer = FaucetSigner::from_hex(KEY_ONE).unwrap();
        let tx = sample_tx();
        let raw = signer.sign_transfer(&tx).unwrap();

        let rlp = Rlp::new(&raw);
        let v = rlp.val_at::<u64>(6).unwrap();
        let r = rlp.val_at::<Vec<u8>>(7).unwrap();
        let s = rlp.val_at::<Vec<u8>>(8).unwrap();

        // Rebuild the 64-byte signature, left-padding r and s
        let mut sig_bytes = [0u8; 64];
        sig_bytes[32 - r.len()..32].copy_from_slice(&r);
        sig_bytes[64 - s.len()..].copy_from_slice(&s);
        let signature = Signature::from_slice(&sig_bytes).unwrap();

        let recovery_id =
            RecoveryId::from_byte((v - 35 - tx.chain_id * 2) as u8).unwrap();

        let digest = signing_digest(&tx);
        let recovered =
            VerifyingKey::recover_from_prehash(&digest.0, &signature, recovery_id).unwrap();

        let point = recovered.to_encoded_point(false);
        let hash = keccak_hash::keccak(&point.as_bytes()[1..]);
        let mut addr = [0u8; ADDRESS_LENGTH];
        addr.copy_from_slice(&hash.0[12..]);

        assert_eq!(Address(addr), signer.address());
    }

    #[test]
    fn test_signing_is_deterministic() {
        let signer = FaucetSigner::from_hex(KEY_ONE).unwrap();
        let tx = sample_tx();
        assert_eq!(signer.sign_transfer(&tx).unwrap(), signer.sign_transfer(&tx).unwrap());
    }

    #[test]
    fn test_trim_be() {
        assert_eq!(trim_be(&[0, 0, 3, 0xe8]), vec![3, 0xe8]);
        assert_eq!(trim_be(&[0, 0, 0]), Vec::<u8>::new());
        assert_eq!(trim_be(&[1, 0]), vec![1, 0]);
    }
}
