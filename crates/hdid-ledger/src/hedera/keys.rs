use ed25519_dalek::{Signer, SigningKey};
use zeroize::Zeroizing;

use crate::error::LedgerError;

/// DER (PKCS#8) prefix of an Ed25519 private key as exported by Hedera tooling.
const ED25519_DER_PREFIX: &str = "302e020100300506032b657004220420";
/// DER prefix of an ECDSA secp256k1 private key.
const ECDSA_DER_PREFIX: &str = "3030020100300706052b8104000a04220420";

/// The operator's Ed25519 signing key.
pub struct OperatorKey {
    signing_key: SigningKey,
}

impl OperatorKey {
    /// Parse a hex key: raw 32-byte seed, 64-byte seed‖public key, or DER.
    pub fn from_hex(input: &str) -> Result<Self, LedgerError> {
        let digits = input.trim();
        let digits = digits.strip_prefix("0x").unwrap_or(digits).to_ascii_lowercase();
        let digits = Zeroizing::new(digits);

        if digits.starts_with(ECDSA_DER_PREFIX) {
            return Err(LedgerError::Config(
                "ECDSA (secp256k1) operator keys are not supported, use an ED25519 key".into(),
            ));
        }

        let bytes = Zeroizing::new(
            hex::decode(digits.as_str())
                .map_err(|e| LedgerError::Config(format!("private key is not valid hex: {}", e)))?,
        );

        let seed: &[u8] = if digits.starts_with(ED25519_DER_PREFIX) && bytes.len() == 48 {
            &bytes[16..]
        } else {
            match bytes.len() {
                32 | 64 => &bytes[..32],
                n => {
                    return Err(LedgerError::Config(format!(
                        "private key must be 32 bytes (or DER-encoded), got {} bytes",
                        n
                    )))
                }
            }
        };

        let mut seed_arr = Zeroizing::new([0u8; 32]);
        seed_arr.copy_from_slice(seed);
        Ok(Self {
            signing_key: SigningKey::from_bytes(&seed_arr),
        })
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl std::fmt::Debug for OperatorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorKey")
            .field("public_key", &hex::encode(self.public_key_bytes()))
            .finish()
    }
}
