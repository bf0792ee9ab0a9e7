use crate::{Result, SequencerError};
use ed25519_dalek::{Keypair, PublicKey, SecretKey, Signature, Signer as _, Verifier as _};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::Zeroizing;

/// Sequencer account address: the first 20 bytes of sha256(public key).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    pub fn from_public_key(public_key: &[u8; 32]) -> Self {
        let digest = Sha256::digest(public_key);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[..20]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

/// ed25519 signing identity derived from a 32-byte seed.
pub struct Signer {
    keypair: Keypair,
}

impl Signer {
    pub fn from_seed(seed: &[u8]) -> Result<Self> {
        let secret =
            SecretKey::from_bytes(seed).map_err(|e| SequencerError::InvalidKey(e.to_string()))?;
        let public: PublicKey = (&secret).into();
        Ok(Self {
            keypair: Keypair { secret, public },
        })
    }

    pub fn from_seed_hex(seed_hex: &str) -> Result<Self> {
        let seed_hex = seed_hex.trim().trim_start_matches("0x");
        let seed = Zeroizing::new(
            hex::decode(seed_hex).map_err(|e| SequencerError::InvalidKey(e.to_string()))?,
        );
        Self::from_seed(&seed)
    }

    pub fn generate() -> Result<Self> {
        let mut seed = Zeroizing::new([0u8; 32]);
        rand::thread_rng().fill(&mut seed[..]);
        Self::from_seed(&seed[..])
    }

    pub fn seed_hex(&self) -> String {
        hex::encode(self.keypair.secret.as_bytes())
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.keypair.public.to_bytes()
    }

    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key())
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.keypair.sign(message).to_bytes()
    }

    pub fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
        let Ok(public_key) = PublicKey::from_bytes(public_key) else {
            return false;
        };
        let Ok(signature) = Signature::try_from(signature) else {
            return false;
        };
        public_key.verify(message, &signature).is_ok()
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
