use crate::json_stringify_deterministic::stringify_deterministic;
use crate::signer::Signer;
use crate::Result;
use oracle_rollup_chain::RollupId;
use serde::{Deserialize, Serialize};

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s).map_err(de::Error::custom)
    }
}

mod hex_bytes {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(de::Error::custom)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Opaque rollup payload ordered by the sequencer under `rollup_id`.
    Sequence {
        rollup_id: RollupId,
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub nonce: u32,
    pub actions: Vec<Action>,
}

impl UnsignedTransaction {
    pub fn sequence(nonce: u32, rollup_id: RollupId, data: Vec<u8>) -> Self {
        Self {
            nonce,
            actions: vec![Action::Sequence { rollup_id, data }],
        }
    }

    /// The exact bytes covered by the envelope signature.
    pub fn signing_bytes(&self) -> Result<Vec<u8>> {
        let value = serde_json::to_value(self)?;
        Ok(stringify_deterministic(&value).into_bytes())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub public_key: Vec<u8>,
    pub transaction: UnsignedTransaction,
}

impl SignedTransaction {
    pub fn sign(transaction: UnsignedTransaction, signer: &Signer) -> Result<Self> {
        let signature = signer.sign(&transaction.signing_bytes()?);
        Ok(Self {
            signature: signature.to_vec(),
            public_key: signer.public_key().to_vec(),
            transaction,
        })
    }

    pub fn verify(&self) -> bool {
        match self.transaction.signing_bytes() {
            Ok(bytes) => Signer::verify(&self.public_key, &bytes, &self.signature),
            Err(_) => false,
        }
    }

    pub fn nonce(&self) -> u32 {
        self.transaction.nonce
    }

    /// Wire bytes handed to the sequencer network.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn signer() -> Signer {
        Signer::from_seed(&[7u8; 32]).unwrap()
    }

    #[test]
    fn test_action_wire_shape() {
        let rollup_id = RollupId::from_name("test-rollup");
        let tx = UnsignedTransaction::sequence(5, rollup_id, b"hi".to_vec());
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(
            value,
            json!({
                "nonce": 5,
                "actions": [{
                    "type": "sequence",
                    "rollup_id": rollup_id.to_hex(),
                    "data": "aGk=",
                }],
            })
        );
    }

    #[test]
    fn test_signature_covers_nonce() {
        let rollup_id = RollupId::from_name("test-rollup");
        let signed =
            SignedTransaction::sign(UnsignedTransaction::sequence(1, rollup_id, vec![1, 2]), &signer())
                .unwrap();
        assert!(signed.verify());

        let mut tampered = signed.clone();
        tampered.transaction.nonce = 2;
        assert!(!tampered.verify());
    }

    #[test]
    fn test_wire_bytes_decode_back() {
        let rollup_id = RollupId::from_name("test-rollup");
        let signed =
            SignedTransaction::sign(UnsignedTransaction::sequence(9, rollup_id, vec![0xff]), &signer())
                .unwrap();
        let decoded: SignedTransaction = serde_json::from_slice(&signed.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, signed);
        assert!(decoded.verify());
    }
}
