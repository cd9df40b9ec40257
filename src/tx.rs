//! Transaction model and wire encoding: `[body, witness_set, true, null]`,
//! body hash = blake2b-256 over the body's canonical CBOR.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

use crate::cbor::Encoder;

type Blake2b256 = Blake2b<U32>;

/// 32-byte transaction hash, hex on the wire of the indexing API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxHash(pub [u8; 32]);

impl FromStr for TxHash {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| anyhow!("expected a 32-byte hash, got {} bytes", b.len()))?;
        Ok(TxHash(bytes))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionInput {
    pub transaction_id: TxHash,
    pub index: u64,
}

/// Destination address (raw payload, as decoded from bech32) plus amount.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionOutput {
    pub address: Vec<u8>,
    pub lovelace: u64,
}

/// The value equation `sum(outputs) + fee == sum(inputs)` is the amount
/// planner's responsibility; the body only carries the numbers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionBody {
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub fee: u64,
}

impl TransactionBody {
    /// Canonical CBOR: `{0: [[hash, index], ..], 1: [[address, amount], ..], 2: fee}`.
    pub fn to_cbor(&self) -> Vec<u8> {
        let mut enc = Encoder::new();
        enc.map(3);

        enc.unsigned(0).array(self.inputs.len() as u64);
        for input in self.inputs.iter() {
            enc.array(2)
                .bytes(&input.transaction_id.0)
                .unsigned(input.index);
        }

        enc.unsigned(1).array(self.outputs.len() as u64);
        for output in self.outputs.iter() {
            enc.array(2).bytes(&output.address).unsigned(output.lovelace);
        }

        enc.unsigned(2).unsigned(self.fee);
        enc.into_bytes()
    }

    /// Blake2b-256 of the body CBOR; this is what witnesses sign.
    pub fn hash(&self) -> [u8; 32] {
        let mut hasher = Blake2b256::new();
        hasher.update(self.to_cbor());
        hasher.finalize().into()
    }
}

/// The signature stays `None` when the external signer failed; the encoding
/// then carries a CBOR null in its place and the transaction is under-signed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VkeyWitness {
    pub vkey: [u8; 32],
    pub signature: Option<[u8; 64]>,
}

impl VkeyWitness {
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub body: TransactionBody,
    pub witnesses: Vec<VkeyWitness>,
}

impl Transaction {
    /// True when every witness carries a signature; submission requires this.
    pub fn is_fully_signed(&self) -> bool {
        !self.witnesses.is_empty() && self.witnesses.iter().all(VkeyWitness::is_signed)
    }

    /// Wire encoding: `[body, {0: [[vkey, signature], ..]}, true, null]`.
    pub fn to_cbor(&self) -> Vec<u8> {
        let mut enc = Encoder::new();
        enc.array(4);

        let body = self.body.to_cbor();
        let mut out = enc.into_bytes();
        out.extend_from_slice(&body);

        let mut enc = Encoder::new();
        if self.witnesses.is_empty() {
            enc.map(0);
        } else {
            enc.map(1).unsigned(0).array(self.witnesses.len() as u64);
            for witness in self.witnesses.iter() {
                enc.array(2).bytes(&witness.vkey);
                match witness.signature {
                    Some(signature) => enc.bytes(&signature),
                    None => enc.null(),
                };
            }
        }
        enc.bool(true).null();
        out.extend_from_slice(&enc.into_bytes());
        out
    }
}

/// What happens to an assembled transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitAction {
    /// No flag: print the encoding, touch no network.
    DryRun,
    /// Flag set but a witness has no signature: report, do not broadcast.
    RefuseUnderSigned,
    Broadcast,
}

/// Decide the submission step from the operator flag and the witness set.
pub fn submit_action(submit_requested: bool, tx: &Transaction) -> SubmitAction {
    if !submit_requested {
        SubmitAction::DryRun
    } else if !tx.is_fully_signed() {
        SubmitAction::RefuseUnderSigned
    } else {
        SubmitAction::Broadcast
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> TransactionBody {
        TransactionBody {
            inputs: vec![TransactionInput {
                transaction_id: TxHash([0x11; 32]),
                index: 0,
            }],
            outputs: vec![
                TransactionOutput {
                    address: vec![0x60, 0xaa, 0xbb],
                    lovelace: 1_000_000,
                },
                TransactionOutput {
                    address: vec![0x60, 0xaa, 0xbb],
                    lovelace: 3_800_000,
                },
            ],
            fee: 200_000,
        }
    }

    #[test]
    fn body_cbor_layout() {
        let cbor = body().to_cbor();
        // map(3), key 0, array(1) of array(2), 32-byte hash
        assert_eq!(&cbor[..6], &[0xa3, 0x00, 0x81, 0x82, 0x58, 0x20]);
        assert_eq!(&cbor[6..38], &[0x11; 32]);
        // index 0, key 1, array(2) outputs
        assert_eq!(&cbor[38..41], &[0x00, 0x01, 0x82]);
        // fee at the tail: key 2, uint 200_000
        assert_eq!(&cbor[cbor.len() - 6..], &[0x02, 0x1a, 0x00, 0x03, 0x0d, 0x40]);
    }

    #[test]
    fn body_hash_is_deterministic() {
        assert_eq!(body().hash(), body().hash());

        let mut cheaper = body();
        cheaper.fee = 190_000;
        assert_ne!(body().hash(), cheaper.hash());
    }

    #[test]
    fn missing_signature_encodes_as_null() {
        let tx = Transaction {
            body: body(),
            witnesses: vec![VkeyWitness {
                vkey: [0x22; 32],
                signature: None,
            }],
        };
        assert!(!tx.is_fully_signed());

        let cbor = tx.to_cbor();
        // ends with: null signature, is_valid, auxiliary data
        assert_eq!(&cbor[cbor.len() - 3..], &[0xf6, 0xf5, 0xf6]);
    }

    #[test]
    fn signed_transaction_round_layout() {
        let tx = Transaction {
            body: body(),
            witnesses: vec![VkeyWitness {
                vkey: [0x22; 32],
                signature: Some([0x33; 64]),
            }],
        };
        assert!(tx.is_fully_signed());

        let cbor = tx.to_cbor();
        assert_eq!(cbor[0], 0x84);
        // witness set: map(1), key 0, array(1), array(2), bytes(32)
        let body_len = tx.body.to_cbor().len();
        assert_eq!(
            &cbor[1 + body_len..1 + body_len + 6],
            &[0xa1, 0x00, 0x81, 0x82, 0x58, 0x20]
        );
        // signature is a 64-byte string right before the [true, null] tail
        assert_eq!(&cbor[cbor.len() - 68..cbor.len() - 66], &[0x58, 0x40]);
        assert_eq!(&cbor[cbor.len() - 2..], &[0xf5, 0xf6]);
    }

    #[test]
    fn without_the_flag_nothing_is_broadcast() {
        let signed = Transaction {
            body: body(),
            witnesses: vec![VkeyWitness {
                vkey: [0x22; 32],
                signature: Some([0x33; 64]),
            }],
        };
        assert_eq!(submit_action(false, &signed), SubmitAction::DryRun);
        assert_eq!(submit_action(true, &signed), SubmitAction::Broadcast);
    }

    #[test]
    fn under_signed_submission_is_refused() {
        let unsigned = Transaction {
            body: body(),
            witnesses: vec![VkeyWitness {
                vkey: [0x22; 32],
                signature: None,
            }],
        };
        assert_eq!(submit_action(true, &unsigned), SubmitAction::RefuseUnderSigned);
        // no flag still means a plain dry run, even under-signed
        assert_eq!(submit_action(false, &unsigned), SubmitAction::DryRun);
    }

    #[test]
    fn tx_hash_hex_round_trip() {
        let hex = "3b40265111d8bb3c3c608d95b3a0bf83461ace32d79336579a1939b3aad1c0b7";
        let hash: TxHash = hex.parse().unwrap();
        assert_eq!(hash.to_string(), hex);

        assert!("abc".parse::<TxHash>().is_err());
        assert!("zz".repeat(32).parse::<TxHash>().is_err());
    }
}
