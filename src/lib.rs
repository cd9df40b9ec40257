//! Manual construction, signing, and submission of a single-input,
//! two-output lovelace transfer on the Cardano preview testnet.
//!
//! The pipeline is strictly sequential: fetch UTXOs from Blockfrost, pick
//! the largest, split it into send/fee/change, assemble and hash the body,
//! obtain one signature from an external signing helper, then either print
//! the serialized transaction or submit it (`--submit`).

pub mod amounts;
pub mod cbor;
pub mod chain;
pub mod config;
pub mod keys;
pub mod selection;
pub mod signer;
pub mod tx;
