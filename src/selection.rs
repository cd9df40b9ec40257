use crate::tx::TxHash;

/// Where an unspent output lives and how many lovelace it holds.
/// Fetched fresh each run, never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Utxo {
    pub tx_hash: TxHash,
    pub output_index: u64,
    pub lovelace: u64,
}

impl Utxo {
    /// `hash#index`, the notation explorers use.
    pub fn pointer(&self) -> String {
        format!("{}#{}", self.tx_hash, self.output_index)
    }
}

/// Pick the UTXO with the largest lovelace quantity.
///
/// Ties go to the lexicographically smallest (hash, index) pair so that the
/// same set always yields the same choice, regardless of fetch order.
pub fn select_largest(utxos: &[Utxo]) -> Option<&Utxo> {
    utxos.iter().max_by(|a, b| {
        a.lovelace.cmp(&b.lovelace).then_with(|| {
            (b.tx_hash, b.output_index).cmp(&(a.tx_hash, a.output_index))
        })
    })
}
