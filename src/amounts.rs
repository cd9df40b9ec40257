use anyhow::{anyhow, Result};

/// Amount forwarded to the destination output, in lovelace (1 ADA).
pub const SEND_AMOUNT: u64 = 1_000_000;

/// Flat fee estimate in lovelace. Generous for a two-output transfer; a
/// size-based schedule would undercut it.
pub const FLAT_FEE: u64 = 200_000;

/// Fee policy for a transaction shape (input and output counts).
///
/// Injected into the planner so tests and future size-based schedules do not
/// have to touch the arithmetic.
pub trait FeeStrategy {
    fn estimate(&self, inputs: usize, outputs: usize) -> u64;
}

#[derive(Clone, Copy, Debug)]
pub struct FlatFee(pub u64);

impl Default for FlatFee {
    fn default() -> Self {
        FlatFee(FLAT_FEE)
    }
}

impl FeeStrategy for FlatFee {
    fn estimate(&self, _inputs: usize, _outputs: usize) -> u64 {
        self.0
    }
}

/// `send + fee + change` always equals the consumed input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferPlan {
    pub send: u64,
    pub fee: u64,
    pub change: u64,
}

/// Split `total` (the selected UTXO's quantity) into send, fee and change.
///
/// Fails when the input cannot cover send plus fee; a negative change output
/// must never reach the serializer.
pub fn plan_transfer(total: u64, send: u64, fees: &impl FeeStrategy) -> Result<TransferPlan> {
    let fee = fees.estimate(1, 2);
    let required = send
        .checked_add(fee)
        .ok_or_else(|| anyhow!("send amount plus fee overflows"))?;
    let change = total.checked_sub(required).ok_or_else(|| {
        anyhow!(
            "insufficient funds: the selected UTXO holds {total} lovelace \
             but send + fee requires {required}"
        )
    })?;
    Ok(TransferPlan { send, fee, change })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_a_five_ada_input() {
        let plan = plan_transfer(5_000_000, SEND_AMOUNT, &FlatFee::default()).unwrap();
        assert_eq!(
            plan,
            TransferPlan {
                send: 1_000_000,
                fee: 200_000,
                change: 3_800_000,
            }
        );
        assert_eq!(plan.send + plan.fee + plan.change, 5_000_000);
    }

    #[test]
    fn exact_cover_leaves_zero_change() {
        let plan = plan_transfer(1_200_000, SEND_AMOUNT, &FlatFee::default()).unwrap();
        assert_eq!(plan.change, 0);
    }

    #[test]
    fn underfunded_input_is_rejected() {
        let err = plan_transfer(1_199_999, SEND_AMOUNT, &FlatFee::default()).unwrap_err();
        assert!(err.to_string().contains("insufficient funds"));
    }

    #[test]
    fn fee_strategy_is_injected() {
        struct PerOutput;
        impl FeeStrategy for PerOutput {
            fn estimate(&self, _inputs: usize, outputs: usize) -> u64 {
                50_000 * outputs as u64
            }
        }

        let plan = plan_transfer(2_000_000, SEND_AMOUNT, &PerOutput).unwrap();
        assert_eq!(plan.fee, 100_000);
        assert_eq!(plan.change, 900_000);
    }
}
