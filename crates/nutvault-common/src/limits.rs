use serde::{Deserialize, Serialize};

/// Global defaults applied when a wallet has no override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub max_balance: u64,
    pub max_send: u64,
    pub max_pay: u64,
}

impl Limits {
    pub const DEFAULT_MAX_BALANCE: u64 = 100_000;
    pub const DEFAULT_MAX_SEND: u64 = 50_000;
    pub const DEFAULT_MAX_PAY: u64 = 50_000;

    /// The caps actually in force for one wallet, after taking the lower of
    /// the wallet's own cap (if set) and the process-wide default.
    pub fn effective(&self, wallet_max_balance: Option<u64>, wallet_max_send: Option<u64>, wallet_max_pay: Option<u64>) -> EffectiveLimits {
        EffectiveLimits {
            max_balance: effective_cap(wallet_max_balance, self.max_balance),
            max_send: effective_cap(wallet_max_send, self.max_send),
            max_pay: effective_cap(wallet_max_pay, self.max_pay),
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_balance: Self::DEFAULT_MAX_BALANCE,
            max_send: Self::DEFAULT_MAX_SEND,
            max_pay: Self::DEFAULT_MAX_PAY,
        }
    }
}

/// The three caps actually in force for one wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveLimits {
    pub max_balance: u64,
    pub max_send: u64,
    pub max_pay: u64,
}

fn effective_cap(wallet_cap: Option<u64>, global_default: u64) -> u64 {
    match wallet_cap {
        Some(cap) => cap.min(global_default),
        None => global_default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_cap_lower_than_global_wins() {
        let limits = Limits::default();
        let eff = limits.effective(Some(10_000), None, None);
        assert_eq!(eff.max_balance, 10_000);
    }

    #[test]
    fn wallet_cap_higher_than_global_is_clamped() {
        let limits = Limits::default();
        let eff = limits.effective(Some(1_000_000), None, None);
        assert_eq!(eff.max_balance, Limits::DEFAULT_MAX_BALANCE);
    }

    #[test]
    fn no_wallet_cap_falls_back_to_global() {
        let limits = Limits::default();
        let eff = limits.effective(None, None, None);
        assert_eq!(eff.max_send, Limits::DEFAULT_MAX_SEND);
        assert_eq!(eff.max_pay, Limits::DEFAULT_MAX_PAY);
    }
}
