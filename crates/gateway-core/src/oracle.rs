//! The match-outcome oracle.
//!
//! The gateway does not run a real matching book; order outcomes are drawn
//! from a distribution. The draw lives behind [`MatchOracle`] so the engine
//! stays deterministic under test: production wires in [`SimOracle`], tests
//! wire in [`ScriptedOracle`] with a pre-loaded outcome queue.

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Outcome of an order or spread entry draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Order confirmed immediately.
    Confirmed,
    /// Order held for exchange approval.
    Freeze(FreezeKind),
    /// Order rejected by validation.
    Rejected,
}

/// Which freeze was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreezeKind {
    Price,
    Quantity,
}

/// Outcome of a 2L/3L IOC entry draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiLegOutcome {
    /// All legs matched.
    FullMatch,
    /// Matched in part; the remainder is cancelled.
    PartialMatch,
    /// Nothing matched; the order is cancelled outright.
    Unmatched,
}

/// How much of a confirmed multi-leg order fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStyle {
    Full,
    Half,
}

/// Source of simulated matching outcomes.
///
/// Implementations may be stateful; the engine calls each method exactly
/// once per decision point, in handler order.
pub trait MatchOracle {
    /// Regular order entry: 70% confirm, 15% freeze, 15% reject.
    fn entry_outcome(&mut self) -> EntryOutcome;

    /// Spread order entry: same distribution as regular entry.
    fn spread_entry_outcome(&mut self) -> EntryOutcome;

    /// Whether a price modification goes through the freeze path (20%).
    fn modification_freezes(&mut self) -> bool;

    /// Control-desk decision on a held freeze (50/50).
    fn freeze_approved(&mut self) -> bool;

    /// Whether a cancellation is accepted (85%).
    fn cancellation_accepted(&mut self) -> bool;

    /// 2L/3L entry: 70% full match, 20% partial, 10% unmatched.
    fn multi_leg_outcome(&mut self) -> MultiLegOutcome;

    /// Fill depth for a confirmed multi-leg order (full or 50%).
    fn fill_style(&mut self) -> FillStyle;

    /// Synthesized execution price for a market order, in [10000, 10999].
    fn market_price(&mut self) -> i32;
}

/// Pseudo-random oracle with the production distribution.
pub struct SimOracle {
    rng: SmallRng,
}

impl SimOracle {
    pub fn new(seed: u64) -> Self {
        SimOracle {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn entry_draw(&mut self) -> EntryOutcome {
        let roll = self.rng.gen_range(0..100);
        if roll < 70 {
            EntryOutcome::Confirmed
        } else if roll < 85 {
            let kind = if roll % 2 == 0 {
                FreezeKind::Price
            } else {
                FreezeKind::Quantity
            };
            EntryOutcome::Freeze(kind)
        } else {
            EntryOutcome::Rejected
        }
    }
}

impl MatchOracle for SimOracle {
    fn entry_outcome(&mut self) -> EntryOutcome {
        self.entry_draw()
    }

    fn spread_entry_outcome(&mut self) -> EntryOutcome {
        self.entry_draw()
    }

    fn modification_freezes(&mut self) -> bool {
        self.rng.gen_range(0..100) < 20
    }

    fn freeze_approved(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    fn cancellation_accepted(&mut self) -> bool {
        self.rng.gen_range(0..100) < 85
    }

    fn multi_leg_outcome(&mut self) -> MultiLegOutcome {
        let roll = self.rng.gen_range(0..100);
        if roll < 70 {
            MultiLegOutcome::FullMatch
        } else if roll < 90 {
            MultiLegOutcome::PartialMatch
        } else {
            MultiLegOutcome::Unmatched
        }
    }

    fn fill_style(&mut self) -> FillStyle {
        if self.rng.gen_bool(0.5) {
            FillStyle::Full
        } else {
            FillStyle::Half
        }
    }

    fn market_price(&mut self) -> i32 {
        10000 + self.rng.gen_range(0..1000)
    }
}

/// Deterministic oracle for tests. Each decision pops from its queue;
/// an empty queue yields the "happy path" default (confirm / no freeze /
/// approve / accept / full match / full fill / 10500).
#[derive(Default)]
pub struct ScriptedOracle {
    pub entry_outcomes: VecDeque<EntryOutcome>,
    pub spread_entry_outcomes: VecDeque<EntryOutcome>,
    pub modification_freezes: VecDeque<bool>,
    pub freeze_approvals: VecDeque<bool>,
    pub cancellation_accepts: VecDeque<bool>,
    pub multi_leg_outcomes: VecDeque<MultiLegOutcome>,
    pub fill_styles: VecDeque<FillStyle>,
    pub market_prices: VecDeque<i32>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        ScriptedOracle::default()
    }
}

impl MatchOracle for ScriptedOracle {
    fn entry_outcome(&mut self) -> EntryOutcome {
        self.entry_outcomes
            .pop_front()
            .unwrap_or(EntryOutcome::Confirmed)
    }

    fn spread_entry_outcome(&mut self) -> EntryOutcome {
        self.spread_entry_outcomes
            .pop_front()
            .unwrap_or(EntryOutcome::Confirmed)
    }

    fn modification_freezes(&mut self) -> bool {
        self.modification_freezes.pop_front().unwrap_or(false)
    }

    fn freeze_approved(&mut self) -> bool {
        self.freeze_approvals.pop_front().unwrap_or(true)
    }

    fn cancellation_accepted(&mut self) -> bool {
        self.cancellation_accepts.pop_front().unwrap_or(true)
    }

    fn multi_leg_outcome(&mut self) -> MultiLegOutcome {
        self.multi_leg_outcomes
            .pop_front()
            .unwrap_or(MultiLegOutcome::FullMatch)
    }

    fn fill_style(&mut self) -> FillStyle {
        self.fill_styles.pop_front().unwrap_or(FillStyle::Full)
    }

    fn market_price(&mut self) -> i32 {
        self.market_prices.pop_front().unwrap_or(10500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_oracle_prices_stay_in_band() {
        let mut oracle = SimOracle::new(42);
        for _ in 0..200 {
            let price = oracle.market_price();
            assert!((10000..11000).contains(&price));
        }
    }

    #[test]
    fn scripted_oracle_defaults_to_happy_path() {
        let mut oracle = ScriptedOracle::new();
        assert_eq!(oracle.entry_outcome(), EntryOutcome::Confirmed);
        assert!(oracle.freeze_approved());
        assert!(oracle.cancellation_accepted());
        assert_eq!(oracle.multi_leg_outcome(), MultiLegOutcome::FullMatch);
    }

    #[test]
    fn scripted_oracle_pops_in_order() {
        let mut oracle = ScriptedOracle::new();
        oracle
            .entry_outcomes
            .extend([EntryOutcome::Rejected, EntryOutcome::Confirmed]);
        assert_eq!(oracle.entry_outcome(), EntryOutcome::Rejected);
        assert_eq!(oracle.entry_outcome(), EntryOutcome::Confirmed);
        assert_eq!(oracle.entry_outcome(), EntryOutcome::Confirmed);
    }
}
