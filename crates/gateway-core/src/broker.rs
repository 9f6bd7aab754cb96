//! Broker policy: closeout and deactivation status plus the CM > BM > DL
//! cancellation hierarchy.

use std::collections::BTreeMap;

use gateway_protocol::broker_types;

/// Broker seat in the member hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerType {
    CorporateManager,
    BranchManager,
    Dealer,
}

impl BrokerType {
    pub fn from_char(c: u8) -> Option<Self> {
        match c {
            broker_types::CORPORATE_MANAGER => Some(BrokerType::CorporateManager),
            broker_types::BRANCH_MANAGER => Some(BrokerType::BranchManager),
            broker_types::DEALER => Some(BrokerType::Dealer),
            _ => None,
        }
    }

    pub fn as_char(self) -> u8 {
        match self {
            BrokerType::CorporateManager => broker_types::CORPORATE_MANAGER,
            BrokerType::BranchManager => broker_types::BRANCH_MANAGER,
            BrokerType::Dealer => broker_types::DEALER,
        }
    }
}

/// Per-broker status flags and hierarchy assignments.
#[derive(Debug, Default)]
pub struct BrokerPolicy {
    closeout: BTreeMap<String, bool>,
    deactivated: BTreeMap<String, bool>,
    types: BTreeMap<String, BrokerType>,
}

impl BrokerPolicy {
    pub fn new() -> Self {
        BrokerPolicy::default()
    }

    pub fn set_closeout(&mut self, broker_id: &str, is_closeout: bool) {
        self.closeout.insert(broker_id.to_string(), is_closeout);
    }

    pub fn set_deactivated(&mut self, broker_id: &str, is_deactivated: bool) {
        self.deactivated.insert(broker_id.to_string(), is_deactivated);
    }

    pub fn set_type(&mut self, broker_id: &str, broker_type: BrokerType) {
        self.types.insert(broker_id.to_string(), broker_type);
    }

    pub fn is_in_closeout(&self, broker_id: &str) -> bool {
        self.closeout.get(broker_id).copied().unwrap_or(false)
    }

    pub fn is_deactivated(&self, broker_id: &str) -> bool {
        self.deactivated.get(broker_id).copied().unwrap_or(false)
    }

    /// Cancellation privilege check. Same broker always passes; otherwise
    /// CM cancels anyone, BM cancels dealers only, DL cancels nobody else.
    /// Brokers with no assigned type are treated as peers and allowed.
    pub fn can_cancel(&self, canceller: &str, owner: &str) -> bool {
        if canceller == owner {
            return true;
        }
        let (canceller_type, owner_type) =
            match (self.types.get(canceller), self.types.get(owner)) {
                (Some(c), Some(o)) => (*c, *o),
                _ => return true,
            };
        match canceller_type {
            BrokerType::CorporateManager => true,
            BrokerType::BranchManager => owner_type == BrokerType::Dealer,
            BrokerType::Dealer => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hierarchy_privileges_propagate_top_down() {
        let mut policy = BrokerPolicy::new();
        policy.set_type("CM001", BrokerType::CorporateManager);
        policy.set_type("BM001", BrokerType::BranchManager);
        policy.set_type("DL001", BrokerType::Dealer);
        policy.set_type("DL002", BrokerType::Dealer);

        assert!(policy.can_cancel("DL001", "DL001"));
        assert!(policy.can_cancel("CM001", "BM001"));
        assert!(policy.can_cancel("CM001", "DL001"));
        assert!(policy.can_cancel("BM001", "DL001"));
        assert!(!policy.can_cancel("BM001", "CM001"));
        assert!(!policy.can_cancel("DL001", "DL002"));
    }

    #[test]
    fn missing_types_are_treated_as_peers() {
        let mut policy = BrokerPolicy::new();
        policy.set_type("DL001", BrokerType::Dealer);
        // Unknown canceller or owner: allowed either way.
        assert!(policy.can_cancel("X9999", "DL001"));
        assert!(policy.can_cancel("DL001", "X9999"));
    }

    #[test]
    fn closeout_and_deactivation_default_to_false() {
        let mut policy = BrokerPolicy::new();
        assert!(!policy.is_in_closeout("B0001"));
        policy.set_closeout("B0001", true);
        assert!(policy.is_in_closeout("B0001"));
        policy.set_closeout("B0001", false);
        assert!(!policy.is_in_closeout("B0001"));
        assert!(!policy.is_deactivated("B0001"));
    }
}
