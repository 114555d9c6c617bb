//! Order lifecycle and inventory settlement rules.
//!
//! Statuses are stored as lowercase strings; the enums here are the only
//! place transitions are decided, so an illegal admin action fails
//! validation instead of writing an inconsistent row.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "paid" => Some(OrderStatus::Paid),
            "shipped" => Some(OrderStatus::Shipped),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Consult the transition table for an admin action moving this order
    /// to `target`. The admin actions are exactly mark-paid, mark-shipped
    /// and cancel, so `Pending` is never a target. `None` means the action
    /// is rejected before anything is written.
    pub fn transition_to(self, target: OrderStatus) -> Option<Transition> {
        use OrderStatus::*;

        let legal = matches!(
            (self, target),
            (Pending, Paid | Shipped | Cancelled)
                | (Paid, Paid | Shipped | Cancelled)
                | (Shipped, Shipped)
        );
        if !legal {
            return None;
        }

        Some(Transition {
            order_status: target,
            // Derived from the target alone: cancelling a paid order
            // reverts its payment status to pending.
            payment_status: if matches!(target, Paid | Shipped) {
                PaymentStatus::Paid
            } else {
                PaymentStatus::Pending
            },
            settles_inventory: matches!(target, Paid | Shipped),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
        }
    }
}

/// Outcome of a legal status change: what to write on the order row and
/// whether the referenced artworks get settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub settles_inventory: bool,
}

/// The settlement rule: the last remaining unit flips the artwork to sold.
/// Inventory counts are never decremented on this path, so a piece with
/// more than one unit is left untouched.
pub fn settles_to_sold(inventory: i32) -> bool {
    inventory == 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtworkStatus {
    Available,
    Sold,
    Hidden,
}

impl ArtworkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtworkStatus::Available => "available",
            ArtworkStatus::Sold => "sold",
            ArtworkStatus::Hidden => "hidden",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(ArtworkStatus::Available),
            "sold" => Some(ArtworkStatus::Sold),
            "hidden" => Some(ArtworkStatus::Hidden),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Easypaisa,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Easypaisa => "easypaisa",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "easypaisa" => Some(PaymentMethod::Easypaisa),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn pending_accepts_every_admin_action() {
        for target in [Paid, Shipped, Cancelled] {
            let t = Pending.transition_to(target).unwrap();
            assert_eq!(t.order_status, target);
        }
    }

    #[test]
    fn paid_accepts_every_admin_action() {
        for target in [Paid, Shipped, Cancelled] {
            assert!(Paid.transition_to(target).is_some());
        }
    }

    #[test]
    fn shipped_only_repeats_itself() {
        assert!(Shipped.transition_to(Shipped).is_some());
        assert!(Shipped.transition_to(Paid).is_none());
        assert!(Shipped.transition_to(Cancelled).is_none());
    }

    #[test]
    fn cancelled_is_terminal() {
        for target in [Pending, Paid, Shipped, Cancelled] {
            assert!(Cancelled.transition_to(target).is_none());
        }
    }

    #[test]
    fn pending_is_never_a_target() {
        for current in [Pending, Paid, Shipped, Cancelled] {
            assert!(current.transition_to(Pending).is_none());
        }
    }

    #[test]
    fn payment_status_follows_the_target_only() {
        // Marking paid then cancelling reverts payment status to pending.
        let paid = Pending.transition_to(Paid).unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Paid);

        let cancelled = Paid.transition_to(Cancelled).unwrap();
        assert_eq!(cancelled.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn settlement_fires_exactly_for_paid_and_shipped() {
        assert!(Pending.transition_to(Paid).unwrap().settles_inventory);
        assert!(Pending.transition_to(Shipped).unwrap().settles_inventory);
        assert!(!Pending.transition_to(Cancelled).unwrap().settles_inventory);
    }

    #[test]
    fn repeated_target_yields_the_same_transition() {
        let first = Pending.transition_to(Paid).unwrap();
        let again = Paid.transition_to(Paid).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn only_the_last_unit_settles_to_sold() {
        assert!(settles_to_sold(1));
        assert!(!settles_to_sold(0));
        assert!(!settles_to_sold(2));
        assert!(!settles_to_sold(10));
    }

    #[test]
    fn status_strings_round_trip() {
        for s in ["pending", "paid", "shipped", "cancelled"] {
            assert_eq!(OrderStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(OrderStatus::parse("refunded").is_none());
        for s in ["available", "sold", "hidden"] {
            assert_eq!(ArtworkStatus::parse(s).unwrap().as_str(), s);
        }
        assert_eq!(PaymentMethod::parse("easypaisa"), Some(PaymentMethod::Easypaisa));
        assert!(PaymentMethod::parse("jazzcash").is_none());
    }
}
