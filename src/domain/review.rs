//! Review eligibility decision core.
//!
//! Pure function over already-fetched facts; the store layer gathers the
//! facts and the HTTP layer renders the outcome. Calling it twice with
//! the same inputs always yields the same answer.

use serde::Serialize;

pub const REASON_INACTIVE_PRODUCT: &str = "inactive_product";
pub const REASON_NO_PURCHASE: &str = "no_purchase";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReviewEligibility {
    pub can_review: bool,
    pub has_already_reviewed: bool,
    pub reason: Option<&'static str>,
}

/// Three terminal outcomes per (user, product) pair, with an inactive
/// product short-circuiting ahead of purchase history.
pub fn evaluate_eligibility(
    product_active: bool,
    has_purchased: bool,
    has_existing_review: bool,
) -> ReviewEligibility {
    if !product_active {
        return ReviewEligibility {
            can_review: false,
            has_already_reviewed: false,
            reason: Some(REASON_INACTIVE_PRODUCT),
        };
    }
    if !has_purchased {
        return ReviewEligibility {
            can_review: false,
            has_already_reviewed: false,
            reason: Some(REASON_NO_PURCHASE),
        };
    }
    if has_existing_review {
        return ReviewEligibility {
            can_review: false,
            has_already_reviewed: true,
            reason: None,
        };
    }
    ReviewEligibility { can_review: true, has_already_reviewed: false, reason: None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchased_without_review_is_eligible() {
        let e = evaluate_eligibility(true, true, false);
        assert!(e.can_review);
        assert!(!e.has_already_reviewed);
        assert_eq!(e.reason, None);
    }

    #[test]
    fn test_no_purchase_is_ineligible() {
        let e = evaluate_eligibility(true, false, false);
        assert!(!e.can_review);
        assert_eq!(e.reason, Some(REASON_NO_PURCHASE));
    }

    #[test]
    fn test_existing_review_reported_distinctly() {
        let e = evaluate_eligibility(true, true, true);
        assert!(!e.can_review);
        assert!(e.has_already_reviewed);
    }

    #[test]
    fn test_inactive_product_short_circuits() {
        let e = evaluate_eligibility(false, true, true);
        assert!(!e.can_review);
        assert_eq!(e.reason, Some(REASON_INACTIVE_PRODUCT));
    }

    #[test]
    fn test_idempotent() {
        for active in [true, false] {
            for purchased in [true, false] {
                for existing in [true, false] {
                    let a = evaluate_eligibility(active, purchased, existing);
                    let b = evaluate_eligibility(active, purchased, existing);
                    assert_eq!(a, b);
                }
            }
        }
    }
}
