//! Property-based tests for the advance workflow.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::advance::error::AdvanceError;
use crate::advance::service::AdvanceWorkflow;
use crate::advance::types::{AdminDecision, AdvanceRequest, AdvanceStatus, AdvanceType};

fn arb_status() -> impl Strategy<Value = AdvanceStatus> {
    prop_oneof![
        Just(AdvanceStatus::UnderReview),
        Just(AdvanceStatus::Approved),
        Just(AdvanceStatus::Rejected),
    ]
}

fn arb_decision() -> impl Strategy<Value = Option<AdminDecision>> {
    prop_oneof![
        Just(None),
        Just(Some(AdminDecision::Approved)),
        Just(Some(AdminDecision::Rejected)),
    ]
}

prop_compose! {
    fn arb_request()(
        id in any::<u128>(),
        user in any::<u128>(),
        status in arb_status(),
        admin_decision in arb_decision(),
        user_locked in any::<bool>(),
        locked in any::<bool>(),
        cents in 10_000i64..100_000,
    ) -> AdvanceRequest {
        AdvanceRequest {
            id: Uuid::from_u128(id),
            user_id: Uuid::from_u128(user),
            advance_type: AdvanceType::First,
            period_id: Uuid::nil(),
            amount: Decimal::new(cents, 2),
            notes: String::new(),
            status,
            admin_decision,
            user_locked,
            locked,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Employee edits succeed only when every lock condition is clear.
    #[test]
    fn prop_owner_modify_requires_all_clear(req in arb_request()) {
        let result = AdvanceWorkflow::ensure_owner_can_modify(&req, req.user_id);
        let clear = req.status == AdvanceStatus::UnderReview
            && !req.locked
            && req.admin_decision.is_none()
            && !req.user_locked;
        prop_assert_eq!(result.is_ok(), clear);
        if !clear {
            prop_assert!(matches!(result, Err(AdvanceError::NotAllowedNow)));
        }
    }

    /// Finalization either refuses entirely or moves exactly the decided
    /// under-review requests to their decision.
    #[test]
    fn prop_finalize_all_or_nothing(requests in prop::collection::vec(arb_request(), 0..20)) {
        let undecided = requests.iter().filter(|r| r.is_undecided()).count();
        match AdvanceWorkflow::finalize(&requests) {
            Err(AdvanceError::UndecidedRequests { count }) => prop_assert_eq!(count, undecided),
            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
            Ok(plan) => {
                prop_assert_eq!(undecided, 0);
                let eligible = requests
                    .iter()
                    .filter(|r| r.status == AdvanceStatus::UnderReview)
                    .count();
                prop_assert_eq!(plan.len(), eligible);
                for change in plan {
                    let req = requests.iter().find(|r| r.id == change.request_id).unwrap();
                    prop_assert_eq!(Some(change.status), req.admin_decision.map(|d| d.as_status()));
                }
            }
        }
    }

    /// A proposal never touches the status and always locks the employee out.
    #[test]
    fn prop_propose_locks_employee(req in arb_request(), approve in any::<bool>()) {
        let decision = if approve { AdminDecision::Approved } else { AdminDecision::Rejected };
        match AdvanceWorkflow::propose(&req, decision) {
            Ok(p) => {
                prop_assert!(!req.locked);
                prop_assert!(p.user_locked);
                prop_assert_eq!(p.admin_decision, decision);
            }
            Err(_) => prop_assert!(req.locked),
        }
    }
}
