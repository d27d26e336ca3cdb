//! Advance approval state machine.
//!
//! Requests move through two admin phases. A proposal records a
//! provisional decision and freezes the request for the employee; the
//! status itself only changes at finalization, which turns every
//! provisional decision into a final status at once and locks the request
//! for everyone.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::eligibility::validate_amount;
use super::error::AdvanceError;
use super::types::{
    AdminDecision, AdminEdit, AdminEditOutcome, AdvancePeriod, AdvanceRequest, AdvanceStatus,
    NewAdvanceRequest, PeriodSettings, SubmitAdvance,
};

/// Provisional decision to store on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proposal {
    /// Decision to store.
    pub admin_decision: AdminDecision,
    /// Always true: the employee may no longer edit.
    pub user_locked: bool,
}

/// Status change applied to one request at finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finalization {
    /// Request to update.
    pub request_id: Uuid,
    /// Final status.
    pub status: AdvanceStatus,
}

/// Stateless service for the advance workflow.
///
/// All methods are associated functions that validate an operation
/// against the current state and return what must be written.
pub struct AdvanceWorkflow;

impl AdvanceWorkflow {
    /// Validates a new request.
    ///
    /// # Arguments
    /// * `user_id` - The requesting employee
    /// * `period` - The latest active period of the requested type, if any
    /// * `today` - Current business date
    /// * `base_salary` - The employee's base salary
    /// * `already_requested` - Whether a request exists for (user, type, period)
    /// * `input` - The submission
    ///
    /// # Errors
    /// Checks run in order: open period, base salary, duplicate, amount range.
    pub fn submit(
        user_id: Uuid,
        period: Option<&AdvancePeriod>,
        today: NaiveDate,
        base_salary: Option<Decimal>,
        already_requested: bool,
        input: SubmitAdvance,
    ) -> Result<NewAdvanceRequest, AdvanceError> {
        let period = period
            .filter(|p| p.advance_type == input.advance_type && p.is_open_on(today))
            .ok_or(AdvanceError::PeriodClosed {
                advance_type: input.advance_type,
            })?;

        if !base_salary.is_some_and(|b| b > Decimal::ZERO) {
            return Err(AdvanceError::NoBaseSalary);
        }

        if already_requested {
            return Err(AdvanceError::AlreadyRequested {
                advance_type: input.advance_type,
            });
        }

        validate_amount(base_salary, input.amount)?;

        Ok(NewAdvanceRequest {
            user_id,
            advance_type: input.advance_type,
            period_id: period.id,
            amount: input.amount,
            notes: input.notes.trim().to_string(),
        })
    }

    /// Checks that the employee still owns and may modify the request.
    ///
    /// # Errors
    /// * `RequestNotFound` if the request belongs to someone else
    /// * `NotAllowedNow` once a decision, a lock, or a final status exists
    pub fn ensure_owner_can_modify(
        request: &AdvanceRequest,
        actor: Uuid,
    ) -> Result<(), AdvanceError> {
        if request.user_id != actor {
            return Err(AdvanceError::RequestNotFound(request.id));
        }
        if !request.is_owner_editable() {
            return Err(AdvanceError::NotAllowedNow);
        }
        Ok(())
    }

    /// Validates an employee's amount change and returns the amount to store.
    ///
    /// # Errors
    /// Lock violations first, then the amount range.
    pub fn owner_edit(
        request: &AdvanceRequest,
        actor: Uuid,
        base_salary: Option<Decimal>,
        amount: Decimal,
    ) -> Result<Decimal, AdvanceError> {
        Self::ensure_owner_can_modify(request, actor)?;
        validate_amount(base_salary, amount)?;
        Ok(amount)
    }

    /// Records a provisional decision on a single request.
    ///
    /// # Errors
    /// * `RequestLocked` if the request has already been finalized
    pub fn propose(
        request: &AdvanceRequest,
        decision: AdminDecision,
    ) -> Result<Proposal, AdvanceError> {
        if request.locked {
            return Err(AdvanceError::RequestLocked(request.id));
        }
        Ok(Proposal {
            admin_decision: decision,
            user_locked: true,
        })
    }

    /// Plans finalization over the whole request set.
    ///
    /// # Errors
    /// * `UndecidedRequests` if any request under review has no decision;
    ///   nothing must be written in that case
    pub fn finalize(requests: &[AdvanceRequest]) -> Result<Vec<Finalization>, AdvanceError> {
        let undecided = requests.iter().filter(|r| r.is_undecided()).count();
        if undecided > 0 {
            return Err(AdvanceError::UndecidedRequests { count: undecided });
        }

        Ok(requests
            .iter()
            .filter(|r| r.status == AdvanceStatus::UnderReview)
            .filter_map(|r| {
                r.admin_decision.map(|decision| Finalization {
                    request_id: r.id,
                    status: decision.as_status(),
                })
            })
            .collect())
    }

    /// Applies an admin edit to a request that is not finalized yet.
    ///
    /// # Errors
    /// * `RequestLocked` once finalized
    /// * amount range errors for the resulting amount
    pub fn admin_edit(
        request: &AdvanceRequest,
        base_salary: Option<Decimal>,
        edit: AdminEdit,
    ) -> Result<AdminEditOutcome, AdvanceError> {
        if request.locked {
            return Err(AdvanceError::RequestLocked(request.id));
        }

        let amount = edit.amount.unwrap_or(request.amount);
        validate_amount(base_salary, amount)?;

        Ok(AdminEditOutcome {
            amount,
            notes: edit.notes.unwrap_or_else(|| request.notes.clone()),
            admin_decision: edit.decision,
            user_locked: edit.decision.is_some(),
        })
    }

    /// Validates a period window.
    ///
    /// # Errors
    /// * `InvalidPeriodRange` if the end precedes the start
    pub fn configure_period(settings: PeriodSettings) -> Result<PeriodSettings, AdvanceError> {
        if settings.end_date < settings.start_date {
            return Err(AdvanceError::InvalidPeriodRange {
                start: settings.start_date,
                end: settings.end_date,
            });
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advance::types::AdvanceType;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 11).unwrap()
    }

    fn open_period(advance_type: AdvanceType) -> AdvancePeriod {
        AdvancePeriod {
            id: Uuid::from_u128(7),
            advance_type,
            start_date: NaiveDate::from_ymd_opt(2025, 9, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 9, 12).unwrap(),
            is_active: true,
        }
    }

    fn submission(amount: Decimal) -> SubmitAdvance {
        SubmitAdvance {
            advance_type: AdvanceType::First,
            amount,
            notes: " rent ".to_string(),
        }
    }

    fn request(user_id: Uuid) -> AdvanceRequest {
        AdvanceRequest {
            id: Uuid::new_v4(),
            user_id,
            advance_type: AdvanceType::First,
            period_id: Uuid::from_u128(7),
            amount: dec!(200),
            notes: String::new(),
            status: AdvanceStatus::UnderReview,
            admin_decision: None,
            user_locked: false,
            locked: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_submit_happy_path() {
        let user = Uuid::new_v4();
        let period = open_period(AdvanceType::First);
        let new = AdvanceWorkflow::submit(
            user,
            Some(&period),
            today(),
            Some(dec!(1000)),
            false,
            submission(dec!(250)),
        )
        .unwrap();

        assert_eq!(new.period_id, period.id);
        assert_eq!(new.amount, dec!(250));
        assert_eq!(new.notes, "rent");
    }

    #[test]
    fn test_submit_rejects_closed_or_missing_period() {
        let user = Uuid::new_v4();
        let err = AdvanceWorkflow::submit(user, None, today(), Some(dec!(1000)), false, submission(dec!(200)))
            .unwrap_err();
        assert!(matches!(err, AdvanceError::PeriodClosed { .. }));

        let late = NaiveDate::from_ymd_opt(2025, 9, 13).unwrap();
        let period = open_period(AdvanceType::First);
        let err = AdvanceWorkflow::submit(user, Some(&period), late, Some(dec!(1000)), false, submission(dec!(200)))
            .unwrap_err();
        assert!(matches!(err, AdvanceError::PeriodClosed { .. }));
    }

    #[test]
    fn test_submit_rejects_period_of_other_type() {
        let period = open_period(AdvanceType::Second);
        let err = AdvanceWorkflow::submit(
            Uuid::new_v4(),
            Some(&period),
            today(),
            Some(dec!(1000)),
            false,
            submission(dec!(200)),
        )
        .unwrap_err();
        assert!(matches!(err, AdvanceError::PeriodClosed { .. }));
    }

    #[test]
    fn test_submit_check_order() {
        let period = open_period(AdvanceType::First);
        // zero salary wins over the duplicate check
        let err = AdvanceWorkflow::submit(
            Uuid::new_v4(),
            Some(&period),
            today(),
            Some(Decimal::ZERO),
            true,
            submission(dec!(200)),
        )
        .unwrap_err();
        assert!(matches!(err, AdvanceError::NoBaseSalary));

        // duplicate wins over an out-of-range amount
        let err = AdvanceWorkflow::submit(
            Uuid::new_v4(),
            Some(&period),
            today(),
            Some(dec!(1000)),
            true,
            submission(dec!(5000)),
        )
        .unwrap_err();
        assert!(matches!(err, AdvanceError::AlreadyRequested { .. }));
    }

    #[test]
    fn test_owner_edit_blocked_by_each_lock() {
        let owner = Uuid::new_v4();

        let mut decided = request(owner);
        decided.admin_decision = Some(AdminDecision::Rejected);
        let mut user_locked = request(owner);
        user_locked.user_locked = true;
        let mut locked = request(owner);
        locked.locked = true;
        let mut approved = request(owner);
        approved.status = AdvanceStatus::Approved;

        for req in [decided, user_locked, locked, approved] {
            let err = AdvanceWorkflow::owner_edit(&req, owner, Some(dec!(1000)), dec!(150)).unwrap_err();
            assert!(matches!(err, AdvanceError::NotAllowedNow));
            assert_eq!(err.status_code(), 403);
        }
    }

    #[test]
    fn test_owner_edit_other_users_request_is_not_found() {
        let req = request(Uuid::new_v4());
        let err = AdvanceWorkflow::owner_edit(&req, Uuid::new_v4(), Some(dec!(1000)), dec!(150)).unwrap_err();
        assert!(matches!(err, AdvanceError::RequestNotFound(_)));
    }

    #[test]
    fn test_owner_edit_validates_amount() {
        let owner = Uuid::new_v4();
        let req = request(owner);
        assert_eq!(
            AdvanceWorkflow::owner_edit(&req, owner, Some(dec!(1000)), dec!(150)).unwrap(),
            dec!(150)
        );
        assert!(AdvanceWorkflow::owner_edit(&req, owner, Some(dec!(1000)), dec!(251)).is_err());
    }

    #[test]
    fn test_propose_sets_user_lock_but_not_status() {
        let req = request(Uuid::new_v4());
        let proposal = AdvanceWorkflow::propose(&req, AdminDecision::Approved).unwrap();
        assert_eq!(proposal.admin_decision, AdminDecision::Approved);
        assert!(proposal.user_locked);
    }

    #[test]
    fn test_propose_on_finalized_request_fails() {
        let mut req = request(Uuid::new_v4());
        req.locked = true;
        req.status = AdvanceStatus::Approved;
        assert!(matches!(
            AdvanceWorkflow::propose(&req, AdminDecision::Rejected),
            Err(AdvanceError::RequestLocked(_))
        ));
    }

    #[test]
    fn test_finalize_refuses_with_undecided() {
        let mut a = request(Uuid::new_v4());
        a.admin_decision = Some(AdminDecision::Approved);
        let b = request(Uuid::new_v4());

        let err = AdvanceWorkflow::finalize(&[a, b]).unwrap_err();
        assert!(matches!(err, AdvanceError::UndecidedRequests { count: 1 }));
    }

    #[test]
    fn test_finalize_applies_decisions() {
        let mut a = request(Uuid::new_v4());
        a.admin_decision = Some(AdminDecision::Approved);
        let mut b = request(Uuid::new_v4());
        b.admin_decision = Some(AdminDecision::Rejected);
        let mut done = request(Uuid::new_v4());
        done.status = AdvanceStatus::Approved;
        done.admin_decision = Some(AdminDecision::Approved);
        done.locked = true;

        let plan = AdvanceWorkflow::finalize(&[a.clone(), b.clone(), done]).unwrap();
        assert_eq!(
            plan,
            vec![
                Finalization {
                    request_id: a.id,
                    status: AdvanceStatus::Approved
                },
                Finalization {
                    request_id: b.id,
                    status: AdvanceStatus::Rejected
                },
            ]
        );
    }

    #[test]
    fn test_finalize_empty_set() {
        assert!(AdvanceWorkflow::finalize(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_admin_edit_decision_drives_user_lock() {
        let req = request(Uuid::new_v4());
        let outcome = AdvanceWorkflow::admin_edit(
            &req,
            Some(dec!(1000)),
            AdminEdit {
                amount: Some(dec!(220)),
                notes: Some("checked".into()),
                decision: Some(AdminDecision::Rejected),
            },
        )
        .unwrap();
        assert_eq!(outcome.amount, dec!(220));
        assert_eq!(outcome.notes, "checked");
        assert!(outcome.user_locked);

        let mut decided = req;
        decided.admin_decision = Some(AdminDecision::Approved);
        decided.user_locked = true;
        let cleared = AdvanceWorkflow::admin_edit(
            &decided,
            Some(dec!(1000)),
            AdminEdit {
                amount: None,
                notes: None,
                decision: None,
            },
        )
        .unwrap();
        assert_eq!(cleared.admin_decision, None);
        assert!(!cleared.user_locked);
        assert_eq!(cleared.amount, dec!(200));
    }

    #[test]
    fn test_admin_edit_locked_and_invalid_amount() {
        let mut locked = request(Uuid::new_v4());
        locked.locked = true;
        let edit = AdminEdit {
            amount: None,
            notes: None,
            decision: None,
        };
        assert!(matches!(
            AdvanceWorkflow::admin_edit(&locked, Some(dec!(1000)), edit.clone()),
            Err(AdvanceError::RequestLocked(_))
        ));

        let req = request(Uuid::new_v4());
        let too_much = AdminEdit {
            amount: Some(dec!(9000)),
            ..edit
        };
        assert!(matches!(
            AdvanceWorkflow::admin_edit(&req, Some(dec!(1000)), too_much),
            Err(AdvanceError::AmountAboveMaximum { .. })
        ));
    }

    #[test]
    fn test_configure_period_range() {
        let start = NaiveDate::from_ymd_opt(2025, 9, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 9, 9).unwrap();
        assert!(matches!(
            AdvanceWorkflow::configure_period(PeriodSettings {
                start_date: start,
                end_date: end,
                is_active: true
            }),
            Err(AdvanceError::InvalidPeriodRange { .. })
        ));
        assert!(
            AdvanceWorkflow::configure_period(PeriodSettings {
                start_date: start,
                end_date: start,
                is_active: false
            })
            .is_ok()
        );
    }
}
