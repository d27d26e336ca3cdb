//! Salary advance requests.
//!
//! Employees ask for an advance on their salary during an open period; an
//! admin records a provisional decision on each request and later confirms
//! all of them at once.
//!
//! # Modules
//!
//! - `types` - Advance types, statuses, periods and request snapshots
//! - `eligibility` - The allowed amount range derived from the base salary
//! - `error` - Advance-specific error types
//! - `service` - The two-phase approval state machine

pub mod eligibility;
pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod eligibility_props;
#[cfg(test)]
mod service_props;

pub use eligibility::{AmountRange, Eligibility, MIN_ADVANCE_AMOUNT, allowed_range, validate_amount};
pub use error::AdvanceError;
pub use service::{AdvanceWorkflow, Finalization, Proposal};
pub use types::{
    AdminDecision, AdminEdit, AdminEditOutcome, AdvancePeriod, AdvanceRequest, AdvanceStatus,
    AdvanceType, CycleFilter, NewAdvanceRequest, PeriodSettings, RequestFilter, SubmitAdvance,
    completed_cycle_users,
};
