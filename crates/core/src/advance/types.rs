//! Advance domain types.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which of the two monthly advances a request or period belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdvanceType {
    /// First advance of the month.
    First,
    /// Second advance of the month.
    Second,
}

impl AdvanceType {
    /// Both types, in display order.
    pub const ALL: [Self; 2] = [Self::First, Self::Second];

    /// Returns the string representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::First => "FIRST",
            Self::Second => "SECOND",
        }
    }

    /// Parses a type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "FIRST" => Some(Self::First),
            "SECOND" => Some(Self::Second),
            _ => None,
        }
    }
}

impl fmt::Display for AdvanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request status.
///
/// The only transitions are `UnderReview → Approved` and
/// `UnderReview → Rejected`, and both happen at finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdvanceStatus {
    /// Waiting for the admin.
    UnderReview,
    /// Confirmed approved.
    Approved,
    /// Confirmed rejected.
    Rejected,
}

impl AdvanceStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnderReview => "UNDER_REVIEW",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "UNDER_REVIEW" => Some(Self::UnderReview),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for AdvanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Provisional admin decision, recorded before finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminDecision {
    /// Will be approved at finalization.
    Approved,
    /// Will be rejected at finalization.
    Rejected,
}

impl AdminDecision {
    /// Returns the string representation of the decision.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.as_status().as_str()
    }

    /// Parses a decision; `UNDER_REVIEW` and unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match AdvanceStatus::parse(s)? {
            AdvanceStatus::Approved => Some(Self::Approved),
            AdvanceStatus::Rejected => Some(Self::Rejected),
            AdvanceStatus::UnderReview => None,
        }
    }

    /// The status a request takes when this decision is finalized.
    #[must_use]
    pub const fn as_status(&self) -> AdvanceStatus {
        match self {
            Self::Approved => AdvanceStatus::Approved,
            Self::Rejected => AdvanceStatus::Rejected,
        }
    }
}

/// Submission window for one advance type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancePeriod {
    /// Period ID.
    pub id: Uuid,
    /// Advance type the window applies to.
    pub advance_type: AdvanceType,
    /// First day requests are accepted.
    pub start_date: NaiveDate,
    /// Last day requests are accepted.
    pub end_date: NaiveDate,
    /// Inactive periods never accept requests.
    pub is_active: bool,
}

impl AdvancePeriod {
    /// Returns true if requests are accepted on `today`.
    #[must_use]
    pub fn is_open_on(&self, today: NaiveDate) -> bool {
        self.is_active && self.start_date <= today && today <= self.end_date
    }
}

/// Admin input for a period window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSettings {
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
    /// Whether the window accepts requests.
    pub is_active: bool,
}

/// Snapshot of a stored advance request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceRequest {
    /// Request ID.
    pub id: Uuid,
    /// Requesting employee.
    pub user_id: Uuid,
    /// Advance type.
    pub advance_type: AdvanceType,
    /// Period the request was filed in.
    pub period_id: Uuid,
    /// Requested amount.
    pub amount: Decimal,
    /// Free-text notes.
    pub notes: String,
    /// Current status.
    pub status: AdvanceStatus,
    /// Provisional admin decision.
    pub admin_decision: Option<AdminDecision>,
    /// Set when an admin decision exists; blocks employee edits.
    pub user_locked: bool,
    /// Set at finalization; blocks every edit.
    pub locked: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl AdvanceRequest {
    /// Returns true while the employee may still edit or withdraw the request.
    #[must_use]
    pub fn is_owner_editable(&self) -> bool {
        self.status == AdvanceStatus::UnderReview
            && !self.locked
            && self.admin_decision.is_none()
            && !self.user_locked
    }

    /// Returns true if the request still blocks finalization.
    #[must_use]
    pub fn is_undecided(&self) -> bool {
        self.status == AdvanceStatus::UnderReview && self.admin_decision.is_none()
    }
}

/// Employee input for a new request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitAdvance {
    /// Requested advance type.
    pub advance_type: AdvanceType,
    /// Requested amount.
    pub amount: Decimal,
    /// Optional notes.
    #[serde(default)]
    pub notes: String,
}

/// A validated request ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAdvanceRequest {
    /// Requesting employee.
    pub user_id: Uuid,
    /// Advance type.
    pub advance_type: AdvanceType,
    /// Period the request is filed in.
    pub period_id: Uuid,
    /// Requested amount.
    pub amount: Decimal,
    /// Notes.
    pub notes: String,
}

/// Admin edit of a not-yet-finalized request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminEdit {
    /// New amount; `None` keeps the stored one.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// New notes; `None` keeps the stored ones.
    #[serde(default)]
    pub notes: Option<String>,
    /// Decision after the edit; `None` clears any provisional decision.
    #[serde(default)]
    pub decision: Option<AdminDecision>,
}

/// Field values after an admin edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminEditOutcome {
    /// Amount to store.
    pub amount: Decimal,
    /// Notes to store.
    pub notes: String,
    /// Decision to store.
    pub admin_decision: Option<AdminDecision>,
    /// Employee lock to store.
    pub user_locked: bool,
}

/// Cycle filter of the admin list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleFilter {
    /// Employees with both types finalized in the active periods.
    Complete,
    /// Everyone else.
    Incomplete,
}

/// Filters of the admin request list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFilter {
    /// Only this status.
    pub status: Option<AdvanceStatus>,
    /// Only this type.
    #[serde(rename = "type")]
    pub advance_type: Option<AdvanceType>,
    /// `true`: finalized only, `false`: under review only.
    pub complete: Option<bool>,
    /// Cycle filter.
    pub cycle: Option<CycleFilter>,
    /// Case-insensitive search on username and names.
    pub q: Option<String>,
}

/// Returns the employees who have a finalized request of every advance type.
///
/// `finalized` yields `(user_id, advance_type)` for finalized requests that
/// belong to currently active periods.
pub fn completed_cycle_users<I>(finalized: I) -> HashSet<Uuid>
where
    I: IntoIterator<Item = (Uuid, AdvanceType)>,
{
    let mut seen: HashMap<Uuid, HashSet<AdvanceType>> = HashMap::new();
    for (user_id, advance_type) in finalized {
        seen.entry(user_id).or_default().insert(advance_type);
    }
    seen.into_iter()
        .filter(|(_, types)| types.len() == AdvanceType::ALL.len())
        .map(|(user_id, _)| user_id)
        .collect()
}
