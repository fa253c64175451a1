//! Attendance transitions and dual-bucket wallet arithmetic.
//!
//! The wallet effect of marking attendance is decided solely by the
//! previously recorded status and the new one, never by a running counter.
//! That makes re-marking naturally idempotent: a second PRESENT in a row is
//! a no-op, and a PRESENT -> ABSENT correction refunds exactly what the
//! first mark deducted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::batch::BatchMode;
use crate::types::Credits;

/// Default per-session tariff, in whole currency units.
pub const DEFAULT_SESSION_COST: Credits = 1500;

/// Default number of sessions a purchased bundle covers.
pub const DEFAULT_SESSIONS_PER_BUNDLE: i64 = 12;

/// Warning attached when a transition needs a wallet the student lacks.
pub const WARN_NO_WALLET: &str = "No credit wallet found; attendance saved without charge";

// ---------------------------------------------------------------------------
// Attendance status
// ---------------------------------------------------------------------------

/// A recorded attendance fact for one (student, session) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "PRESENT",
            Self::Absent => "ABSENT",
        }
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PRESENT" => Ok(Self::Present),
            "ABSENT" => Ok(Self::Absent),
            _ => Err(format!(
                "Invalid attendance status '{value}'. Must be one of: PRESENT, ABSENT"
            )),
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status shown on a session roster. Enrolled students without a record are
/// listed as `UNMARKED`, never omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RosterStatus {
    Present,
    Absent,
    Unmarked,
}

impl From<Option<AttendanceStatus>> for RosterStatus {
    fn from(status: Option<AttendanceStatus>) -> Self {
        match status {
            Some(AttendanceStatus::Present) => Self::Present,
            Some(AttendanceStatus::Absent) => Self::Absent,
            None => Self::Unmarked,
        }
    }
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

/// Wallet effect of an attendance write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerAction {
    Deduct,
    Refund,
    None,
}

impl LedgerAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deduct => "DEDUCT",
            Self::Refund => "REFUND",
            Self::None => "NONE",
        }
    }

    pub fn moves_money(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for LedgerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The transition table.
///
/// | existing  | new     | action |
/// |-----------|---------|--------|
/// | none      | PRESENT | DEDUCT |
/// | none      | ABSENT  | NONE   |
/// | PRESENT   | ABSENT  | REFUND |
/// | ABSENT    | PRESENT | DEDUCT |
/// | same      | same    | NONE   |
pub fn transition(existing: Option<AttendanceStatus>, new: AttendanceStatus) -> LedgerAction {
    use AttendanceStatus::{Absent, Present};

    match (existing, new) {
        (None, Present) => LedgerAction::Deduct,
        (None, Absent) => LedgerAction::None,
        (Some(Present), Absent) => LedgerAction::Refund,
        (Some(Absent), Present) => LedgerAction::Deduct,
        (Some(Present), Present) | (Some(Absent), Absent) => LedgerAction::None,
    }
}

// ---------------------------------------------------------------------------
// Tariff & balances
// ---------------------------------------------------------------------------

/// Fixed per-session cost for each mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tariff {
    pub online: Credits,
    pub offline: Credits,
}

impl Tariff {
    pub fn new(online: Credits, offline: Credits) -> Result<Self, String> {
        if online < 0 || offline < 0 {
            return Err("Session costs must not be negative".to_string());
        }
        Ok(Self { online, offline })
    }

    pub fn cost_for(&self, mode: BatchMode) -> Credits {
        match mode {
            BatchMode::Online => self.online,
            BatchMode::Offline => self.offline,
        }
    }
}

impl Default for Tariff {
    fn default() -> Self {
        Self {
            online: DEFAULT_SESSION_COST,
            offline: DEFAULT_SESSION_COST,
        }
    }
}

/// The two independent balances of a student's wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Balances {
    pub online: Credits,
    pub offline: Credits,
}

impl Balances {
    pub fn get(&self, bucket: BatchMode) -> Credits {
        match bucket {
            BatchMode::Online => self.online,
            BatchMode::Offline => self.offline,
        }
    }

    pub fn set(&mut self, bucket: BatchMode, value: Credits) {
        match bucket {
            BatchMode::Online => self.online = value,
            BatchMode::Offline => self.offline = value,
        }
    }
}

/// Validate a credit amount coming from a payment or onboarding fact.
pub fn validate_credit_amount(amount: Credits, allow_zero: bool) -> Result<(), String> {
    if amount < 0 || (!allow_zero && amount == 0) {
        let bound = if allow_zero { "non-negative" } else { "positive" };
        return Err(format!("Credit amount must be {bound}, got {amount}"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Bucket arithmetic
// ---------------------------------------------------------------------------

/// Result of applying an action to one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BucketEffect {
    pub balance_before: Credits,
    pub balance_after: Credits,
    /// Signed change actually applied. A clamped deduction moves less than
    /// the tariff.
    pub delta: Credits,
    pub clamped: bool,
}

/// Apply `action` at `cost` to a bucket holding `balance`.
///
/// A deduction larger than the balance clamps the bucket to exactly zero.
/// Refunds have no upper bound.
pub fn apply_action(balance: Credits, action: LedgerAction, cost: Credits) -> BucketEffect {
    let (balance_after, clamped) = match action {
        LedgerAction::Deduct if balance < cost => (0, true),
        LedgerAction::Deduct => (balance - cost, false),
        LedgerAction::Refund => (balance.saturating_add(cost), false),
        LedgerAction::None => (balance, false),
    };
    BucketEffect {
        balance_before: balance,
        balance_after,
        delta: balance_after - balance,
        clamped,
    }
}

/// Warning text for a clamped deduction.
pub fn insufficient_balance_warning(bucket: BatchMode) -> String {
    format!("Insufficient {bucket} balance, reset to 0")
}

// ---------------------------------------------------------------------------
// Mark planning
// ---------------------------------------------------------------------------

/// Everything the persistence layer needs to write for one attendance mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkPlan {
    pub action: LedgerAction,
    pub bucket: BatchMode,
    pub cost: Credits,
    /// `None` when no money moves, either because the action is NONE or
    /// because the student has no wallet.
    pub effect: Option<BucketEffect>,
    pub warning: Option<String>,
}

/// Decide the wallet effect of marking `new` over `existing`.
///
/// `wallet_balance` is the current balance of the session's bucket, or
/// `None` if the student has no wallet. The wallet is only consulted when
/// the action moves money.
pub fn plan_mark(
    existing: Option<AttendanceStatus>,
    new: AttendanceStatus,
    bucket: BatchMode,
    cost: Credits,
    wallet_balance: Option<Credits>,
) -> MarkPlan {
    let action = transition(existing, new);
    let (effect, warning) = match (action.moves_money(), wallet_balance) {
        (false, _) => (None, None),
        (true, None) => (None, Some(WARN_NO_WALLET.to_string())),
        (true, Some(balance)) => {
            let effect = apply_action(balance, action, cost);
            let warning = effect.clamped.then(|| insufficient_balance_warning(bucket));
            (Some(effect), warning)
        }
    };
    MarkPlan {
        action,
        bucket,
        cost,
        effect,
        warning,
    }
}

// ---------------------------------------------------------------------------
// Journal
// ---------------------------------------------------------------------------

/// Kind of a wallet journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JournalKind {
    OnboardingCredit,
    TopUp,
    Deduct,
    Refund,
}

impl JournalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnboardingCredit => "ONBOARDING_CREDIT",
            Self::TopUp => "TOP_UP",
            Self::Deduct => "DEDUCT",
            Self::Refund => "REFUND",
        }
    }

    /// Journal kind for an attendance action, if it moves money.
    pub fn for_action(action: LedgerAction) -> Option<Self> {
        match action {
            LedgerAction::Deduct => Some(Self::Deduct),
            LedgerAction::Refund => Some(Self::Refund),
            LedgerAction::None => None,
        }
    }
}

/// Sessions left in a bundle after `attended` PRESENT marks, floored at zero.
pub fn remaining_sessions(sessions_per_bundle: i64, attended: i64) -> i64 {
    (sessions_per_bundle - attended).max(0)
}
