//! Per-process ledger counters.
//!
//! Counters start at zero on every boot and are not persisted. The wallet
//! journal is the durable record; these only give operators a quick view of
//! what this process has done.

use std::sync::atomic::{AtomicU64, Ordering};

use classroll_core::ledger::LedgerAction;
use classroll_db::models::attendance::MarkOutcome;
use serde::Serialize;

#[derive(Debug, Default)]
pub struct LedgerMetrics {
    marks: AtomicU64,
    deductions: AtomicU64,
    refunds: AtomicU64,
    clamped_deductions: AtomicU64,
    unbilled_marks: AtomicU64,
    top_ups: AtomicU64,
    duplicate_top_ups: AtomicU64,
    onboardings: AtomicU64,
}

/// Point-in-time copy of [`LedgerMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerMetricsSnapshot {
    pub marks: u64,
    pub deductions: u64,
    pub refunds: u64,
    pub clamped_deductions: u64,
    /// Marks that should have moved money but found no wallet.
    pub unbilled_marks: u64,
    pub top_ups: u64,
    pub duplicate_top_ups: u64,
    pub onboardings: u64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl LedgerMetrics {
    pub fn record_mark(&self, outcome: &MarkOutcome) {
        bump(&self.marks);
        if outcome.action.moves_money() && outcome.new_balance.is_none() {
            bump(&self.unbilled_marks);
            return;
        }
        match outcome.action {
            LedgerAction::Deduct => bump(&self.deductions),
            LedgerAction::Refund => bump(&self.refunds),
            LedgerAction::None => {}
        }
        if outcome.clamped {
            bump(&self.clamped_deductions);
        }
    }

    pub fn record_top_up(&self, duplicate: bool) {
        if duplicate {
            bump(&self.duplicate_top_ups);
        } else {
            bump(&self.top_ups);
        }
    }

    pub fn record_onboarding(&self) {
        bump(&self.onboardings);
    }

    pub fn snapshot(&self) -> LedgerMetricsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        LedgerMetricsSnapshot {
            marks: load(&self.marks),
            deductions: load(&self.deductions),
            refunds: load(&self.refunds),
            clamped_deductions: load(&self.clamped_deductions),
            unbilled_marks: load(&self.unbilled_marks),
            top_ups: load(&self.top_ups),
            duplicate_top_ups: load(&self.duplicate_top_ups),
            onboardings: load(&self.onboardings),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use classroll_core::batch::BatchMode;
    use classroll_db::models::attendance::AttendanceRecord;

    use super::*;

    fn outcome(action: LedgerAction, new_balance: Option<i64>, clamped: bool) -> MarkOutcome {
        let now = Utc::now();
        MarkOutcome {
            record: AttendanceRecord {
                id: 1,
                student_id: 1,
                session_id: 1,
                status: "PRESENT".to_string(),
                marked_at: now,
                created_at: now,
                updated_at: now,
            },
            action,
            bucket: BatchMode::Online,
            cost: 1000,
            new_balance,
            warning: None,
            clamped,
        }
    }

    #[test]
    fn marks_are_classified() {
        let metrics = LedgerMetrics::default();
        metrics.record_mark(&outcome(LedgerAction::Deduct, Some(0), true));
        metrics.record_mark(&outcome(LedgerAction::Refund, Some(1000), false));
        metrics.record_mark(&outcome(LedgerAction::None, Some(1000), false));
        metrics.record_mark(&outcome(LedgerAction::Deduct, None, false));

        let snap = metrics.snapshot();
        assert_eq!(snap.marks, 4);
        assert_eq!(snap.deductions, 1);
        assert_eq!(snap.refunds, 1);
        assert_eq!(snap.clamped_deductions, 1);
        assert_eq!(snap.unbilled_marks, 1);
    }

    #[test]
    fn duplicate_top_ups_are_counted_apart() {
        let metrics = LedgerMetrics::default();
        metrics.record_top_up(false);
        metrics.record_top_up(true);
        metrics.record_top_up(true);

        let snap = metrics.snapshot();
        assert_eq!(snap.top_ups, 1);
        assert_eq!(snap.duplicate_top_ups, 2);
    }
}
