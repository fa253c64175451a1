//! Facts consumed from the onboarding and payment collaborators.
//!
//! Both facts may be delivered more than once, so every consumer of them
//! must be safe to replay.

use serde::{Deserialize, Serialize};

use crate::batch::BatchMode;
use crate::ledger::{validate_credit_amount, Balances};
use crate::types::{Credits, DbId};

/// Maximum length of an external payment reference.
pub const MAX_REFERENCE_LEN: usize = 128;

/// A student finished onboarding; their wallet and batch links must exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentOnboarded {
    pub student_id: DbId,
    pub student_number: String,
    pub name: String,
    pub email: Option<String>,
    #[serde(default)]
    pub initial_online_credit: Credits,
    #[serde(default)]
    pub initial_offline_credit: Credits,
    /// Batches collected at invitation time.
    #[serde(default)]
    pub enroll_targets: Vec<DbId>,
}

impl StudentOnboarded {
    pub fn validate(&self) -> Result<(), String> {
        if self.student_number.trim().is_empty() {
            return Err("student_number must not be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        validate_credit_amount(self.initial_online_credit, true)?;
        validate_credit_amount(self.initial_offline_credit, true)?;
        Ok(())
    }

    pub fn initial_balances(&self) -> Balances {
        Balances {
            online: self.initial_online_credit,
            offline: self.initial_offline_credit,
        }
    }

    /// Enrollment targets with duplicates removed, first occurrence kept.
    pub fn distinct_targets(&self) -> Vec<DbId> {
        let mut seen = Vec::with_capacity(self.enroll_targets.len());
        for &id in &self.enroll_targets {
            if !seen.contains(&id) {
                seen.push(id);
            }
        }
        seen
    }
}

/// A top-up payment settled; its amount goes into the matching bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopUpSettled {
    pub student_id: DbId,
    pub mode: BatchMode,
    pub amount: Credits,
    /// Payment-provider reference; repeats are ignored.
    pub reference: Option<String>,
}

impl TopUpSettled {
    pub fn validate(&self) -> Result<(), String> {
        validate_credit_amount(self.amount, false)?;
        if let Some(reference) = &self.reference {
            let trimmed = reference.trim();
            if trimmed.is_empty() {
                return Err("reference must not be blank when present".to_string());
            }
            if trimmed.len() > MAX_REFERENCE_LEN {
                return Err(format!(
                    "reference must be at most {MAX_REFERENCE_LEN} characters"
                ));
            }
        }
        Ok(())
    }
}

/// Per-target result of the automated enrollment path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentOutcome {
    Enrolled,
    AlreadyEnrolled,
    Failed { reason: String },
}

impl EnrollmentOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Outcome for one enrollment target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetOutcome {
    pub batch_id: DbId,
    #[serde(flatten)]
    pub outcome: EnrollmentOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn onboarded() -> StudentOnboarded {
        StudentOnboarded {
            student_id: 7,
            student_number: "GZST0007".to_string(),
            name: "Asha".to_string(),
            email: None,
            initial_online_credit: 12_000,
            initial_offline_credit: 0,
            enroll_targets: vec![3, 4, 3],
        }
    }

    #[test]
    fn valid_onboarding_passes() {
        assert!(onboarded().validate().is_ok());
    }

    #[test]
    fn negative_initial_credit_rejected() {
        let mut fact = onboarded();
        fact.initial_offline_credit = -1;
        assert!(fact.validate().is_err());
    }

    #[test]
    fn blank_student_number_rejected() {
        let mut fact = onboarded();
        fact.student_number = "  ".to_string();
        assert!(fact.validate().unwrap_err().contains("student_number"));
    }

    #[test]
    fn targets_are_deduplicated_in_order() {
        assert_eq!(onboarded().distinct_targets(), vec![3, 4]);
    }

    #[test]
    fn onboarding_fact_defaults_missing_fields() {
        let fact: StudentOnboarded = serde_json::from_value(serde_json::json!({
            "student_id": 1,
            "student_number": "GZST0001",
            "name": "Ravi"
        }))
        .unwrap();
        assert_eq!(fact.initial_balances(), Balances::default());
        assert!(fact.enroll_targets.is_empty());
    }

    #[test]
    fn top_up_requires_positive_amount() {
        let fact = TopUpSettled {
            student_id: 1,
            mode: BatchMode::Online,
            amount: 0,
            reference: None,
        };
        assert!(fact.validate().is_err());
    }

    #[test]
    fn top_up_rejects_blank_reference() {
        let fact = TopUpSettled {
            student_id: 1,
            mode: BatchMode::Offline,
            amount: 1500,
            reference: Some(" ".to_string()),
        };
        assert!(fact.validate().is_err());
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let value = serde_json::to_value(TargetOutcome {
            batch_id: 9,
            outcome: EnrollmentOutcome::Failed {
                reason: "Batch 9 not found".to_string(),
            },
        })
        .unwrap();
        assert_eq!(value["batch_id"], 9);
        assert_eq!(value["outcome"], "FAILED");
        assert_eq!(value["reason"], "Batch 9 not found");
    }
}
