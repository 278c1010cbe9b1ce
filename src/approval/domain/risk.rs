//! Heuristic risk scoring for approval targets.
//!
//! Matching is plain substring search on the raw target, so a path such as
//! `not_a_secret.py` still counts as sensitive.

use super::ApprovalType;
use serde::{Deserialize, Serialize};

/// Highest risk score an approval can carry.
pub const MAX_RISK_SCORE: u8 = 5;

/// Case-sensitive fragments that make a target more dangerous.
const DANGEROUS_PATTERNS: [&str; 6] = ["rm ", "sudo", "DROP", "DELETE", "--force", "-rf"];

/// Fragments of sensitive locations, matched against the lowercased target.
const SENSITIVE_PATHS: [&str; 5] = [".env", "credentials", "secret", "password", ".git/"];

/// Risk score between 1 and [`MAX_RISK_SCORE`] with its explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Score, higher is riskier.
    pub score: u8,
    /// Comma-separated reasons, or `standard <type>` when nothing matched.
    pub reason: String,
}

/// Scores an action from its type and target.
///
/// Every dangerous pattern and every sensitive path found adds one point on
/// top of the type's base score, capped at [`MAX_RISK_SCORE`].
///
/// # Examples
///
/// ```
/// use parapet::approval::domain::{ApprovalType, assess_risk};
///
/// let risk = assess_risk(ApprovalType::BashCommand, "rm -rf /tmp/x");
/// assert_eq!(risk.score, 5);
/// assert_eq!(risk.reason, "contains 'rm ', contains '-rf'");
///
/// let risk = assess_risk(ApprovalType::FileEdit, "README.md");
/// assert_eq!(risk.score, 2);
/// assert_eq!(risk.reason, "standard file_edit");
/// ```
#[must_use]
pub fn assess_risk(approval_type: ApprovalType, target: &str) -> RiskAssessment {
    let mut score = approval_type.base_risk();
    let mut reasons = Vec::new();

    for pattern in DANGEROUS_PATTERNS {
        if target.contains(pattern) {
            score = bump(score);
            reasons.push(format!("contains '{pattern}'"));
        }
    }

    let lowered = target.to_lowercase();
    for path in SENSITIVE_PATHS {
        if lowered.contains(path) {
            score = bump(score);
            reasons.push(format!("touches sensitive path '{path}'"));
        }
    }

    let reason = if reasons.is_empty() {
        format!("standard {approval_type}")
    } else {
        reasons.join(", ")
    };
    RiskAssessment { score, reason }
}

fn bump(score: u8) -> u8 {
    score.saturating_add(1).min(MAX_RISK_SCORE)
}
