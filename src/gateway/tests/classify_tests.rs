//! Mapping of parked calls onto approval categories.

use super::args;
use crate::approval::domain::ApprovalType;
use crate::gateway::domain::approval_subject;
use rstest::rstest;
use serde_json::{Value, json};

#[rstest]
#[case("Edit", json!({"file_path": "src/lib.rs"}), ApprovalType::FileEdit, "src/lib.rs")]
#[case("write_tool", json!({"file_path": "new.txt"}), ApprovalType::FileCreate, "new.txt")]
#[case("Bash", json!({"command": "git push origin main"}), ApprovalType::GitPush, "git push origin main")]
#[case("Bash", json!({"command": "rm build.log"}), ApprovalType::FileDelete, "rm build.log")]
#[case("Bash", json!({"command": "rmdir build"}), ApprovalType::BashCommand, "rmdir build")]
#[case("Bash", json!({"command": "cargo test"}), ApprovalType::BashCommand, "cargo test")]
#[case("NotebookEdit", json!({"path": "nb.ipynb"}), ApprovalType::FileEdit, "nb.ipynb")]
#[case("WebFetch", json!({"url": "https://example.com"}), ApprovalType::BashCommand, "WebFetch")]
#[case("Bash", json!({}), ApprovalType::BashCommand, "Bash")]
fn approval_subject_for_call(
    #[case] tool: &str,
    #[case] invocation: Value,
    #[case] expected_type: ApprovalType,
    #[case] expected_target: &str,
) {
    let (approval_type, target) = approval_subject(tool, &args(invocation));
    assert_eq!(approval_type, expected_type);
    assert_eq!(target, expected_target);
}
