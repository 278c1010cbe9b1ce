//! Unit tests for rule parsing and pattern matching.

use super::args;
use crate::policy::domain::{PermissionRule, RuleMatcher, ToolKind};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case("Read", "Read", None)]
#[case("  Edit(src/**/*.py)  ", "Edit", Some("src/**/*.py"))]
#[case("Bash(npm run:*)", "Bash", Some("npm run:*"))]
#[case("Read(.env*)", "Read", Some(".env*"))]
#[case("read_tool(docs/*)", "read_tool", Some("docs/*"))]
fn parse_splits_tool_and_pattern(
    #[case] raw: &str,
    #[case] tool_name: &str,
    #[case] pattern: Option<&str>,
) {
    let rule = PermissionRule::parse(raw);

    assert!(rule.is_well_formed());
    assert_eq!(rule.tool_name(), tool_name);
    assert_eq!(rule.pattern(), pattern);
}

#[rstest]
#[case("")]
#[case("Bash(")]
#[case("Bash()")]
#[case("my-tool")]
#[case("(pattern)")]
fn malformed_rules_match_nothing(#[case] raw: &str) {
    let rule = PermissionRule::parse(raw);

    assert!(!rule.is_well_formed());
    assert!(matches!(rule.matcher(), RuleMatcher::Never));
    assert!(!rule.matches(raw, &args(json!({"command": "ls", "file_path": "a"}))));
}

#[test]
fn rule_without_pattern_matches_every_invocation() {
    let rule = PermissionRule::parse("Bash");

    assert!(rule.matches("Bash", &args(json!({}))));
    assert!(rule.matches("Bash", &args(json!({"command": "rm -rf /"}))));
    assert!(!rule.matches("Read", &args(json!({"file_path": "a.txt"}))));
}

#[rstest]
#[case("Edit", "edit_tool")]
#[case("bash_tool", "Bash")]
#[case("Glob", "glob_tool")]
fn aliases_are_folded_before_comparison(#[case] rule_tool: &str, #[case] invoked: &str) {
    let rule = PermissionRule::parse(rule_tool);

    assert!(rule.matches(invoked, &args(json!({}))));
}

#[test]
fn unknown_tools_compare_literally() {
    let rule = PermissionRule::parse("WebFetch");

    assert!(rule.matches("WebFetch", &args(json!({}))));
    assert!(!rule.matches("webfetch", &args(json!({}))));
}

#[rstest]
#[case("Bash(npm run:*)", "npm run test", true)]
#[case("Bash(npm run:*)", "npm run", true)]
#[case("Bash(npm run:*)", "npm install", false)]
#[case("Bash(npm run:*)", "echo npm run test", false)]
#[case("Bash(git *)", "git status", true)]
#[case("Bash(git *)", "gitk", false)]
fn command_patterns(#[case] raw: &str, #[case] command: &str, #[case] expected: bool) {
    let rule = PermissionRule::parse(raw);

    assert_eq!(
        rule.matches("Bash", &args(json!({"command": command}))),
        expected
    );
}

#[rstest]
#[case("Edit(src/**/*.py)", "src/main.py", true)]
#[case("Edit(src/**/*.py)", "src/a/b/c/main.py", true)]
#[case("Edit(src/**/*.py)", "src/main.rs", false)]
#[case("Edit(src/**/*.py)", "lib/src/main.py", false)]
#[case("Edit(src/**/*.py)", "src/main_py", false)]
#[case("Edit(**/*.rs)", "lib.rs", true)]
#[case("Edit(**/*.rs)", "crates/core/lib.rs", true)]
#[case("Edit(docs/**)", "docs/a/b.md", true)]
#[case("Edit(docs/**)", "doc/a.md", false)]
#[case("Edit(src/*/mod.rs)", "src/policy/mod.rs", true)]
#[case("Read(.env*)", ".env", true)]
#[case("Read(.env*)", ".env.local", true)]
#[case("Read(.env*)", "config/.env", false)]
#[case("Read(*.md)", "docs/readme.md", true)]
#[case("Read(*.MD)", "readme.md", false)]
#[case("Read(*.{md,txt})", "notes.md", false)]
#[case("Read(*.{md,txt})", "notes.{md,txt}", true)]
#[case("Read([abc)", "[abc", true)]
#[case("Read([abc)", "a", false)]
#[case("Read(file[0-9].log)", "file7.log", true)]
#[case("Read(file[{}].log)", "file{.log", true)]
fn path_patterns(#[case] raw: &str, #[case] path: &str, #[case] expected: bool) {
    let rule = PermissionRule::parse(raw);
    let tool = rule.tool_name().to_owned();

    assert_eq!(
        rule.matches(&tool, &args(json!({"file_path": path}))),
        expected
    );
}

#[test]
fn pattern_rule_without_argument_does_not_match() {
    let rule = PermissionRule::parse("Edit(src/**)");

    assert!(!rule.matches("Edit", &args(json!({}))));
    assert!(!rule.matches("Edit", &args(json!({"file_path": ""}))));
    assert!(!rule.matches("Edit", &args(json!({"file_path": 42}))));
}

#[test]
fn search_tools_prefer_path_over_pattern() {
    let rule = PermissionRule::parse("Grep(src/**)");

    assert!(rule.matches(
        "Grep",
        &args(json!({"path": "src/lib", "pattern": "TODO"}))
    ));
    assert!(!rule.matches("Grep", &args(json!({"pattern": "TODO"}))));
    assert!(rule.matches("grep_tool", &args(json!({"pattern": "src/x"}))));
}

#[test]
fn unknown_tool_falls_back_through_common_arguments() {
    let rule = PermissionRule::parse("Custom(/tmp/*)");

    assert!(rule.matches("Custom", &args(json!({"path": "/tmp/x"}))));
    assert!(rule.matches("Custom", &args(json!({"command": "/tmp/run"}))));
    assert!(!rule.matches("Custom", &args(json!({"target": "/tmp/x"}))));
}

#[test]
fn match_values_follow_tool_kind() {
    let invocation = args(json!({"file_path": "a.rs", "command": "ls", "path": "src"}));

    assert_eq!(ToolKind::Write.match_value(&invocation), Some("a.rs"));
    assert_eq!(ToolKind::Bash.match_value(&invocation), Some("ls"));
    assert_eq!(ToolKind::Glob.match_value(&invocation), Some("src"));
}
