//! Timelines read back from a wired core.

use super::helpers::core;
use crate::test_helpers::args;
use eyre::ensure;
use parapet::audit::services::TimelineQuery;
use parapet::gateway::domain::ToolCallRequest;
use rstest::rstest;
use serde_json::json;

#[rstest]
fn timeline_summarises_a_run() -> eyre::Result<()> {
    let core = core()?;
    core.context.gateway().handle(ToolCallRequest::new(
        core.run.id(),
        "Read",
        args(json!({"file_path": ".env"})),
    ))?;
    core.context.runs().complete(core.run.id())?;

    let page = core
        .context
        .timeline()
        .timeline(TimelineQuery::new(core.run.id()))?;
    let summaries: Vec<&str> = page
        .events
        .iter()
        .map(|entry| entry.summary.as_str())
        .collect();
    ensure!(
        summaries
            == [
                "run started",
                "tool called Read",
                "tool denied .env",
                "run completed",
            ],
        "unexpected summaries: {summaries:?}"
    );
    ensure!(!page.has_more);
    Ok(())
}

#[rstest]
fn timeline_pages_with_a_cursor() -> eyre::Result<()> {
    let core = core()?;
    for _ in 0..3 {
        core.context.gateway().handle(ToolCallRequest::new(
            core.run.id(),
            "Grep",
            args(json!({"pattern": "fn main"})),
        ))?;
    }

    let first = core
        .context
        .timeline()
        .timeline(TimelineQuery::new(core.run.id()).limit(4))?;
    ensure!(first.events.len() == 4);
    ensure!(first.has_more);

    let cursor = first
        .latest_event_id
        .ok_or_else(|| eyre::eyre!("first page has no cursor"))?;
    let rest = core
        .context
        .timeline()
        .timeline(TimelineQuery::new(core.run.id()).since(cursor))?;
    ensure!(rest.events.len() == 3);
    ensure!(!rest.has_more);
    Ok(())
}
