use serde_json::Value;

use super::{author, code, parse_event};
use crate::github::WorkflowRunEvent;
use crate::message::{Color, NotificationMessage};

/// Render a completed `workflow_run` that succeeded or failed.
pub fn render_workflow_run(payload: &Value) -> Option<NotificationMessage> {
    let event: WorkflowRunEvent = parse_event("workflow_run", payload)?;
    if event.action.as_deref() != Some("completed") {
        return None;
    }
    let run = event.workflow_run.as_ref()?;
    let workflow = event.workflow.as_ref()?;

    let (title, color, conclusion) = match run.conclusion.as_deref() {
        Some("success") => ("Workflow Run Succeeded", Color::Success, "✅ Success"),
        Some("failure") => ("Workflow Run Failed", Color::Failure, "❌ Failure"),
        // cancelled, skipped, timed_out, ...
        _ => return None,
    };

    let mut msg = NotificationMessage::new(format!("{title}: {}", workflow.name), color);
    if let Some(link) = run.link() {
        msg = msg.with_url(link);
    }
    if let Some(branch) = &run.head_branch {
        msg = msg.with_field("Branch", code(branch), true);
    }
    Some(
        msg.with_field("Conclusion", conclusion, true)
            .with_author(author(&run.actor))
            .with_footer(format!("Workflow Run ID: {}", run.id)),
    )
}
