/// Tool run when the app comes back to the foreground

use crate::tracker::{ResumeReport, Tracker};

/// Auto-mark today and reconcile the fasting cycle
pub fn app_resume(tracker: &mut Tracker) -> (ResumeReport, String) {
    let report = tracker.on_resume();

    let mut lines = Vec::new();
    if report.auto_marked.is_empty() {
        lines.push("📅 All active habits already have an entry for today.".to_string());
    } else {
        let names: Vec<String> = report
            .auto_marked
            .iter()
            .filter_map(|id| tracker.habit(*id).map(|h| h.name.clone()))
            .collect();
        lines.push(format!("✅ Marked today as a success for: {}", names.join(", ")));
    }
    match (&report.current_session, report.started_fast) {
        (Some(session), true) => lines.push(format!(
            "🍽️ Eating window over, started the next fast.\nSession ID: {}",
            session.id
        )),
        (Some(session), false) => {
            lines.push(format!("⏳ Fast in progress.\nSession ID: {}", session.id))
        }
        (None, _) => {}
    }

    (report, lines.join("\n"))
}
