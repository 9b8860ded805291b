//! Plain-text report rendering.

use portside_core::domain::interaction::InteractionRecord;
use portside_core::domain::session::SessionId;
use portside_core::observability::{
    ConfusionMatrix, HistoricalSummary, InteractionSummary, ToolAccuracy,
};

const RULE: &str = "======================================================================";
const QUESTION_PREVIEW_CHARS: usize = 50;

pub fn summary(title: &str, session_id: Option<&SessionId>, stats: &InteractionSummary) -> String {
    let mut lines = vec![RULE.to_string(), title.to_string(), RULE.to_string()];
    if let Some(session_id) = session_id {
        lines.push(format!("Session ID: {session_id}"));
    }

    if stats.is_empty() {
        lines.push("No interactions recorded yet.".to_string());
        return lines.join("\n");
    }

    lines.push(format!("Total interactions: {}", stats.total_interactions));
    lines.push(format!("Tool selection accuracy: {:.1}%", stats.tool_selection_accuracy));
    lines.push(format!("Success rate: {:.1}%", stats.success_rate));
    lines.push(format!("Failed interactions: {}", stats.failed_interactions));

    if let Some(timing) = &stats.response_time {
        lines.push(format!(
            "Response time: avg {:.2}s, min {:.2}s, max {:.2}s",
            timing.mean_seconds, timing.min_seconds, timing.max_seconds
        ));
    }

    lines.push("Tool usage:".to_string());
    for (tool, count) in &stats.tool_distribution {
        let share = *count as f64 / stats.total_interactions as f64 * 100.0;
        lines.push(format!("  {tool}: {count} ({share:.1}%)"));
    }

    lines.join("\n")
}

pub fn accuracy(report: &[ToolAccuracy]) -> String {
    if report.is_empty() {
        return "Tool accuracy: no interactions with an expected tool.".to_string();
    }

    let width = report.iter().map(|row| row.expected_tool.len()).max().unwrap_or(0).max(13);
    let mut lines = vec![
        "Tool accuracy:".to_string(),
        format!("  {:<width$}  {:>5}  {:>7}  {:>8}", "expected tool", "tests", "correct", "accuracy"),
    ];
    for row in report {
        lines.push(format!(
            "  {:<width$}  {:>5}  {:>7}  {:>7.1}%",
            row.expected_tool, row.total_tests, row.correct_selections, row.accuracy
        ));
    }
    lines.join("\n")
}

/// Rows are expected tools, columns the tool actually selected.
pub fn confusion(matrix: &ConfusionMatrix) -> String {
    if matrix.is_empty() {
        return "Confusion matrix: no interactions with an expected tool.".to_string();
    }

    let labels = matrix.labels();
    let first_width = labels.iter().map(String::len).max().unwrap_or(0).max("expected \\ actual".len());
    let column_width = labels.iter().map(String::len).max().unwrap_or(0).max(5);

    let mut header = format!("  {:<first_width$}", "expected \\ actual");
    for label in labels {
        header.push_str(&format!("  {label:>column_width$}"));
    }

    let mut lines = vec!["Confusion matrix:".to_string(), header];
    for (expected, counts) in matrix.rows() {
        let mut line = format!("  {expected:<first_width$}");
        for count in counts {
            line.push_str(&format!("  {count:>column_width$}"));
        }
        lines.push(line);
    }
    lines.join("\n")
}

pub fn failed(records: &[InteractionRecord]) -> String {
    if records.is_empty() {
        return "Failed interactions: none.".to_string();
    }

    let mut lines = vec![format!("Failed interactions ({}):", records.len())];
    for record in records {
        lines.push(format!(
            "  - [{}] {} -> {}: {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            preview(&record.user_question),
            record.actual_tool(),
            record.error.as_deref().unwrap_or("not found"),
        ));
    }
    lines.join("\n")
}

pub fn historical(history: &HistoricalSummary) -> String {
    let mut lines = vec![summary("HISTORICAL SUMMARY (all sessions)", None, &history.stats)];
    if history.stats.is_empty() {
        return lines.join("\n");
    }

    lines.push(format!("Sessions: {}", history.session_count));
    lines.push("Top questions:".to_string());
    for (rank, entry) in history.top_questions.iter().enumerate() {
        lines.push(format!("  {}. {} ({}x)", rank + 1, preview(&entry.question), entry.count));
    }
    lines.join("\n")
}

/// First fifty characters of a question, with an ellipsis when cut.
pub fn preview(question: &str) -> String {
    let mut chars = question.chars();
    let head = chars.by_ref().take(QUESTION_PREVIEW_CHARS).collect::<String>();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
