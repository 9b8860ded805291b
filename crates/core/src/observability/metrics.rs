//! Aggregate reports over interaction records.
//!
//! Every function here accepts an empty slice and returns a defined "no data"
//! value: zero counts, zero rates, `None` timing statistics, empty tables.
//! Percentages are kept unrounded on a 0-100 scale.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::domain::interaction::InteractionRecord;
use crate::domain::session::SessionId;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResponseTimeStats {
    pub mean_seconds: f64,
    pub min_seconds: f64,
    pub max_seconds: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InteractionSummary {
    pub total_interactions: usize,
    pub tool_selection_accuracy: f64,
    pub tool_distribution: BTreeMap<String, usize>,
    pub response_time: Option<ResponseTimeStats>,
    pub success_rate: f64,
    pub failed_interactions: usize,
}

impl InteractionSummary {
    pub fn is_empty(&self) -> bool {
        self.total_interactions == 0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    #[serde(flatten)]
    pub stats: InteractionSummary,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolAccuracy {
    pub expected_tool: String,
    pub total_tests: usize,
    pub correct_selections: usize,
    pub accuracy: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuestionFrequency {
    pub question: String,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistoricalSummary {
    #[serde(flatten)]
    pub stats: InteractionSummary,
    pub session_count: usize,
    pub top_questions: Vec<QuestionFrequency>,
}

/// Expected-versus-actual tool counts. Rows are expected tools, columns the
/// tool actually selected (`none` when nothing was selected).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    labels: Vec<String>,
    cells: BTreeMap<String, BTreeMap<String, usize>>,
}

impl ConfusionMatrix {
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn count(&self, expected: &str, actual: &str) -> usize {
        self.cells.get(expected).and_then(|row| row.get(actual)).copied().unwrap_or(0)
    }

    /// Full square, one row per label in label order.
    pub fn rows(&self) -> Vec<(&str, Vec<usize>)> {
        self.labels
            .iter()
            .map(|expected| {
                let counts = self.labels.iter().map(|actual| self.count(expected, actual)).collect();
                (expected.as_str(), counts)
            })
            .collect()
    }
}

pub fn summarize(records: &[InteractionRecord]) -> InteractionSummary {
    let judged = records.iter().filter(|record| record.tool_match.is_some()).count();
    let matched = records.iter().filter(|record| record.tool_match == Some(true)).count();

    let mut tool_distribution = BTreeMap::new();
    for tool in records.iter().filter_map(|record| record.tool_selected.as_ref()) {
        *tool_distribution.entry(tool.clone()).or_insert(0) += 1;
    }

    let succeeded = records.iter().filter(|record| record.success).count();

    InteractionSummary {
        total_interactions: records.len(),
        tool_selection_accuracy: percentage(matched, judged),
        tool_distribution,
        response_time: response_time_stats(records),
        success_rate: percentage(succeeded, records.len()),
        failed_interactions: records.len() - succeeded,
    }
}

pub fn session_summary(session_id: &SessionId, records: &[InteractionRecord]) -> SessionSummary {
    SessionSummary { session_id: session_id.clone(), stats: summarize(records) }
}

pub fn tool_accuracy_report(records: &[InteractionRecord]) -> Vec<ToolAccuracy> {
    let mut groups: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for record in records {
        let Some(expected) = record.expected_tool.as_deref() else {
            continue;
        };
        let entry = groups.entry(expected).or_insert((0, 0));
        entry.0 += 1;
        if record.tool_match == Some(true) {
            entry.1 += 1;
        }
    }

    let mut report = groups
        .into_iter()
        .map(|(expected_tool, (total_tests, correct_selections))| ToolAccuracy {
            expected_tool: expected_tool.to_string(),
            total_tests,
            correct_selections,
            accuracy: percentage(correct_selections, total_tests),
        })
        .collect::<Vec<_>>();
    report.sort_by(|left, right| {
        right
            .accuracy
            .total_cmp(&left.accuracy)
            .then_with(|| left.expected_tool.cmp(&right.expected_tool))
    });
    report
}

pub fn confusion_matrix(records: &[InteractionRecord]) -> ConfusionMatrix {
    let mut labels = BTreeSet::new();
    let mut cells: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();

    for record in records {
        let Some(expected) = record.expected_tool.as_deref() else {
            continue;
        };
        let actual = record.actual_tool();
        labels.insert(expected.to_string());
        labels.insert(actual.to_string());
        *cells
            .entry(expected.to_string())
            .or_default()
            .entry(actual.to_string())
            .or_insert(0) += 1;
    }

    ConfusionMatrix { labels: labels.into_iter().collect(), cells }
}

pub fn failed_interactions(records: &[InteractionRecord]) -> Vec<&InteractionRecord> {
    records.iter().filter(|record| !record.success).collect()
}

pub fn historical_summary(records: &[InteractionRecord], top_n: usize) -> HistoricalSummary {
    let session_count =
        records.iter().map(|record| &record.session_id).collect::<HashSet<_>>().len();

    HistoricalSummary {
        stats: summarize(records),
        session_count,
        top_questions: top_questions(records, top_n),
    }
}

/// Most frequent exact question texts; ties keep first-seen order.
pub fn top_questions(records: &[InteractionRecord], limit: usize) -> Vec<QuestionFrequency> {
    let mut order: Vec<QuestionFrequency> = Vec::new();
    let mut index_by_question: HashMap<&str, usize> = HashMap::new();

    for record in records {
        match index_by_question.get(record.user_question.as_str()) {
            Some(&index) => order[index].count += 1,
            None => {
                index_by_question.insert(&record.user_question, order.len());
                order.push(QuestionFrequency { question: record.user_question.clone(), count: 1 });
            }
        }
    }

    // stable sort keeps first-seen order among equal counts
    order.sort_by(|left, right| right.count.cmp(&left.count));
    order.truncate(limit);
    order
}

fn response_time_stats(records: &[InteractionRecord]) -> Option<ResponseTimeStats> {
    let first = records.first()?.response_time_seconds;
    let (sum, min, max) = records.iter().map(|record| record.response_time_seconds).fold(
        (0.0, first, first),
        |(sum, min, max), value| (sum + value, min.min(value), max.max(value)),
    );

    Some(ResponseTimeStats {
        mean_seconds: sum / records.len() as f64,
        min_seconds: min,
        max_seconds: max,
    })
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::{
        confusion_matrix, failed_interactions, historical_summary, summarize,
        tool_accuracy_report, top_questions,
    };
    use crate::domain::interaction::InteractionRecord;
    use crate::domain::outcome::ToolOutcome;
    use crate::domain::session::SessionId;

    fn record(
        session: &str,
        question: &str,
        selected: Option<&str>,
        expected: Option<&str>,
        seconds: f64,
        success: bool,
    ) -> InteractionRecord {
        let base = Utc.with_ymd_and_hms(2026, 2, 14, 9, 0, 0).single().expect("valid instant");
        InteractionRecord {
            timestamp: base + Duration::milliseconds((seconds * 1000.0) as i64),
            session_id: SessionId(session.to_string()),
            user_question: question.to_string(),
            tool_selected: selected.map(str::to_string),
            expected_tool: expected.map(str::to_string),
            tool_match: expected.map(|expected| selected == Some(expected)),
            tool_args: None,
            tool_result: (!success).then(|| ToolOutcome::not_found("not found")),
            response_time_seconds: seconds,
            success,
            response_length: 42,
            error: (!success).then(|| "Order not found in database".to_string()),
        }
    }

    #[test]
    fn empty_records_produce_zero_summary() {
        let summary = summarize(&[]);

        assert!(summary.is_empty());
        assert_eq!(summary.tool_selection_accuracy, 0.0);
        assert_eq!(summary.success_rate, 0.0);
        assert_eq!(summary.response_time, None);
        assert!(summary.tool_distribution.is_empty());
    }

    #[test]
    fn success_rate_reflects_failures() {
        let all_ok = (0..4)
            .map(|i| record("s", &format!("q{i}"), Some("file_search"), None, 1.0, true))
            .collect::<Vec<_>>();
        assert_eq!(summarize(&all_ok).success_rate, 100.0);

        let mut mixed = all_ok.clone();
        mixed.push(record("s", "ORD-9999?", Some("check_order_status"), None, 1.0, false));
        let summary = summarize(&mixed);
        assert_eq!(summary.success_rate, 4.0 / 5.0 * 100.0);
        assert_eq!(summary.failed_interactions, 1);
    }

    #[test]
    fn accuracy_only_counts_records_with_expectations() {
        let records = vec![
            record("s", "a", Some("check_order_status"), Some("check_order_status"), 1.0, true),
            record("s", "b", Some("check_order_status"), Some("file_search"), 2.0, true),
            record("s", "c", Some("file_search"), None, 3.0, true),
        ];
        let summary = summarize(&records);

        assert_eq!(summary.tool_selection_accuracy, 50.0);
        assert_eq!(summary.tool_distribution.get("check_order_status"), Some(&2));
        assert_eq!(summary.tool_distribution.get("file_search"), Some(&1));

        let timing = summary.response_time.expect("timing stats");
        assert_eq!(timing.mean_seconds, 2.0);
        assert_eq!(timing.min_seconds, 1.0);
        assert_eq!(timing.max_seconds, 3.0);
    }

    #[test]
    fn accuracy_report_is_empty_without_expectations() {
        let records = vec![record("s", "a", Some("file_search"), None, 1.0, true)];
        assert!(tool_accuracy_report(&records).is_empty());
        assert!(confusion_matrix(&records).is_empty());
    }

    #[test]
    fn accuracy_report_sorts_by_accuracy_descending() {
        let records = vec![
            record("s", "a", Some("check_order_status"), Some("file_search"), 1.0, true),
            record("s", "b", Some("file_search"), Some("file_search"), 1.0, true),
            record("s", "c", Some("get_tracking_info"), Some("get_tracking_info"), 1.0, true),
        ];
        let report = tool_accuracy_report(&records);

        assert_eq!(report.len(), 2);
        assert_eq!(report[0].expected_tool, "get_tracking_info");
        assert_eq!(report[0].accuracy, 100.0);
        assert_eq!(report[1].expected_tool, "file_search");
        assert_eq!(report[1].total_tests, 2);
        assert_eq!(report[1].correct_selections, 1);
        assert_eq!(report[1].accuracy, 50.0);
    }

    #[test]
    fn confusion_matrix_counts_expected_against_actual() {
        let records = vec![
            record("s", "q1", Some("A"), Some("A"), 1.0, true),
            record("s", "q2", Some("B"), Some("A"), 1.0, true),
            record("s", "q3", Some("A"), Some("A"), 1.0, true),
        ];
        let matrix = confusion_matrix(&records);

        assert_eq!(matrix.count("A", "A"), 2);
        assert_eq!(matrix.count("A", "B"), 1);
        assert_eq!(matrix.count("B", "A"), 0);
        assert_eq!(matrix.labels(), ["A".to_string(), "B".to_string()]);
        assert_eq!(matrix.rows()[0], ("A", vec![2, 1]));
    }

    #[test]
    fn missing_selection_lands_in_none_column() {
        let records = vec![record("s", "q", None, Some("check_order_status"), 1.0, true)];
        let matrix = confusion_matrix(&records);

        assert_eq!(matrix.count("check_order_status", "none"), 1);
        assert!(matrix.labels().contains(&"none".to_string()));
    }

    #[test]
    fn failed_interactions_are_filtered() {
        let records = vec![
            record("s", "ok", Some("file_search"), None, 1.0, true),
            record("s", "ORD-9999", Some("check_order_status"), None, 1.0, false),
        ];
        let failed = failed_interactions(&records);

        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].user_question, "ORD-9999");
    }

    #[test]
    fn historical_summary_counts_sessions_and_top_questions() {
        let records = vec![
            record("s1", "What is your return policy?", Some("file_search"), None, 1.0, true),
            record("s1", "Track MAEU7654321", Some("get_tracking_info"), None, 1.0, true),
            record("s2", "What is your return policy?", Some("file_search"), None, 1.0, true),
        ];
        let summary = historical_summary(&records, 5);

        assert_eq!(summary.session_count, 2);
        assert_eq!(summary.stats.total_interactions, 3);
        assert_eq!(summary.top_questions[0].question, "What is your return policy?");
        assert_eq!(summary.top_questions[0].count, 2);
        assert_eq!(summary.top_questions.len(), 2);
    }

    #[test]
    fn historical_summary_over_nothing_is_defined() {
        let summary = historical_summary(&[], 5);

        assert_eq!(summary.session_count, 0);
        assert!(summary.stats.is_empty());
        assert!(summary.top_questions.is_empty());
    }

    #[test]
    fn top_questions_respects_limit_and_first_seen_ties() {
        let records = vec![
            record("s", "first", None, None, 1.0, true),
            record("s", "second", None, None, 1.0, true),
            record("s", "third", None, None, 1.0, true),
        ];
        let top = top_questions(&records, 2);

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].question, "first");
        assert_eq!(top[1].question, "second");
    }
}
