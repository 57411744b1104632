use std::ops::Range;

use regex::Regex;
use serde::Serialize;

use crate::model::ledger::Ledger;
use crate::model::task::TaskType;

/// What kind of record matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Goal,
    Task,
}

/// A search hit on a goal or task title
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub kind: MatchKind,
    pub id: String,
    pub goal_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    pub title: String,
    /// Byte ranges of each match within `title`
    #[serde(skip)]
    pub spans: Vec<Range<usize>>,
}

/// Collect all non-overlapping match byte-ranges for a regex in the given text.
fn find_matches(re: &Regex, text: &str) -> Vec<Range<usize>> {
    re.find_iter(text).map(|m| m.start()..m.end()).collect()
}

/// Search goal and task titles. Goals come first, then tasks, each in ledger
/// order. `goal_filter` restricts both to one goal.
pub fn search(ledger: &Ledger, re: &Regex, goal_filter: Option<&str>) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    for goal in &ledger.goals {
        if goal_filter.is_some_and(|f| f != goal.id) {
            continue;
        }
        let spans = find_matches(re, &goal.title);
        if !spans.is_empty() {
            hits.push(SearchHit {
                kind: MatchKind::Goal,
                id: goal.id.clone(),
                goal_id: goal.id.clone(),
                task_type: None,
                title: goal.title.clone(),
                spans,
            });
        }
    }

    for task in &ledger.tasks {
        if goal_filter.is_some_and(|f| f != task.goal_id) {
            continue;
        }
        let spans = find_matches(re, &task.title);
        if !spans.is_empty() {
            hits.push(SearchHit {
                kind: MatchKind::Task,
                id: task.id.clone(),
                goal_id: task.goal_id.clone(),
                task_type: Some(task.task_type),
                title: task.title.clone(),
                spans,
            });
        }
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::goal::Goal;
    use crate::model::task::TaskNode;

    fn sample_ledger() -> Ledger {
        Ledger {
            goals: vec![Goal::new("G-001", "Visit Japan"), Goal::new("G-002", "Japanese course")],
            tasks: vec![
                TaskNode::new("T-001", "G-001", None, TaskType::Pre, 0, "Book flights to Japan"),
                TaskNode::new("T-002", "G-001", None, TaskType::Pre, 1, "Renew passport"),
                TaskNode::new("T-003", "G-002", None, TaskType::Dream, 0, "Read a japan novel"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_search_goals_then_tasks() {
        let re = Regex::new("Japan").unwrap();
        let hits = search(&sample_ledger(), &re, None);
        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["G-001", "G-002", "T-001"]);
        assert_eq!(hits[0].kind, MatchKind::Goal);
        assert_eq!(hits[2].task_type, Some(TaskType::Pre));
        assert_eq!(hits[2].spans, vec![16..21]);
    }

    #[test]
    fn test_search_case_insensitive() {
        let re = Regex::new("(?i)japan").unwrap();
        let hits = search(&sample_ledger(), &re, None);
        assert_eq!(hits.len(), 4);
    }

    #[test]
    fn test_search_goal_filter() {
        let re = Regex::new("(?i)japan").unwrap();
        let hits = search(&sample_ledger(), &re, Some("G-002"));
        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["G-002", "T-003"]);
    }

    #[test]
    fn test_multiple_spans() {
        let re = Regex::new("o").unwrap();
        let hits = search(&sample_ledger(), &re, Some("G-001"));
        let flights = hits.iter().find(|h| h.id == "T-001").unwrap();
        assert_eq!(flights.spans, vec![1..2, 2..3, 14..15]);
    }
}
