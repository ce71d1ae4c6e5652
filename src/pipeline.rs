//! Search, filter and sort over the task list.
//!
//! Everything here is pure: the visible list is recomputed from the store on
//! every change.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::models::{Priority, Status, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Open,
    Completed,
    High,
    Medium,
    Low,
}

impl Filter {
    /// Display order of the filter bar
    pub const ALL: [Filter; 6] = [
        Filter::All,
        Filter::Open,
        Filter::Completed,
        Filter::High,
        Filter::Medium,
        Filter::Low,
    ];

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Open => task.status == Status::Open,
            Filter::Completed => task.status == Status::Completed,
            Filter::High => task.priority == Priority::High,
            Filter::Medium => task.priority == Priority::Medium,
            Filter::Low => task.priority == Priority::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Open => "open",
            Filter::Completed => "completed",
            Filter::High => "high",
            Filter::Medium => "medium",
            Filter::Low => "low",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Open => "Open",
            Filter::Completed => "Completed",
            Filter::High => "High",
            Filter::Medium => "Medium",
            Filter::Low => "Low",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    /// Next filter in bar order, wrapping around
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| {
                format!(
                    "Unknown filter '{}' (expected one of: all, open, completed, high, medium, low)",
                    s.trim()
                )
            })
    }
}

/// Case-insensitive substring match on title or description.
/// Surrounding whitespace in `query` is part of the match.
pub fn matches_query(task: &Task, query: &str) -> bool {
    let query = query.to_lowercase();
    task.title.to_lowercase().contains(&query) || task.description.to_lowercase().contains(&query)
}

/// Display order: open before completed, then priority high to low, then
/// earliest due date first
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    a.is_completed()
        .cmp(&b.is_completed())
        .then_with(|| b.priority.rank().cmp(&a.priority.rank()))
        .then_with(|| a.due_date.cmp(&b.due_date))
}

/// Compute the visible task list: search, then filter, then a stable sort
pub fn derive(tasks: &[Task], query: &str, filter: Filter) -> Vec<Task> {
    let searching = !query.trim().is_empty();
    let mut visible: Vec<Task> = tasks
        .iter()
        .filter(|task| !searching || matches_query(task, query))
        .filter(|task| filter.matches(task))
        .cloned()
        .collect();
    visible.sort_by(compare_tasks);
    visible
}

/// Per-filter task counts over the whole store, shown next to each filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterCounts {
    pub all: usize,
    pub open: usize,
    pub completed: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl FilterCounts {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        tasks.iter().fold(Self::default(), |mut counts, task| {
            counts.all += 1;
            match task.status {
                Status::Open => counts.open += 1,
                Status::Completed => counts.completed += 1,
            }
            match task.priority {
                Priority::High => counts.high += 1,
                Priority::Medium => counts.medium += 1,
                Priority::Low => counts.low += 1,
            }
            counts
        })
    }

    pub fn get(&self, filter: Filter) -> usize {
        match filter {
            Filter::All => self.all,
            Filter::Open => self.open,
            Filter::Completed => self.completed,
            Filter::High => self.high,
            Filter::Medium => self.medium,
            Filter::Low => self.low,
        }
    }

    /// Completed share of all tasks, rounded to a whole percent
    pub fn completion_percent(&self) -> u16 {
        if self.all == 0 {
            return 0;
        }
        ((self.completed as f64 / self.all as f64) * 100.0).round() as u16
    }

    pub fn summary(&self) -> String {
        if self.all == 0 {
            "No tasks yet".to_string()
        } else {
            format!(
                "{} of {} completed ({}%)",
                self.completed,
                self.all,
                self.completion_percent()
            )
        }
    }
}
