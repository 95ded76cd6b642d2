//! Vote aggregation: average and outlier detection
//!
//! Results are computed on demand from the current task every time they are
//! shown; nothing here is cached.

use serde::{Deserialize, Serialize};

use crate::domain::{Session, Task, VoteValue};

/// Default fraction of the average a vote may deviate before it is an outlier
pub const DEFAULT_OUTLIER_RATIO: f64 = 0.5;

/// Arithmetic mean of the given points; 0 for no votes
pub fn average(points: &[u32]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let sum: u64 = points.iter().map(|&p| u64::from(p)).sum();
    sum as f64 / points.len() as f64
}

/// Whether `vote` deviates from `average` by more than half the average
pub fn is_outlier(vote: f64, average: f64) -> bool {
    OutlierPolicy::default().is_outlier(vote, average)
}

/// How far from the average a vote may stray
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierPolicy {
    /// Allowed deviation as a fraction of the average
    pub ratio: f64,
}

impl Default for OutlierPolicy {
    fn default() -> Self {
        Self {
            ratio: DEFAULT_OUTLIER_RATIO,
        }
    }
}

impl OutlierPolicy {
    pub fn new(ratio: f64) -> Self {
        Self { ratio }
    }

    /// `|vote - average| > average * ratio`
    ///
    /// A zero average only happens with no votes at all, and never flags
    /// anything.
    pub fn is_outlier(&self, vote: f64, average: f64) -> bool {
        if average == 0.0 {
            return false;
        }
        (vote - average).abs() > average * self.ratio
    }
}

/// One line of the revealed results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallyEntry {
    pub user_id: String,

    /// Display name, if the voter ever joined
    pub name: Option<String>,

    pub value: VoteValue,

    pub outlier: bool,
}

impl TallyEntry {
    /// Name to show, falling back to the raw id
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.user_id)
    }
}

/// Revealed results for a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tally {
    pub task_id: String,
    pub title: String,
    pub entries: Vec<TallyEntry>,
    pub average: f64,
}

impl Tally {
    /// Compute results for a task, resolving voter names from the session
    pub fn compute(session: &Session, task: &Task, policy: OutlierPolicy) -> Self {
        let avg = average(&task.points());
        let entries = task
            .votes
            .iter()
            .map(|v| TallyEntry {
                user_id: v.user_id.clone(),
                name: session.participant_name(&v.user_id).map(str::to_string),
                value: v.value,
                outlier: policy.is_outlier(f64::from(v.value.points()), avg),
            })
            .collect();

        Self {
            task_id: task.id.clone(),
            title: task.title.clone(),
            entries,
            average: avg,
        }
    }

    /// Entries flagged as outliers
    pub fn outliers(&self) -> impl Iterator<Item = &TallyEntry> {
        self.entries.iter().filter(|e| e.outlier)
    }

    /// Average formatted to one decimal, as shown on the board
    pub fn average_display(&self) -> String {
        format!("{:.1}", self.average)
    }
}
