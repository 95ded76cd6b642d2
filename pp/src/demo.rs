//! Scripted estimation round
//!
//! Alice facilitates and creates "Story 1", Alice votes 5, Bob votes 13,
//! and Alice reveals. The round runs through the registry and the session
//! actor exactly like interactive play does.

use colored::Colorize;
use eyre::{Result, eyre};
use pokercore::{SessionId, Tally, VoteValue, new_user_id};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::registry::SessionRegistry;

/// Title of the scripted task
pub const DEMO_TASK: &str = "Story 1";

/// Outcome of the scripted round
#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    pub session_id: SessionId,
    pub facilitator: String,
    pub tally: Tally,
}

impl DemoReport {
    /// Human-readable summary
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{} {}\n",
            "Task:".bold(),
            self.tally.title.bright_white().bold()
        ));
        out.push_str(&format!("{} {}\n\n", "Facilitator:".bold(), self.facilitator));
        for entry in &self.tally.entries {
            let line = format!("  {:<12} {:>3}", entry.label(), entry.value.points());
            if entry.outlier {
                out.push_str(&format!("{}  {}\n", line.red(), "outlier".red()));
            } else {
                out.push_str(&format!("{}\n", line));
            }
        }
        out.push_str(&format!("  {:<12} {:>5}\n", "Average".bold(), self.tally.average_display()));
        out
    }

    /// Pretty JSON
    pub fn render_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Run the scripted round in a fresh registry
pub async fn run_demo(config: SessionConfig) -> Result<DemoReport> {
    debug!(?config, "run_demo: called");
    let registry = SessionRegistry::new(config);
    let manager = registry.create_session().await;
    let session_id = manager.session_id().clone();

    let alice = new_user_id("Alice");
    let bob = new_user_id("Bob");

    manager.join(&alice, "Alice").await?;
    manager.join(&bob, "Bob").await?;
    manager.become_facilitator(&alice).await?;
    manager.create_task(&alice, DEMO_TASK).await?;
    manager.vote(&alice, VoteValue::Five).await?;
    manager.vote(&bob, VoteValue::Thirteen).await?;
    manager.reveal_votes(&alice).await?;

    let tally = manager
        .results()
        .await?
        .ok_or_else(|| eyre!("Votes were not revealed"))?;
    info!(%session_id, average = tally.average, "Demo round complete");

    registry.shutdown_all().await;

    Ok(DemoReport {
        session_id,
        facilitator: "Alice".to_string(),
        tally,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_demo() {
        let report = run_demo(SessionConfig::default()).await.unwrap();
        assert_eq!(report.tally.title, DEMO_TASK);
        assert_eq!(report.tally.average, 9.0);
        assert_eq!(report.tally.entries.len(), 2);
        assert_eq!(report.tally.outliers().count(), 0);

        colored::control::set_override(false);
        let text = report.render_text();
        assert!(text.contains("Alice"));
        assert!(text.contains("Bob"));
        assert!(text.contains("9.0"));
    }

    #[tokio::test]
    async fn test_demo_json() {
        let report = run_demo(SessionConfig::default()).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&report.render_json().unwrap()).unwrap();
        assert_eq!(json["tally"]["average"], 9.0);
        assert_eq!(json["tally"]["entries"][1]["value"], 13);
    }

    #[tokio::test]
    async fn test_demo_with_tight_outlier_ratio() {
        let config = SessionConfig {
            outlier_ratio: 0.1,
            ..SessionConfig::default()
        };
        let report = run_demo(config).await.unwrap();
        // |5 - 9| and |13 - 9| both exceed 0.9
        assert_eq!(report.tally.outliers().count(), 2);
    }
}
