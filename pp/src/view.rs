//! Board rendering for one participant's point of view
//!
//! `Board::build` decides what a viewer may see and which controls apply
//! to them; `Board::render` turns that into terminal text. Neither touches
//! session state.

use colored::Colorize;
use pokercore::{Session, Tally, VoteValue};
use serde::Serialize;

/// One row of the participants panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantRow {
    pub id: String,
    pub name: String,
    pub facilitator: bool,
    /// Whether they have voted on the current task
    pub voted: bool,
}

/// One row of the previous-tasks panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRow {
    pub id: String,
    pub title: String,
    pub final_estimate: Option<VoteValue>,
}

/// The task being voted on, as the viewer sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentTaskView {
    pub id: String,
    pub title: String,
    pub revealed: bool,
    pub votes_cast: usize,
    /// The viewer's own card, highlighted on the scale
    pub my_vote: Option<VoteValue>,
    pub final_estimate: Option<VoteValue>,
}

/// Everything one viewer sees
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Board {
    pub viewer_id: Option<String>,
    pub viewer_name: Option<String>,
    pub is_facilitator: bool,
    /// Only offered while nobody facilitates
    pub can_claim_facilitator: bool,
    pub current: Option<CurrentTaskView>,
    /// Present only once the current task is revealed
    pub results: Option<Tally>,
    pub participants: Vec<ParticipantRow>,
    /// Only the facilitator sees previous tasks
    pub history: Option<Vec<HistoryRow>>,
}

impl Board {
    /// Build the board for `viewer_id` (or an anonymous spectator)
    pub fn build(session: &Session, viewer_id: Option<&str>, results: Option<Tally>) -> Self {
        let is_facilitator = viewer_id.is_some_and(|id| session.is_facilitator(id));
        let current_task = session.current_task.as_ref();

        let current = current_task.map(|task| CurrentTaskView {
            id: task.id.clone(),
            title: task.title.clone(),
            revealed: task.revealed,
            votes_cast: task.votes.len(),
            my_vote: viewer_id.and_then(|id| task.vote_of(id)),
            final_estimate: task.final_estimate,
        });

        let participants = session
            .participants
            .iter()
            .map(|p| ParticipantRow {
                id: p.id.clone(),
                name: p.name.clone(),
                facilitator: session.is_facilitator(&p.id),
                voted: current_task.is_some_and(|t| t.has_voted(&p.id)),
            })
            .collect();

        let history = is_facilitator.then(|| {
            session
                .tasks
                .iter()
                .map(|t| HistoryRow {
                    id: t.id.clone(),
                    title: t.title.clone(),
                    final_estimate: t.final_estimate,
                })
                .collect()
        });

        Self {
            viewer_id: viewer_id.map(str::to_string),
            viewer_name: viewer_id.and_then(|id| session.participant_name(id)).map(str::to_string),
            is_facilitator,
            can_claim_facilitator: session.facilitator_id.is_none(),
            current,
            results: results.filter(|_| current_task.is_some_and(|t| t.revealed)),
            participants,
            history,
        }
    }

    /// Controls the viewer can use right now
    pub fn controls(&self) -> Vec<&'static str> {
        let mut controls = Vec::new();
        if self.viewer_id.is_none() {
            controls.push("/join <name>");
            return controls;
        }
        if self.can_claim_facilitator {
            controls.push("/facilitate");
        }
        if self.current.as_ref().is_some_and(|c| !c.revealed) {
            controls.push("/vote <n>");
        }
        if self.is_facilitator {
            controls.push("/task <title>");
            if let Some(current) = &self.current {
                if current.revealed {
                    controls.push("/final <n>");
                } else {
                    controls.push("/reveal");
                }
                controls.push("/reset");
            }
            if self.history.as_ref().is_some_and(|h| !h.is_empty()) {
                controls.push("/select <task>");
            }
        }
        controls
    }

    /// Terminal text for the board
    pub fn render(&self) -> String {
        let mut out = String::new();

        let who = match (&self.viewer_name, self.is_facilitator) {
            (Some(name), true) => format!("{} {}", name.bold(), "(facilitator)".yellow()),
            (Some(name), false) => name.bold().to_string(),
            (None, _) => "spectator".dimmed().to_string(),
        };
        out.push_str(&format!("{}  {}\n", "Planning Poker".bright_cyan().bold(), who));

        out.push('\n');
        match &self.current {
            Some(task) => self.render_task(task, &mut out),
            None if self.is_facilitator => {
                out.push_str(&format!("{}\n", "No task yet. Create one with /task <title>".dimmed()));
            }
            None => {
                out.push_str(&format!("{}\n", "Waiting for the facilitator to create a task...".dimmed()));
            }
        }

        out.push('\n');
        out.push_str(&format!("{}\n", "Participants".bold()));
        if self.participants.is_empty() {
            out.push_str(&format!("  {}\n", "(nobody yet)".dimmed()));
        }
        for p in &self.participants {
            let crown = if p.facilitator { " ♛".yellow().to_string() } else { String::new() };
            let voted = if p.voted { " ✓".green().to_string() } else { String::new() };
            out.push_str(&format!("  {}{}{}\n", p.name, crown, voted));
        }

        if let Some(history) = &self.history {
            out.push('\n');
            out.push_str(&format!("{}\n", "Previous Tasks".bold()));
            if history.is_empty() {
                out.push_str(&format!("  {}\n", "(none)".dimmed()));
            }
            for row in history {
                let short = row.id.get(..8).unwrap_or(&row.id);
                out.push_str(&format!("  {} {}", short.dimmed(), row.title));
                if let Some(estimate) = row.final_estimate {
                    out.push_str(&format!("  {}", format!("Final: {}", estimate).cyan()));
                }
                out.push('\n');
            }
        }

        let controls = self.controls();
        if !controls.is_empty() {
            out.push('\n');
            out.push_str(&format!("{} {}\n", "Controls:".dimmed(), controls.join("  ").yellow()));
        }

        out
    }

    fn render_task(&self, task: &CurrentTaskView, out: &mut String) {
        out.push_str(&format!("{} {}\n", "Task:".bold(), task.title.bright_white().bold()));

        let cards: Vec<String> = VoteValue::SCALE
            .iter()
            .map(|v| {
                let card = format!("[{:>2}]", v.points());
                if task.my_vote == Some(*v) {
                    card.bright_green().bold().to_string()
                } else if task.revealed {
                    card.dimmed().to_string()
                } else {
                    card
                }
            })
            .collect();
        out.push_str(&format!("  {}\n", cards.join(" ")));

        if !task.revealed {
            out.push_str(&format!("  {} vote(s) cast, hidden until reveal\n", task.votes_cast));
            return;
        }

        let Some(results) = &self.results else {
            return;
        };
        out.push_str(&format!("\n{}\n", "Results".bold()));
        for entry in &results.entries {
            let line = format!("  {:<20} {:>3}", entry.label(), entry.value.points());
            if entry.outlier {
                out.push_str(&format!("{}  {}\n", line.red(), "outlier".red()));
            } else {
                out.push_str(&format!("{}\n", line));
            }
        }
        out.push_str(&format!("  {:<20} {:>5}\n", "Average".bold(), results.average_display()));
        if let Some(estimate) = task.final_estimate {
            out.push_str(&format!("  {:<20} {:>3}\n", "Final".bold(), estimate));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokercore::SessionMachine;

    fn scenario() -> SessionMachine {
        let mut m = SessionMachine::default();
        m.join("a", "Alice").unwrap();
        m.join("b", "Bob").unwrap();
        m.become_facilitator("a").unwrap();
        m.create_task("a", "Story 1").unwrap();
        m.vote("a", VoteValue::Five).unwrap();
        m
    }

    fn plain(board: &Board) -> String {
        colored::control::set_override(false);
        board.render()
    }

    #[test]
    fn test_spectator_sees_join_only() {
        let m = SessionMachine::default();
        let board = Board::build(m.session(), None, None);
        assert!(board.can_claim_facilitator);
        assert!(board.history.is_none());
        assert_eq!(board.controls(), vec!["/join <name>"]);
        assert!(plain(&board).contains("Waiting for the facilitator"));
    }

    #[test]
    fn test_claim_offered_only_while_unclaimed() {
        let mut m = SessionMachine::default();
        m.join("a", "Alice").unwrap();
        let board = Board::build(m.session(), Some("a"), None);
        assert!(board.controls().contains(&"/facilitate"));

        m.become_facilitator("a").unwrap();
        let board = Board::build(m.session(), Some("a"), None);
        assert!(!board.controls().contains(&"/facilitate"));
        assert!(board.controls().contains(&"/task <title>"));
    }

    #[test]
    fn test_participant_view_hides_facilitator_controls() {
        let m = scenario();
        let board = Board::build(m.session(), Some("b"), None);
        assert!(!board.is_facilitator);
        assert!(board.history.is_none());
        assert_eq!(board.controls(), vec!["/vote <n>"]);

        let current = board.current.as_ref().unwrap();
        assert_eq!(current.votes_cast, 1);
        assert_eq!(current.my_vote, None);
    }

    #[test]
    fn test_facilitator_view() {
        let m = scenario();
        let board = Board::build(m.session(), Some("a"), None);
        assert!(board.is_facilitator);
        assert_eq!(board.viewer_name.as_deref(), Some("Alice"));
        assert_eq!(board.current.as_ref().unwrap().my_vote, Some(VoteValue::Five));
        assert_eq!(board.history.as_ref().map(Vec::len), Some(1));
        assert_eq!(
            board.controls(),
            vec!["/vote <n>", "/task <title>", "/reveal", "/reset", "/select <task>"]
        );

        let rows: Vec<(&str, bool, bool)> = board
            .participants
            .iter()
            .map(|p| (p.name.as_str(), p.facilitator, p.voted))
            .collect();
        assert_eq!(rows, vec![("Alice", true, true), ("Bob", false, false)]);
    }

    #[test]
    fn test_results_hidden_until_reveal() {
        let mut m = scenario();
        m.vote("b", VoteValue::Thirteen).unwrap();

        // A tally passed in early is still withheld
        let board = Board::build(m.session(), Some("b"), m.results());
        assert!(board.results.is_none());
        assert!(plain(&board).contains("hidden until reveal"));

        m.reveal_votes("a").unwrap();
        let board = Board::build(m.session(), Some("b"), m.results());
        let text = plain(&board);
        assert!(text.contains("Results"));
        assert!(text.contains("Alice"));
        assert!(text.contains("9.0"));
        assert!(!text.contains("outlier"));
        assert_eq!(board.controls(), Vec::<&str>::new());
    }

    #[test]
    fn test_outliers_marked_in_render() {
        let mut m = scenario();
        m.vote("b", VoteValue::One).unwrap();
        m.vote("c", VoteValue::TwentyOne).unwrap();
        m.reveal_votes("a").unwrap();

        let board = Board::build(m.session(), Some("a"), m.results());
        let text = plain(&board);
        assert!(text.contains("outlier"));
        assert!(board.controls().contains(&"/final <n>"));
    }

    #[test]
    fn test_history_shows_final_estimate() {
        let mut m = scenario();
        m.reveal_votes("a").unwrap();
        m.finalize("a", VoteValue::Five).unwrap();

        let board = Board::build(m.session(), Some("a"), m.results());
        assert_eq!(
            board.history.as_ref().unwrap()[0].final_estimate,
            Some(VoteValue::Five)
        );
        assert!(plain(&board).contains("Final: 5"));
    }
}
