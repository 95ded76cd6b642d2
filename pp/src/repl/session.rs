//! REPL session management

use std::collections::HashMap;

use colored::Colorize;
use eyre::{Result, eyre};
use pokercore::{IdResolver, Outcome, VoteValue, new_user_id};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, info};

use super::command::ReplCommand;
use crate::state::{SessionError, SessionManager, SessionResponse};
use crate::view::Board;

/// Result of handling one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashResult {
    Continue,
    Quit,
}

/// Interactive REPL over one session
///
/// Every participant joined from this terminal is kept as a local identity;
/// `/as` switches which of them the following commands act for.
pub struct ReplSession {
    manager: SessionManager,
    identities: HashMap<String, String>, // id -> display name
    active: Option<String>,
}

impl ReplSession {
    /// Create a new REPL session
    pub fn new(manager: SessionManager) -> Self {
        debug!(session_id = %manager.session_id(), "ReplSession::new: called");
        Self {
            manager,
            identities: HashMap::new(),
            active: None,
        }
    }

    /// Id of the participant commands currently act for
    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Run the REPL main loop
    pub async fn run(&mut self, initial_name: Option<String>) -> Result<()> {
        self.print_welcome();

        if let Some(name) = initial_name {
            println!("{} /join {}", ">".bright_green(), name);
            self.execute(ReplCommand::Join(name)).await?;
        } else {
            self.show_board().await?;
        }

        let mut rl = DefaultEditor::new().map_err(|e| eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&self.prompt());

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    if let Err(e) = rl.add_history_entry(input) {
                        debug!(error = %e, "run: failed to add history entry");
                    }

                    match self.handle_line(input).await? {
                        SlashResult::Continue => continue,
                        SlashResult::Quit => break,
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C - just show new prompt
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Parse and execute one line, reporting parse errors instead of failing
    pub async fn handle_line(&mut self, input: &str) -> Result<SlashResult> {
        debug!(%input, "handle_line: called");
        match input.parse::<ReplCommand>() {
            Ok(cmd) => self.execute(cmd).await,
            Err(msg) => {
                println!("{} {}", "?".yellow(), msg);
                println!("Type {} for available commands", "/help".yellow());
                Ok(SlashResult::Continue)
            }
        }
    }

    /// Execute a parsed command
    ///
    /// Rejections are printed; only a dead session actor is an error.
    pub async fn execute(&mut self, cmd: ReplCommand) -> Result<SlashResult> {
        debug!(?cmd, "execute: called");
        match cmd {
            ReplCommand::Help => {
                self.print_help();
                return Ok(SlashResult::Continue);
            }
            ReplCommand::Quit => return Ok(SlashResult::Quit),
            ReplCommand::WhoAmI => {
                self.print_whoami();
                return Ok(SlashResult::Continue);
            }
            ReplCommand::Tasks => {
                self.print_tasks().await?;
                return Ok(SlashResult::Continue);
            }
            ReplCommand::Show => {}
            ReplCommand::Join(name) => self.join(&name).await?,
            ReplCommand::As(reference) => self.switch_to(&reference),
            ReplCommand::Facilitate => {
                if let Some(caller) = self.caller() {
                    let result = self.manager.become_facilitator(&caller).await;
                    report(result, "You are the facilitator")?;
                }
            }
            ReplCommand::Task(title) => {
                if let Some(caller) = self.caller() {
                    let result = self.manager.create_task(&caller, &title).await;
                    report(result, &format!("Created task: {}", title))?;
                }
            }
            ReplCommand::Vote(value) => {
                if let Some(caller) = self.caller() {
                    let result = self.manager.vote(&caller, value).await;
                    report(result, &format!("Voted {}", value))?;
                }
            }
            ReplCommand::Reveal => {
                if let Some(caller) = self.caller() {
                    let result = self.manager.reveal_votes(&caller).await;
                    report(result, "Votes revealed")?;
                }
            }
            ReplCommand::Reset => {
                if let Some(caller) = self.caller() {
                    let result = self.manager.reset_voting(&caller).await;
                    report(result, "Voting reset")?;
                }
            }
            ReplCommand::Select(reference) => {
                if let Some(caller) = self.caller() {
                    self.select(&caller, &reference).await?;
                }
            }
            ReplCommand::Final(value) => {
                if let Some(caller) = self.caller() {
                    self.finalize(&caller, value).await?;
                }
            }
        }

        self.show_board().await?;
        Ok(SlashResult::Continue)
    }

    async fn join(&mut self, name: &str) -> Result<()> {
        let id = new_user_id(name);
        let result = self.manager.join(&id, name).await;
        let applied = matches!(result, Ok(Outcome::Applied));
        report(result, &format!("Joined as {}", name))?;
        if applied {
            info!(%id, %name, "Local participant joined");
            self.identities.insert(id.clone(), name.to_string());
            self.active = Some(id);
        }
        Ok(())
    }

    fn switch_to(&mut self, reference: &str) {
        match IdResolver::new(&self.identities).resolve(reference) {
            Ok(Some(id)) => {
                let name = self.identities.get(&id).cloned().unwrap_or_default();
                println!("{} Now acting as {}", "✓".green(), name.bold());
                self.active = Some(id);
            }
            Ok(None) => {
                println!("{} No local participant matches '{}'", "✗".red(), reference);
            }
            Err(candidates) => {
                println!("{} '{}' is ambiguous:", "?".yellow(), reference);
                for id in candidates {
                    let name = self.identities.get(&id).map(String::as_str).unwrap_or("");
                    println!("  {} {}", id.dimmed(), name);
                }
            }
        }
    }

    async fn select(&self, caller: &str, reference: &str) -> Result<()> {
        let snapshot = self.manager.snapshot().await?;
        let titles: HashMap<String, String> = snapshot
            .tasks
            .iter()
            .map(|t| (t.id.clone(), t.title.clone()))
            .collect();

        let task_id = match IdResolver::new(&titles).resolve(reference) {
            Ok(Some(id)) => id,
            // Let the session report the unknown id
            Ok(None) => reference.to_string(),
            Err(candidates) => {
                println!("{} '{}' is ambiguous:", "?".yellow(), reference);
                for id in candidates {
                    let title = titles.get(&id).map(String::as_str).unwrap_or("");
                    println!("  {} {}", id.dimmed(), title);
                }
                return Ok(());
            }
        };

        let title = titles.get(&task_id).cloned().unwrap_or_default();
        let result = self.manager.select_task(caller, &task_id).await;
        report(result, &format!("Voting again on: {}", title))
    }

    async fn finalize(&self, caller: &str, value: VoteValue) -> Result<()> {
        let result = self.manager.finalize(caller, value).await;
        report(result, &format!("Final estimate: {}", value))
    }

    /// Active identity, or a hint to join first
    fn caller(&self) -> Option<String> {
        if self.active.is_none() {
            println!("{} Join first with {}", "✗".red(), "/join <name>".yellow());
        }
        self.active.clone()
    }

    async fn show_board(&self) -> Result<()> {
        let snapshot = self.manager.snapshot().await?;
        let results = self.manager.results().await?;
        let board = Board::build(&snapshot, self.active.as_deref(), results);
        println!();
        print!("{}", board.render());
        println!();
        Ok(())
    }

    async fn print_tasks(&self) -> Result<()> {
        let snapshot = self.manager.snapshot().await?;
        let is_facilitator = self
            .active
            .as_deref()
            .is_some_and(|id| snapshot.is_facilitator(id));
        if !is_facilitator {
            println!("{} Only the facilitator sees previous tasks", "✗".red());
            return Ok(());
        }

        if snapshot.tasks.is_empty() {
            println!("{}", "No tasks yet.".dimmed());
            return Ok(());
        }

        let current_id = snapshot.current_task.as_ref().map(|t| t.id.as_str());
        println!();
        println!("{}", "Tasks:".bright_cyan());
        for task in &snapshot.tasks {
            let marker = if Some(task.id.as_str()) == current_id { "▶" } else { " " };
            let estimate = task
                .final_estimate
                .map(|e| format!("  Final: {}", e).cyan().to_string())
                .unwrap_or_default();
            println!("  {} {} {}{}", marker.green(), task.id.dimmed(), task.title, estimate);
        }
        println!();
        Ok(())
    }

    fn print_whoami(&self) {
        match self.active.as_ref() {
            Some(id) => {
                let name = self.identities.get(id).map(String::as_str).unwrap_or("");
                println!("{} {}", name.bold(), id.dimmed());
            }
            None => println!("{}", "Not joined. Use /join <name>".dimmed()),
        }
        if self.identities.len() > 1 {
            let mut others: Vec<&str> = self
                .identities
                .iter()
                .filter(|(id, _)| Some(id.as_str()) != self.active.as_deref())
                .map(|(_, name)| name.as_str())
                .collect();
            others.sort_unstable();
            println!("Also here: {}", others.join(", "));
        }
    }

    fn prompt(&self) -> String {
        let who = self
            .active
            .as_ref()
            .and_then(|id| self.identities.get(id))
            .map(String::as_str)
            .unwrap_or("spectator");
        format!("{} {} ", who.bright_blue(), ">".bright_green())
    }

    /// Print welcome message
    fn print_welcome(&self) {
        println!();
        println!("{}", "Planning Poker".bright_cyan().bold());
        println!("Session: {}", self.manager.session_id());
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
    }

    /// Print help message
    fn print_help(&self) {
        println!();
        println!("{}", "Participants:".bright_cyan());
        println!("  {:18} Join the session", "/join <name>".yellow());
        println!("  {:18} Act as another local participant", "/as <participant>".yellow());
        println!("  {:18} Show who you are acting as", "/whoami".yellow());
        println!("  {:18} Become the facilitator", "/facilitate".yellow());
        println!("  {:18} Vote on the current task", "/vote <n>".yellow());
        println!("  {:18} Redraw the board", "/show".yellow());
        println!();
        println!("{}", "Facilitator:".bright_cyan());
        println!("  {:18} Create a task and start voting", "/task <title>".yellow());
        println!("  {:18} Reveal the votes", "/reveal".yellow());
        println!("  {:18} Clear votes and vote again", "/reset".yellow());
        println!("  {:18} Record the agreed estimate", "/final <n>".yellow());
        println!("  {:18} List previous tasks", "/tasks".yellow());
        println!("  {:18} Vote again on a previous task", "/select <task>".yellow());
        println!();
        println!("  {:18} Show this help", "/help".yellow());
        println!("  {:18} Exit the REPL", "/quit".yellow());
        println!();
    }
}

/// Print the result of a transition
fn report(result: SessionResponse<Outcome>, applied: &str) -> Result<()> {
    match result {
        Ok(Outcome::Applied) => {
            println!("{} {}", "✓".green(), applied);
            Ok(())
        }
        Ok(Outcome::Unchanged) => {
            println!("{}", "Nothing to change.".dimmed());
            Ok(())
        }
        Err(SessionError::Rejected(rejection)) => {
            println!("{} {}", "✗".red(), rejection);
            Ok(())
        }
        Err(SessionError::ChannelError) => Err(eyre!("Session is no longer running")),
    }
}
