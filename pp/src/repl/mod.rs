//! Interactive REPL for Planning Poker
//!
//! One session lives for the lifetime of the REPL. Several participants can
//! join from the same terminal and take turns with `/as`.

mod command;
mod session;

pub use command::ReplCommand;
pub use session::{ReplSession, SlashResult};

use eyre::Result;
use tracing::info;

use crate::config::Config;
use crate::registry::SessionRegistry;

/// Run the interactive REPL
///
/// This is the main entry point for `pp play`.
pub async fn run_interactive(config: &Config, name: Option<String>) -> Result<()> {
    let registry = SessionRegistry::new(config.session.clone());
    let manager = registry.create_session().await;
    info!(session_id = %manager.session_id(), "Starting interactive session");

    let mut session = ReplSession::new(manager);
    let result = session.run(name).await;

    registry.shutdown_all().await;
    result
}
