//! Domain types for planning poker
//!
//! - Session: facilitator, current task, task history, participants
//! - Task: one item under estimation and its votes
//! - Vote: a single card played by a user

mod session;
mod task;
mod vote;

pub use session::{Participant, Session};
pub use task::Task;
pub use vote::{Vote, VoteValue};
