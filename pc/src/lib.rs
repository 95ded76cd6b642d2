//! PokerCore - planning poker session state machine
//!
//! A facilitator creates tasks, participants cast hidden votes from a fixed
//! scale, and the facilitator reveals the results with their average and any
//! outlier votes flagged.
//!
//! # Modules
//!
//! - [`domain`] - Session, Task, Participant, Vote and the voting scale
//! - [`machine`] - `SessionMachine`, the only thing that mutates a session
//! - [`tally`] - Average and outlier detection for revealed votes
//! - [`id`] - Opaque ID generation and partial-ID resolution
//! - [`rejection`] - Why a transition was refused
//!
//! # Example
//!
//! ```
//! use pokercore::{SessionMachine, VoteValue};
//!
//! let mut m = SessionMachine::default();
//! m.join("a", "Alice").unwrap();
//! m.become_facilitator("a").unwrap();
//! m.create_task("a", "Login page").unwrap();
//! m.vote("a", VoteValue::Five).unwrap();
//! m.reveal_votes("a").unwrap();
//! assert_eq!(m.results().unwrap().average, 5.0);
//! ```

pub mod domain;
pub mod id;
pub mod machine;
pub mod rejection;
pub mod tally;

pub use domain::{Participant, Session, Task, Vote, VoteValue};
pub use id::{IdResolver, SessionId, generate_id, new_task_id, new_user_id};
pub use machine::{Action, Outcome, SessionMachine, SessionPolicy, Transition};
pub use rejection::Rejection;
pub use tally::{DEFAULT_OUTLIER_RATIO, OutlierPolicy, Tally, TallyEntry, average, is_outlier};
