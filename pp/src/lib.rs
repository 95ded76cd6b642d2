//! Planpoker - planning poker sessions in the terminal
//!
//! Wraps the `pokercore` state machine in one actor per session, keeps live
//! sessions in a registry, and drives them from an interactive REPL.
//!
//! # Modules
//!
//! - [`state`] - `SessionManager` actor and its change events
//! - [`registry`] - Live sessions keyed by `SessionId`
//! - [`view`] - Per-viewer board rendering
//! - [`repl`] - Interactive slash-command session
//! - [`demo`] - Scripted estimation round
//! - [`config`] - Configuration loading
//! - [`cli`] - Command line definitions

pub mod cli;
pub mod config;
pub mod demo;
pub mod registry;
pub mod repl;
pub mod state;
pub mod view;

pub use config::{Config, SessionConfig};
pub use demo::{DemoReport, run_demo};
pub use registry::SessionRegistry;
pub use repl::{ReplSession, run_interactive};
pub use state::{SessionError, SessionEvent, SessionManager, SessionResponse};
pub use view::Board;
