//! Session module - per-session dispatcher architecture
//!
//! A [`SessionManager`] routes inputs to one [`Dispatcher`] task per
//! session. Each dispatcher owns its [`ChatSession`] history and runs the
//! bounded tool-call loop for one turn at a time:
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 SessionManager                   │
//! │                                                  │
//! │  push_message(session_id, input) ────────────▶   │
//! │                                                  │
//! │  ┌──────────────────────────────────────────┐    │
//! │  │  HashMap<SessionId, Sender<SessionInput>>│    │
//! │  │                                          │    │
//! │  │  session_1 -> tx1 ──▶ [Dispatcher 1] ─┐  │    │
//! │  │  session_2 -> tx2 ──▶ [Dispatcher 2] ─┼───────▶ output_rx
//! │  │  session_3 -> tx3 ──▶ [Dispatcher 3] ─┘  │    │
//! │  └──────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────┘
//! ```

mod chat;
mod dispatcher;
mod manager;
pub mod persistence;
mod types;

pub use chat::{ChatMessage, ChatSession, Role, DEFAULT_SYSTEM_PROMPT};
pub use dispatcher::{Dispatcher, TurnOutcome, TurnPhase};
pub use manager::{ConfigFactory, OutputReceiver, SessionManager};
pub use types::{SessionConfig, SessionId, SessionInput, SessionOutput, TurnFailure};
