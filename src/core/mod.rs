//! # Core Application Logic
//!
//! Parley's business logic. Nothing in here knows about terminals.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI.         │
//!                    └───────────┬─────────────┘
//!                                │
//!                   ┌────────────┴────────────┐
//!                   ▼                         ▼
//!            ┌────────────┐            ┌────────────┐
//!            │    TUI     │            │  Backend   │
//!            │  Adapter   │            │  (HTTP)    │
//!            │ (ratatui)  │            │            │
//!            └────────────┘            └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`thread`]: The append-only message log and its placeholder protocol
//! - [`message`]: Message records and quoted-segment splitting
//! - [`conversation`]: Conversation summaries, search, and display helpers
//! - [`config`]: Layered configuration (file, env, CLI)

pub mod action;
pub mod config;
pub mod conversation;
pub mod message;
pub mod state;
pub mod thread;
