//! Order session: the wizard state machine.
//!
//! # State diagram
//!
//! ```text
//!            start_order            submit (valid)          settle Ok
//!   Home ───────────────► Order ─────────────────► Payment ──────────► Confirmation
//!    ▲                      │  ▲                    │   ▲                   │
//!    └──────── back ────────┘  └────── back ────────┘   │ settle Err        │
//!    ▲                                                  └─(stays, retry)    │
//!    └──────────────────────── start_new_order (fresh draft) ───────────────┘
//! ```
//!
//! The draft is editable only on `Order`. Anything not drawn above returns
//! [`SessionError::IllegalTransition`] and leaves the session untouched.

mod state_machine;

pub use state_machine::{OrderSession, SessionError};
