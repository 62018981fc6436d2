// ============================================================================
// Interactive Entry Front End
// ============================================================================
//
// - state:    two-screen state machine with pure transitions
// - session:  applies a transition's effects (publish, insert, refresh)
// - terminal: line-based form driving a session from stdin
//
// ============================================================================

mod session;
mod state;
mod terminal;

pub use session::EntrySession;
pub use state::{parse_amount, transition, validate_amount, EntryEvent, EntryState, Transition};
pub use terminal::{parse_input, render, run_terminal, Input};
