//! Reload scheduling.
//!
//! External edits to the watched files arrive as a burst of change signals
//! (editor auto-save chatter, atomic-rename writers). The scheduler owns a
//! single cancellable timer and collapses each burst into one reload.

mod debounce;

pub use debounce::{ChangeSignal, DebounceScheduler, DEBOUNCE_DELAY};
