//! Interactive terminal chat for cadet.
//!
//! Entry point: `runner::run_chat`. Startup resolves configuration, opens and
//! seeds the conversation, then hands everything to the loop controller.

pub mod banner;
pub mod input;
pub mod runner;
