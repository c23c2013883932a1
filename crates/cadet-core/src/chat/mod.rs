//! The conversation side of cadet.
//!
//! Session setup, streamed answer rendering, and the interactive loop that
//! drives them. Entry point: `controller::ChatController::run`.

pub mod backend;
pub mod controller;
pub mod input;
pub mod renderer;
pub mod session;
