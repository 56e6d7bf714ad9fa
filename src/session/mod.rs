pub mod command;
pub mod controller;

pub use command::{Command, LoopState, QUIT_COMMAND};
pub use controller::{analyze_once, Session, SessionSettings};
