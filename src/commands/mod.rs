//! Deploy steps and the fixed plan they are arranged in
//!
//! A step is either a shell command line (the deploy command, which is opaque to
//! shipit) or an explicit argument vector (every git step). Building the commit
//! step from an argument vector means the commit message never passes through a
//! shell and needs no escaping.

pub mod command;
pub mod plan;
