//! fonthandle command line library.

pub mod args;
pub mod cli;
pub mod commands;
pub mod io;
pub mod parallel;
