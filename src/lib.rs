#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stderr)]
#![deny(clippy::print_stdout)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod chat;
pub mod cli;
pub mod error;
pub mod kb;
pub mod matcher;

mod render;
