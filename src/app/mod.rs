// Terminal front end: prompt commands and the interactive loop.

pub mod commands;
pub mod repl;
