pub mod app;
pub mod catalog;
pub mod cli;
pub mod command;
pub mod config;
pub mod executor;
pub mod history;
pub mod logging;
pub mod output;
pub mod runner;
pub mod scan;
pub mod wordlist;

#[cfg(test)]
mod tests;
