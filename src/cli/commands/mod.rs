//! Command implementations for the demoscan CLI

pub mod config;
pub mod run;
