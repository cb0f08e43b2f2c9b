pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod interactive;
pub mod locator;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod scanner;
