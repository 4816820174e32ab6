// Public API for integration tests and alternative front ends

pub mod config;
pub mod console;
pub mod prompts;
pub mod protocol;
pub mod state;
pub mod store;
pub mod types;

pub mod broadcast;
