pub mod config;
pub mod logging;

pub mod catalog;
pub mod generator;
pub mod report;
pub mod retry;
pub mod scheduler;
pub mod state;
pub mod task;
