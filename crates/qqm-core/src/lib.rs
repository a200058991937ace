pub mod config;
pub mod logging;

pub mod client;
pub mod engine;
pub mod monitor;
pub mod policy;
pub mod task;
pub mod tracker;
