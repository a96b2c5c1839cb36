pub mod config;
pub mod data_generator;
pub mod harness;
pub mod report;
