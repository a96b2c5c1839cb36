pub mod database;
pub mod dianadb;
pub mod memory;
pub mod mongodb;
pub mod postgres;
