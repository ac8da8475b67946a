pub mod commands;
pub mod config;
pub mod discord;
pub mod errors;
pub mod models;
pub mod parsers;
pub mod report;
pub mod scrapers;
pub mod snapshot;
pub mod storage;
pub mod utils;
