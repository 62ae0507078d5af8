pub mod compare;
pub mod config;
pub mod convert;
pub mod database;
pub mod extractor;
pub mod fetch;
pub mod job;
pub mod links;
pub mod model;
pub mod patch;
pub mod report;
pub mod tui;
