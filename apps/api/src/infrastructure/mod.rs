pub mod database;
pub mod monitoring;
