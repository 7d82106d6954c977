pub mod config;
pub mod reports;
pub mod research;
pub mod scan;
pub mod upgrade;
