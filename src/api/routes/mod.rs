pub mod chat;
pub mod health;
pub mod reports;
pub mod scans;
pub mod session;
