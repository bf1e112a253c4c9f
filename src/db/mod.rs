pub mod connection;
pub mod findings;
pub mod hosts;
pub mod schema;
pub mod scans;
pub mod services;

pub use connection::Database;
