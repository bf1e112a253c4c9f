pub mod scan;
pub mod host;
pub mod service;
pub mod finding;

pub use scan::{Scan, ScanStatus};
pub use host::Host;
pub use service::Service;
pub use finding::Finding;
