pub mod cpe;
pub mod client;

pub use client::{CveClient, CveSummary};
pub use cpe::build_cpe;
