pub mod formatter;
pub mod pdf;

pub use formatter::{format_detailed_host_report, format_network_scan_summary};
pub use pdf::{build_scan_folder_name, generate_pdf_report};
