pub mod types;

pub use types::MollyError;
