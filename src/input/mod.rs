pub mod stats;
pub mod upload;
