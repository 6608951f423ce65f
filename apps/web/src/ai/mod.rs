pub mod interactions;
pub mod upload;
