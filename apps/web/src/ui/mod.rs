//! Server-held document model, pure views, and the transient overlay contract.

pub mod dom;
pub mod overlay;
pub mod pending;
pub mod views;
