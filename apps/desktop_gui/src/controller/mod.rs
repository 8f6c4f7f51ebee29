//! Controller layer: UI events, the upload-and-classify controller, and command orchestration.

pub mod events;
pub mod orchestration;
pub mod upload;
