//! Export format implementations.

mod bundle;
mod json;
mod yolo;

pub use bundle::BundleFormat;
pub use json::JsonFormat;
pub use yolo::YoloFormat;

#[cfg(test)]
mod tests;
