//! Entity dataset handed over by the hosting application.
//!
//! The dataset is a JSON asset validated once at load time. Every failure is
//! fatal and surfaced before the render loop starts.

/// Raw dataset asset, validated node records and load-time errors.
pub mod dataset;
