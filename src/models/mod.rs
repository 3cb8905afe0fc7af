//! Data models for the temperature predictor
//!
//! This module contains the core domain models organized by concern:
//! - City: the supported cities and their geographic metadata
//! - Season: the season selector and its month mapping
//! - Prediction: predicted temperatures and their display form

pub mod city;
pub mod prediction;
pub mod season;

// Re-export all public types for convenient access
pub use city::{City, CityMetadata};
pub use prediction::{Metric, TemperaturePrediction};
pub use season::Season;
