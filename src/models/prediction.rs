//! Prediction result and display formatting

use serde::{Deserialize, Serialize};

/// Temperatures predicted by the model, in Celsius.
///
/// No ordering between the three values is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperaturePrediction {
    pub tmin: f64,
    pub tmax: f64,
    pub tavg: f64,
}

/// One labelled value as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub label: &'static str,
    pub value: String,
    pub help: &'static str,
}

impl TemperaturePrediction {
    #[must_use]
    pub fn new(tmin: f64, tmax: f64, tavg: f64) -> Self {
        Self { tmin, tmax, tavg }
    }

    /// Format a temperature with two decimals and unit
    #[must_use]
    pub fn format_celsius(value: f64) -> String {
        format!("{value:.2} °C")
    }

    /// Tmin, Tmax and Tavg in display order
    #[must_use]
    pub fn metrics(&self) -> [Metric; 3] {
        [
            Metric {
                label: "Tmin",
                value: Self::format_celsius(self.tmin),
                help: "Minimum Temperature",
            },
            Metric {
                label: "Tmax",
                value: Self::format_celsius(self.tmax),
                help: "Maximum Temperature",
            },
            Metric {
                label: "Tavg",
                value: Self::format_celsius(self.tavg),
                help: "Average Temperature",
            },
        ]
    }
}

impl From<[f64; 3]> for TemperaturePrediction {
    fn from([tmin, tmax, tavg]: [f64; 3]) -> Self {
        Self { tmin, tmax, tavg }
    }
}
