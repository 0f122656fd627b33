//! Temperature reading and unit conversion

use serde::{Deserialize, Serialize};

/// A single Celsius reading from the weather lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureReading {
    pub celsius: f64,
}

impl TemperatureReading {
    #[must_use]
    pub fn new(celsius: f64) -> Self {
        Self { celsius }
    }
}

/// Response payload: one reading expressed in three units
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct WeatherResponse {
    /// Temperature in Celsius
    #[serde(rename = "temp_c")]
    pub celsius: f64,
    /// Temperature in Fahrenheit
    #[serde(rename = "temp_f")]
    pub fahrenheit: f64,
    /// Temperature in Kelvin (offset 273, not 273.15)
    #[serde(rename = "temp_k")]
    pub kelvin: f64,
}

impl WeatherResponse {
    /// Convert a Celsius value into all three units. No rounding is applied.
    #[must_use]
    pub fn from_celsius(celsius: f64) -> Self {
        Self {
            celsius,
            fahrenheit: celsius_to_fahrenheit(celsius),
            kelvin: celsius_to_kelvin(celsius),
        }
    }
}

impl From<TemperatureReading> for WeatherResponse {
    fn from(reading: TemperatureReading) -> Self {
        Self::from_celsius(reading.celsius)
    }
}

#[must_use]
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 1.8 + 32.0
}

#[must_use]
pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    celsius + 273.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(25.0, 77.0, 298.0)]
    #[case(0.0, 32.0, 273.0)]
    #[case(100.0, 212.0, 373.0)]
    #[case(-40.0, -40.0, 233.0)]
    fn test_known_conversions(#[case] celsius: f64, #[case] fahrenheit: f64, #[case] kelvin: f64) {
        let response = WeatherResponse::from_celsius(celsius);
        assert_eq!(response.celsius, celsius);
        assert_eq!(response.fahrenheit, fahrenheit);
        assert_eq!(response.kelvin, kelvin);
    }

    #[rstest]
    #[case(21.3)]
    #[case(-3.7)]
    #[case(0.1)]
    #[case(1e-9)]
    fn test_conversion_is_exact_formula(#[case] celsius: f64) {
        let response = WeatherResponse::from(TemperatureReading::new(celsius));
        assert_eq!(response.fahrenheit, celsius * 1.8 + 32.0);
        assert_eq!(response.kelvin, celsius + 273.0);
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(WeatherResponse::from_celsius(25.0)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"temp_c": 25.0, "temp_f": 77.0, "temp_k": 298.0})
        );
    }
}
