use crate::model::TemperatureUnit;

/// Offset used for Kelvin conversion. Whole degrees, matching the values
/// users have always seen.
pub const KELVIN_OFFSET: f64 = 273.0;

/// Converts a Kelvin reading to whole display degrees, rounding down.
pub fn kelvin_to(unit: TemperatureUnit, kelvin: f64) -> i64 {
    let celsius = kelvin - KELVIN_OFFSET;
    let value = match unit {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
    };
    value.floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn celsius_floors_after_offset() {
        assert_eq!(kelvin_to(TemperatureUnit::Celsius, 300.9), 27);
        assert_eq!(kelvin_to(TemperatureUnit::Celsius, 273.0), 0);
        assert_eq!(kelvin_to(TemperatureUnit::Celsius, 272.5), -1);
    }

    #[test]
    fn fahrenheit_uses_same_offset() {
        assert_eq!(kelvin_to(TemperatureUnit::Fahrenheit, 273.0), 32);
        assert_eq!(kelvin_to(TemperatureUnit::Fahrenheit, 373.0), 212);
        assert_eq!(kelvin_to(TemperatureUnit::Fahrenheit, 300.0), 80);
    }
}
