use serde::{Deserialize, Serialize};

pub const DEFAULT_SHIFT_PEAK_CENTER: f64 = 284.4;
pub const DEFAULT_X_MIN: f64 = 280.0;
pub const DEFAULT_X_MAX: f64 = 290.0;

/// Parameters for charge-shift correction.
///
/// The reference peak is searched for between `x_min` and `x_max`, and the whole
/// energy axis is offset so that it lands on `shift_peak_center`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShiftSettings {
    #[serde(
        rename = "ShiftPeakCenter",
        alias = "shiftPeakCenter",
        default = "default_center"
    )]
    pub shift_peak_center: f64,
    #[serde(rename = "XMax", alias = "xMax", default = "default_x_max")]
    pub x_max: f64,
    #[serde(rename = "XMin", alias = "xMin", default = "default_x_min")]
    pub x_min: f64,
}

fn default_center() -> f64 {
    DEFAULT_SHIFT_PEAK_CENTER
}

fn default_x_min() -> f64 {
    DEFAULT_X_MIN
}

fn default_x_max() -> f64 {
    DEFAULT_X_MAX
}

impl Default for ShiftSettings {
    fn default() -> Self {
        Self {
            shift_peak_center: DEFAULT_SHIFT_PEAK_CENTER,
            x_max: DEFAULT_X_MAX,
            x_min: DEFAULT_X_MIN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let settings: ShiftSettings = serde_json::from_str(r#"{"ShiftPeakCenter": 285.0}"#).unwrap();
        assert_eq!(settings.shift_peak_center, 285.0);
        assert_eq!(settings.x_min, DEFAULT_X_MIN);
        assert_eq!(settings.x_max, DEFAULT_X_MAX);
    }

    #[test]
    fn accepts_camel_case_keys() {
        let settings: ShiftSettings =
            serde_json::from_str(r#"{"shiftPeakCenter": 284.8, "xMin": 281.0, "xMax": 289.0}"#)
                .unwrap();
        assert_eq!(
            settings,
            ShiftSettings {
                shift_peak_center: 284.8,
                x_max: 289.0,
                x_min: 281.0
            }
        );
    }
}
