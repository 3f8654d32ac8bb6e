//! Value range and color mapping for volatility values

use serde::{Deserialize, Serialize};

/// Normalized position used for flat surfaces and non-finite samples
pub const NEUTRAL_T: f64 = 0.5;

/// Observed minimum and maximum volatility of a grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolBounds {
    pub min: f64,
    pub max: f64,
}

impl VolBounds {
    /// Single pass over `values`, skipping NaN and infinities.
    ///
    /// Returns `None` when no finite value was seen.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values.into_iter().filter(|v| v.is_finite()) {
            min = min.min(v);
            max = max.max(v);
        }
        if min > max {
            None
        } else {
            Some(Self { min, max })
        }
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_degenerate(&self) -> bool {
        self.max <= self.min
    }

    /// Map `value` linearly into [0, 1].
    pub fn normalize(&self, value: f64) -> f64 {
        if self.is_degenerate() || !value.is_finite() {
            return NEUTRAL_T;
        }
        ((value - self.min) / self.range()).clamp(0.0, 1.0)
    }
}

/// Gradient applied to normalized volatility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ColorScale {
    /// (t, 1 - t, 0.5): green at the low end, red at the high end
    #[default]
    RedGreen,
    Viridis,
}

impl ColorScale {
    /// RGB components in [0, 1] for a normalized value.
    pub fn rgb(&self, t: f64) -> [f32; 3] {
        match self {
            ColorScale::RedGreen => [t as f32, (1.0 - t) as f32, 0.5],
            ColorScale::Viridis => {
                let c = colorous::VIRIDIS.eval_continuous(t.clamp(0.0, 1.0));
                [
                    c.r as f32 / 255.0,
                    c.g as f32 / 255.0,
                    c.b as f32 / 255.0,
                ]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn bounds_skip_non_finite() {
        let bounds = VolBounds::from_values([0.3, f64::NAN, 0.1, f64::INFINITY, 0.2]).unwrap();
        assert_eq!(bounds, VolBounds { min: 0.1, max: 0.3 });
    }

    #[test]
    fn bounds_of_nothing_is_none() {
        assert!(VolBounds::from_values(Vec::new()).is_none());
        assert!(VolBounds::from_values([f64::NAN]).is_none());
    }

    #[test]
    fn normalize_maps_range_to_unit_interval() {
        let bounds = VolBounds { min: 5.0, max: 9.0 };
        assert_eq!(bounds.normalize(5.0), 0.0);
        assert_eq!(bounds.normalize(9.0), 1.0);
        assert_abs_diff_eq!(bounds.normalize(6.0), 0.25, epsilon = 1e-12);
        assert_eq!(bounds.normalize(12.0), 1.0);
    }

    #[test]
    fn degenerate_range_is_neutral() {
        let bounds = VolBounds { min: 0.2, max: 0.2 };
        assert!(bounds.is_degenerate());
        assert_eq!(bounds.normalize(0.2), NEUTRAL_T);
    }

    #[test]
    fn red_green_keeps_blue_fixed() {
        assert_eq!(ColorScale::RedGreen.rgb(0.0), [0.0, 1.0, 0.5]);
        assert_eq!(ColorScale::RedGreen.rgb(1.0), [1.0, 0.0, 0.5]);
        assert_eq!(ColorScale::RedGreen.rgb(0.5), [0.5, 0.5, 0.5]);
    }

    #[test]
    fn viridis_stays_in_unit_range() {
        for t in [0.0, 0.3, 0.7, 1.0] {
            for c in ColorScale::Viridis.rgb(t) {
                assert!((0.0..=1.0).contains(&c));
            }
        }
    }
}
