//! Per-category term weights and tier score thresholds.

use serde::{Deserialize, Serialize};

/// Points awarded per matched term, by category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    /// Per distinct location (title, keywords, abstract or raw text).
    #[serde(default = "default_priority_weight")]
    pub priority: f64,
    /// Once per term, presence only.
    #[serde(default = "default_high_weight")]
    pub high: f64,
    /// Once per term, presence only.
    #[serde(default = "default_adequate_weight")]
    pub adequate: f64,
}

fn default_priority_weight() -> f64 { 3.0 }
fn default_high_weight()     -> f64 { 1.5 }
fn default_adequate_weight() -> f64 { 0.5 }

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            priority: default_priority_weight(),
            high:     default_high_weight(),
            adequate: default_adequate_weight(),
        }
    }
}

impl CategoryWeights {
    pub fn as_array(&self) -> [f64; 3] {
        [self.priority, self.high, self.adequate]
    }

    /// All weights finite and non-negative.
    pub fn validate(&self) -> bool {
        self.as_array().iter().all(|w| w.is_finite() && *w >= 0.0)
    }
}

/// Minimum score for each tier. A score below `adequate` is Low.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    #[serde(default = "default_excellence")]
    pub excellence: f64,
    #[serde(default = "default_high")]
    pub high: f64,
    #[serde(default = "default_adequate")]
    pub adequate: f64,
    #[serde(default)]
    pub low: f64,
}

fn default_excellence() -> f64 { 12.0 }
fn default_high()       -> f64 { 6.0 }
fn default_adequate()   -> f64 { 2.0 }

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            excellence: default_excellence(),
            high:       default_high(),
            adequate:   default_adequate(),
            low:        0.0,
        }
    }
}

impl TierThresholds {
    /// Finite and strictly descending from excellence to low.
    pub fn validate(&self) -> bool {
        let t = [self.excellence, self.high, self.adequate, self.low];
        t.iter().all(|v| v.is_finite()) && t.windows(2).all(|w| w[0] > w[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(CategoryWeights::default().validate());
        assert!(TierThresholds::default().validate());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let w = CategoryWeights { high: -1.0, ..Default::default() };
        assert!(!w.validate());
        let w = CategoryWeights { adequate: f64::NAN, ..Default::default() };
        assert!(!w.validate());
    }

    #[test]
    fn test_thresholds_must_descend() {
        let t = TierThresholds { high: 12.0, ..Default::default() };
        assert!(!t.validate());
        let t = TierThresholds { adequate: 7.0, ..Default::default() };
        assert!(!t.validate());
    }
}
