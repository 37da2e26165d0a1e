use serde::Deserialize;

use crate::predict::types::{ContactWindow, Pass};

/// Constant-rate downlink model.
///
/// `efficiency` is expected in [0, 1] but is not clamped; out-of-range values
/// are applied as given.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LinkModel {
    pub downlink_mbps: f64,
    pub efficiency: f64,
}

impl LinkModel {
    pub fn data_return_mbit(&self, duration_s: f64) -> f64 {
        duration_s * self.downlink_mbps * self.efficiency
    }

    pub fn estimate(&self, window: ContactWindow) -> Pass {
        Pass {
            estimated_data_mbit: self.data_return_mbit(window.duration_s),
            window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::testing::at;

    fn window(duration_s: i64) -> ContactWindow {
        ContactWindow {
            aos: at(0),
            los: at(duration_s),
            tca: at(duration_s / 2),
            max_elevation_deg: 30.0,
            duration_s: duration_s as f64,
            aos_truncated: false,
            los_truncated: false,
        }
    }

    #[test]
    fn test_data_return() {
        let link = LinkModel {
            downlink_mbps: 50.0,
            efficiency: 0.7,
        };
        let pass = link.estimate(window(400));
        assert!((pass.estimated_data_mbit - 400.0 * 50.0 * 0.7).abs() < 1e-9);
        // 14000 Mbit = 1750 MB
        assert!((pass.estimated_data_mb() - 1750.0).abs() < 1e-9);
        assert_eq!(pass.window, window(400));
    }

    #[test]
    fn test_efficiency_not_clamped() {
        let link = LinkModel {
            downlink_mbps: 10.0,
            efficiency: 1.5,
        };
        assert!((link.data_return_mbit(100.0) - 1500.0).abs() < 1e-9);

        let link = LinkModel {
            downlink_mbps: 10.0,
            efficiency: -0.5,
        };
        assert!((link.data_return_mbit(100.0) + 500.0).abs() < 1e-9);
    }
}
