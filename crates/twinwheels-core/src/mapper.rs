//! Angle <-> frequency mapping for a rotary wheel.
//!
//! The circle is split into `n` equal sectors, one per anchor. Sector `i`
//! starts at `i * 360/n` degrees (0 is 12 o'clock) and interpolates linearly
//! from `A[i]` to `A[i+1]`. The last sector closes the circle and is governed
//! by [`WrapSector`].

use crate::constants::{FULL_TURN_DEG, MAX_ANGLE_DEG, ZERO_POSITION_DEG};
use crate::error::ConfigError;
use serde::Deserialize;

/// How the final sector (last anchor back to 12 o'clock) is interpolated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapSector {
    /// Last anchor ramps up to the frequency ceiling.
    #[default]
    CeilingRamp,
    /// Last anchor interpolates back down to the first anchor.
    BackToFirst,
}

/// Result of a forward mapping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MappedFrequency {
    pub hz: f64,
    pub sector: usize,
}

/// Immutable anchor set plus ceiling. Shared read-only by both wheels.
#[derive(Clone, Debug)]
pub struct FrequencyMapper {
    anchors: Vec<f64>,
    max_hz: f64,
    wrap: WrapSector,
}

impl FrequencyMapper {
    pub fn new(anchors: Vec<f64>, max_hz: f64, wrap: WrapSector) -> Result<Self, ConfigError> {
        if anchors.len() < 2 {
            return Err(ConfigError::TooFewAnchors(anchors.len()));
        }
        for (index, &value) in anchors.iter().enumerate() {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidAnchor { index, value });
            }
        }
        for pair in anchors.windows(2) {
            if pair[1] <= pair[0] {
                return Err(ConfigError::AnchorsNotAscending {
                    prev: pair[0],
                    next: pair[1],
                });
            }
        }
        let top_anchor = anchors[anchors.len() - 1];
        if !max_hz.is_finite() || max_hz < top_anchor {
            return Err(ConfigError::CeilingBelowTopAnchor { max_hz, top_anchor });
        }
        Ok(Self {
            anchors,
            max_hz,
            wrap,
        })
    }

    pub fn anchors(&self) -> &[f64] {
        &self.anchors
    }

    pub fn max_hz(&self) -> f64 {
        self.max_hz
    }

    pub fn wrap(&self) -> WrapSector {
        self.wrap
    }

    pub fn lowest_anchor(&self) -> f64 {
        self.anchors[0]
    }

    #[inline]
    pub fn sector_width(&self) -> f64 {
        FULL_TURN_DEG / self.anchors.len() as f64
    }

    /// Angle at which anchor `index` sits (start of its sector).
    pub fn anchor_angle(&self, index: usize) -> f64 {
        index.min(self.anchors.len() - 1) as f64 * self.sector_width()
    }

    /// Highest frequency reachable by rotation alone.
    pub fn top_frequency(&self) -> f64 {
        match self.wrap {
            WrapSector::CeilingRamp => self.max_hz,
            WrapSector::BackToFirst => self.anchors[self.anchors.len() - 1],
        }
    }

    /// Endpoints `(start, end)` of sector `index`.
    fn sector_bounds(&self, index: usize) -> (f64, f64) {
        let n = self.anchors.len();
        let next = (index + 1) % n;
        let start = self.anchors[index];
        let end = if next == 0 {
            match self.wrap {
                WrapSector::CeilingRamp => self.max_hz,
                WrapSector::BackToFirst => self.anchors[0],
            }
        } else {
            self.anchors[next]
        };
        (start, end)
    }

    pub fn angle_to_frequency(&self, angle_deg: f64) -> MappedFrequency {
        let width = self.sector_width();
        let angle = normalize_angle(angle_deg);
        let sector = ((angle / width).floor() as usize).min(self.anchors.len() - 1);
        let ratio = (angle - sector as f64 * width) / width;
        let (start, end) = self.sector_bounds(sector);
        let hz = (start + (end - start) * ratio).clamp(0.0, self.max_hz);
        MappedFrequency { hz, sector }
    }

    pub fn frequency_to_angle(&self, hz: f64) -> f64 {
        let width = self.sector_width();
        let target = if hz.is_finite() {
            hz.clamp(0.0, self.max_hz)
        } else {
            0.0
        };
        if target <= 0.0 || target < self.anchors[0] {
            return ZERO_POSITION_DEG;
        }
        let top = self.top_frequency();
        if target >= top {
            return match self.wrap {
                WrapSector::CeilingRamp => MAX_ANGLE_DEG,
                WrapSector::BackToFirst => self.anchor_angle(self.anchors.len() - 1),
            };
        }
        for sector in 0..self.anchors.len() {
            let (start, end) = self.sector_bounds(sector);
            // The closing sector of a BackToFirst wheel runs downwards and
            // never wins the scan: every value it covers is found earlier.
            if end <= start {
                continue;
            }
            if target >= start && target <= end {
                let ratio = (target - start) / (end - start);
                return sector as f64 * width + ratio * width;
            }
        }
        MAX_ANGLE_DEG
    }
}

/// Normalize any angle into `[0, 360)`.
#[inline]
pub fn normalize_angle(angle_deg: f64) -> f64 {
    let a = angle_deg.rem_euclid(FULL_TURN_DEG);
    if a >= FULL_TURN_DEG {
        0.0
    } else {
        a
    }
}
