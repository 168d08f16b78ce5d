//! Cone search position and radius.

use crate::error::{VoError, VoResult};
use serde::{Deserialize, Serialize};

/// A cone on the sky: ICRS position and search radius, all in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConeQuery {
    /// Right ascension of the cone center, normalized into [0, 360)
    pub ra: f64,

    /// Declination of the cone center, in [-90, 90]
    pub dec: f64,

    /// Search radius (SR), non-negative
    pub sr: f64,
}

impl ConeQuery {
    /// Build a validated query.
    pub fn new(ra: f64, dec: f64, sr: f64) -> VoResult<Self> {
        if !ra.is_finite() || !dec.is_finite() || !sr.is_finite() {
            return Err(VoError::InvalidQuery(format!(
                "RA, DEC and SR must be finite, got ({}, {}, {})",
                ra, dec, sr
            )));
        }

        if !(-90.0..=90.0).contains(&dec) {
            return Err(VoError::InvalidQuery(format!(
                "DEC must be between -90 and 90 degrees, got {}",
                dec
            )));
        }

        if sr < 0.0 {
            return Err(VoError::InvalidQuery(format!(
                "SR cannot be negative, got {}",
                sr
            )));
        }

        // rem_euclid rounds tiny negatives up to exactly 360
        let ra = ra.rem_euclid(360.0);
        let ra = if ra >= 360.0 { 0.0 } else { ra };

        Ok(Self {
            ra,
            dec,
            sr,
        })
    }

    /// Same position with a different radius.
    pub fn with_radius(&self, sr: f64) -> VoResult<Self> {
        Self::new(self.ra, self.dec, sr)
    }

    /// Query string parameters for the Cone Search protocol.
    ///
    /// `VERB` selects how many columns the service returns (1 = minimal, 3 = all).
    pub fn to_params(&self, verb: u8) -> String {
        format!(
            "RA={}&DEC={}&SR={}&VERB={}",
            self.ra, self.dec, self.sr, verb
        )
    }
}
