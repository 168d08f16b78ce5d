//! Cost prediction for a cone search from a few small probe queries.

use crate::conesearch::{ConeSearch, SearchOptions};
use crate::error::VoResult;
use crate::models::ConeQuery;
use std::time::Instant;

/// Fractions of the requested radius used for probes, smallest first.
const PROBE_FRACTIONS: [f64; 3] = [0.1, 0.25, 0.5];

/// One probe measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Probe {
    sr: f64,
    seconds: f64,
    rows: f64,
}

impl ConeSearch {
    /// Predict `(seconds, rows)` for searching `url` with `query`.
    ///
    /// Probes run at fractions of the radius, never the full radius, and stop
    /// early once a probe takes longer than the remote timeout. Probe errors
    /// are returned unchanged.
    pub fn predict_search(
        &self,
        url: &str,
        query: &ConeQuery,
        options: SearchOptions,
    ) -> VoResult<(f64, usize)> {
        if query.sr == 0.0 {
            let probe = self.probe(url, query, options)?;
            return Ok((probe.seconds, probe.rows as usize));
        }

        let timeout = self.config().remote_timeout().as_secs_f64();
        let mut probes = Vec::with_capacity(PROBE_FRACTIONS.len());

        for fraction in PROBE_FRACTIONS {
            let probe = self.probe(url, &query.with_radius(query.sr * fraction)?, options)?;
            tracing::debug!(
                "Probe sr={:.6}: {} rows in {:.3}s",
                probe.sr,
                probe.rows,
                probe.seconds
            );
            probes.push(probe);

            if probe.seconds > timeout {
                tracing::warn!(
                    "Probe at sr={:.6} took {:.3}s (timeout {:.0}s), stopping probes",
                    probe.sr,
                    probe.seconds,
                    timeout
                );
                break;
            }
        }

        Ok(extrapolate(&probes, query.sr))
    }

    fn probe(&self, url: &str, query: &ConeQuery, options: SearchOptions) -> VoResult<Probe> {
        let start = Instant::now();
        let table = self.search_url(url, query, options)?;
        Ok(Probe {
            sr: query.sr,
            seconds: start.elapsed().as_secs_f64(),
            rows: table.size() as f64,
        })
    }
}

/// Fit the probes and evaluate at radius `sr`.
///
/// Rows follow `k * sr^2` (least squares through the origin). Seconds follow
/// `a + b * rows`; with fewer than two distinct row counts, or a negative
/// slope, the mean probe time is used instead.
fn extrapolate(probes: &[Probe], sr: f64) -> (f64, usize) {
    if probes.is_empty() {
        return (0.0, 0);
    }

    let sum_sq2: f64 = probes.iter().map(|p| p.sr.powi(4)).sum();
    let k = if sum_sq2 > 0.0 {
        probes.iter().map(|p| p.rows * p.sr.powi(2)).sum::<f64>() / sum_sq2
    } else {
        0.0
    };
    let rows = (k * sr * sr).max(0.0);

    let n = probes.len() as f64;
    let mean_rows = probes.iter().map(|p| p.rows).sum::<f64>() / n;
    let mean_secs = probes.iter().map(|p| p.seconds).sum::<f64>() / n;
    let var_rows: f64 = probes.iter().map(|p| (p.rows - mean_rows).powi(2)).sum();

    let seconds = if var_rows > 0.0 {
        let cov: f64 = probes
            .iter()
            .map(|p| (p.rows - mean_rows) * (p.seconds - mean_secs))
            .sum();
        let slope = cov / var_rows;
        if slope >= 0.0 {
            mean_secs + slope * (rows - mean_rows)
        } else {
            mean_secs
        }
    } else {
        mean_secs
    };

    let fastest = probes
        .iter()
        .map(|p| p.seconds)
        .fold(f64::INFINITY, f64::min);

    (seconds.max(fastest).max(0.0), rows.round() as usize)
}
