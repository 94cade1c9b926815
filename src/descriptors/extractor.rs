//! Shape descriptor extraction.
//!
//! The outline is resampled, normalized to unit average size, and examined in
//! three refinement rounds. Each round measures the radial profile (distance of
//! every curve sample from a reference center) and picks its peaks and valleys:
//!
//! 1. center = centroid of the curve
//! 2. center = circle fitted through the round-1 peak points
//! 3. center = circle fitted through the round-2 peak points (radius `r3`)
//!
//! From the round-3 peaks and valleys, in `(index, distance)` profile space:
//!
//! - `area = ribbon_area / r3 / 10`
//! - `aspect_ratio = 1000 * (height / width) / r3` over the ribbon bounds
//! - `parabolic = 2e4 * a + 1`, `a` the quadratic coefficient of the valleys
//!
//! and the reported vector is `[area, aspect_ratio, parabolic] * 10`.

use log::debug;
use nalgebra::Point2;
use serde::Serialize;

use crate::descriptors::ribbon::{DEFAULT_RIBBON_RESOLUTION, Ribbon, ribbon};
use crate::domain::DescriptorVector;
use crate::error::StagingError;
use crate::math::{
    Circle, DEFAULT_DISTANCE, Extremum, ExtremumKind, ParabolaFit, SplineOptions, average_size,
    centroid, find_extrema, fit_circle, fit_parabola, radial_profile, resample,
};

/// Number of recentering rounds.
pub const REFINEMENT_ROUNDS: usize = 3;

const AREA_UNIT: f64 = 10.0;
const ASPECT_UNIT: f64 = 1000.0;
const PARABOLIC_UNIT: f64 = 2e4;
const OUTPUT_SCALE: f64 = 10.0;

/// Tunables of the extraction.
///
/// The calibration curve was built with the defaults; changing them makes the
/// descriptors incomparable with it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractorParams {
    pub spline: SplineOptions,
    pub peak_count: usize,
    pub valley_count: usize,
    /// Minimum separation between extrema, in resampled-curve samples.
    pub min_separation: usize,
    /// `(segments along, strips across)` of the peak/valley ribbon.
    pub ribbon_resolution: (usize, usize),
}

impl Default for ExtractorParams {
    fn default() -> Self {
        Self {
            spline: SplineOptions::default(),
            peak_count: 5,
            valley_count: 6,
            min_separation: DEFAULT_DISTANCE,
            ribbon_resolution: DEFAULT_RIBBON_RESOLUTION,
        }
    }
}

/// What one refinement round saw.
#[derive(Debug, Clone, Serialize)]
pub struct RoundDiagnostics {
    /// 1-based round number.
    pub round: usize,
    pub center: Point2<f64>,
    /// Circle that produced `center` (none in round 1, which uses the centroid).
    pub circle: Option<Circle>,
    pub profile: Vec<f64>,
    pub peaks: Vec<Extremum>,
    pub valleys: Vec<Extremum>,
}

/// Successful extraction: the descriptor vector plus everything used to build it.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub descriptors: DescriptorVector,
    /// Resampled curve after normalization.
    pub curve: Vec<Point2<f64>>,
    /// Average size divided out of the resampled curve.
    pub scale: f64,
    pub rounds: Vec<RoundDiagnostics>,
    /// Round-3 circle; its radius is `r3`.
    pub final_circle: Circle,
    pub ribbon: Ribbon,
    pub parabola: ParabolaFit,
}

impl Extraction {
    /// The last round, whose peaks and valleys define the descriptors.
    pub fn final_round(&self) -> &RoundDiagnostics {
        &self.rounds[self.rounds.len() - 1]
    }
}

/// Run the full extraction on a raw outline.
pub fn extract(outline: &[Point2<f64>], params: &ExtractorParams) -> Result<Extraction, StagingError> {
    let resampled = resample(outline, &params.spline);
    let scale = average_size(&resampled);
    if !(scale.is_finite() && scale > 0.0) {
        return Err(StagingError::DegenerateOutline);
    }
    let curve: Vec<Point2<f64>> = resampled
        .iter()
        .map(|p| Point2::from(p.coords / scale))
        .collect();

    let mut rounds: Vec<RoundDiagnostics> = Vec::with_capacity(REFINEMENT_ROUNDS);
    let mut final_circle = None;

    for round in 1..=REFINEMENT_ROUNDS {
        let (center, circle) = match rounds.last() {
            None => (centroid(&curve), None),
            Some(prev) => {
                let peak_points: Vec<Point2<f64>> =
                    prev.peaks.iter().map(|e| curve[e.index]).collect();
                let circle =
                    fit_circle(&peak_points).ok_or(StagingError::DegenerateCircleFit { round })?;
                (circle.center, Some(circle))
            }
        };

        let profile = radial_profile(&curve, &center);
        let peaks = find_extrema(
            &profile,
            params.peak_count,
            params.min_separation,
            ExtremumKind::Maximum,
        );
        let valleys = find_extrema(
            &profile,
            params.valley_count,
            params.min_separation,
            ExtremumKind::Minimum,
        );
        debug!(
            "round {round}: center=({:.4}, {:.4}) radius={} peaks={:?} valleys={:?}",
            center.x,
            center.y,
            circle.map_or("-".to_string(), |c| format!("{:.4}", c.radius)),
            peaks.iter().map(|e| e.index).collect::<Vec<_>>(),
            valleys.iter().map(|e| e.index).collect::<Vec<_>>(),
        );

        if peaks.is_empty() || valleys.is_empty() {
            return Err(StagingError::InsufficientExtrema {
                round,
                peaks: peaks.len(),
                valleys: valleys.len(),
            });
        }

        final_circle = circle;
        rounds.push(RoundDiagnostics {
            round,
            center,
            circle,
            profile,
            peaks,
            valleys,
        });
    }

    // Rounds 2 and 3 always fit a circle, so this only trips if the round count
    // is ever lowered below two.
    let final_circle = final_circle.ok_or(StagingError::DegenerateCircleFit {
        round: REFINEMENT_ROUNDS,
    })?;
    let r3 = final_circle.radius;
    let last = &rounds[rounds.len() - 1];

    let peak_line = profile_points(&last.peaks);
    let valley_line = profile_points(&last.valleys);
    let ribbon = ribbon(&peak_line, &valley_line, params.ribbon_resolution)
        .ok_or(StagingError::DegenerateOutline)?;

    let area = ribbon.area / r3 / AREA_UNIT;
    let aspect_ratio = ASPECT_UNIT * (ribbon.bounds.height() / ribbon.bounds.width()) / r3;

    let valley_x: Vec<f64> = last.valleys.iter().map(|e| e.index as f64).collect();
    let valley_y: Vec<f64> = last.valleys.iter().map(|e| e.value).collect();
    let parabola = fit_parabola(&valley_x, &valley_y).ok_or(StagingError::DegenerateOutline)?;
    let parabolic = PARABOLIC_UNIT * parabola.leading() + 1.0;

    let descriptors = DescriptorVector::new(area, aspect_ratio, parabolic).scaled(OUTPUT_SCALE);
    if !descriptors.is_finite() {
        return Err(StagingError::DegenerateOutline);
    }
    debug!(
        "descriptors: area={:.4} aspect_ratio={:.4} parabolic={:.4} (r3={r3:.4})",
        descriptors.area, descriptors.aspect_ratio, descriptors.parabolic
    );

    Ok(Extraction {
        descriptors,
        curve,
        scale,
        rounds,
        final_circle,
        ribbon,
        parabola,
    })
}

/// Descriptor vector only.
pub fn extract_descriptors(
    outline: &[Point2<f64>],
    params: &ExtractorParams,
) -> Result<DescriptorVector, StagingError> {
    extract(outline, params).map(|e| e.descriptors)
}

/// Descriptor triple with failures collapsed to `(0, 0, 0)`.
pub fn descriptor_triple(outline: &[Point2<f64>], params: &ExtractorParams) -> [f64; 3] {
    match extract_descriptors(outline, params) {
        Ok(d) => d.to_array(),
        Err(err) => err.canonical_triple(),
    }
}

fn profile_points(extrema: &[Extremum]) -> Vec<Point2<f64>> {
    extrema
        .iter()
        .map(|e| Point2::new(e.index as f64, e.value))
        .collect()
}
