//! Coordinate validation and neighbour distances along a periodic dimension.

use ndarray::Array1;

use crate::{
    config::{AngleUnit, DimRole, MeridionalBoundary, Options},
    errors::{DiffError, Result},
    field::Field,
    periodic::extended_coord,
    telemetry,
};

/// Gaps at or below this many radians are treated as zero.
pub const MIN_SPACING: f64 = 1e-12;

/// Rule for locating the neighbours of the first and last grid points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AxisBoundary {
    /// Coordinate repeats every `period` (native units).
    Periodic { period: f64 },
    /// Edge points mirror across `±half_turn / 2`, e.g. latitude across the poles.
    Reflect { half_turn: f64 },
}

impl AxisBoundary {
    pub fn for_role(role: DimRole, opts: &Options) -> Self {
        let unit = opts.angle_unit;
        match (role, opts.lat_boundary) {
            (DimRole::Zonal, _) => Self::Periodic {
                period: unit.full_turn(),
            },
            (DimRole::Meridional, MeridionalBoundary::Periodic) => Self::Periodic {
                period: unit.half_turn(),
            },
            (DimRole::Meridional, MeridionalBoundary::PoleReflection) => Self::Reflect {
                half_turn: unit.half_turn(),
            },
        }
    }
}

/// Per-point neighbour geometry along one dimension, all in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSpacing {
    pub dim: String,
    pub coord: Array1<f64>,
    /// Coordinate of the neighbour at `i - 1`, extended past the seam.
    pub before: Array1<f64>,
    /// Coordinate of the neighbour at `i + 1`, extended past the seam.
    pub after: Array1<f64>,
    /// `coord[i] - before[i]`
    pub backward: Array1<f64>,
    /// `after[i] - coord[i]`
    pub forward: Array1<f64>,
}

impl AxisSpacing {
    pub fn len(&self) -> usize {
        self.coord.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coord.is_empty()
    }

    /// Denominator of the centered difference at each point.
    pub fn centered(&self) -> Array1<f64> {
        &self.backward + &self.forward
    }
}

/// Resolve the spacing of `dim` in `field`, differentiated in direction `role`.
pub fn spacing(field: &Field, dim: &str, role: DimRole, opts: &Options) -> Result<AxisSpacing> {
    let coord = field.dim_coord(dim)?;
    let spacing = resolve_axis(
        dim,
        coord,
        AxisBoundary::for_role(role, opts),
        opts.angle_unit,
    )?;
    telemetry::record_spacing(&spacing);
    Ok(spacing)
}

/// Validate `coord` and compute its neighbour distances under `boundary`.
pub fn resolve_axis(
    dim: &str,
    coord: &Array1<f64>,
    boundary: AxisBoundary,
    unit: AngleUnit,
) -> Result<AxisSpacing> {
    check_coordinate(dim, coord)?;
    let n = coord.len();

    let (before, after) = match boundary {
        AxisBoundary::Periodic { period } => (
            extended_coord(coord, -1, period),
            extended_coord(coord, 1, period),
        ),
        AxisBoundary::Reflect { half_turn } => {
            let mut before = extended_coord(coord, -1, 0.0);
            let mut after = extended_coord(coord, 1, 0.0);
            before[0] = -half_turn - coord[0];
            after[n - 1] = half_turn - coord[n - 1];
            (before, after)
        }
    };

    let to_rad = |a: &Array1<f64>| a.mapv(|v| unit.to_radians(v));
    let coord = to_rad(coord);
    let before = to_rad(&before);
    let after = to_rad(&after);
    let backward = &coord - &before;
    let forward = &after - &coord;

    for (i, (&back, &fwd)) in backward.iter().zip(forward.iter()).enumerate() {
        check_gap(dim, i, back)?;
        check_gap(dim, i, fwd)?;
    }

    tracing::debug!(
        target: "spherediff",
        dim,
        points = n,
        ?boundary,
        "resolved grid spacing"
    );

    Ok(AxisSpacing {
        dim: dim.to_string(),
        coord,
        before,
        after,
        backward,
        forward,
    })
}

fn check_coordinate(dim: &str, coord: &Array1<f64>) -> Result<()> {
    if let Some(bad) = coord.iter().find(|v| !v.is_finite()) {
        return Err(DiffError::degenerate_grid(
            dim,
            format!("coordinate contains non-finite value {bad}"),
        ));
    }
    if coord.len() < 3 {
        return Err(DiffError::invalid_grid(
            dim,
            format!(
                "centered differences need at least 3 points, got {}",
                coord.len()
            ),
        ));
    }
    if let Some(i) = (1..coord.len()).find(|&i| coord[i] <= coord[i - 1]) {
        return Err(DiffError::invalid_grid(
            dim,
            format!(
                "coordinate is not strictly increasing at index {i} ({} -> {})",
                coord[i - 1],
                coord[i]
            ),
        ));
    }
    Ok(())
}

fn check_gap(dim: &str, i: usize, gap: f64) -> Result<()> {
    if !gap.is_finite() {
        return Err(DiffError::degenerate_grid(
            dim,
            format!("non-finite spacing at index {i}"),
        ));
    }
    if gap.abs() <= MIN_SPACING {
        return Err(DiffError::degenerate_grid(
            dim,
            format!("spacing at index {i} is numerically zero"),
        ));
    }
    if gap < 0.0 {
        return Err(DiffError::invalid_grid(
            dim,
            format!("coordinate wraps past its periodic span at index {i}"),
        ));
    }
    Ok(())
}
