//! Centered second-order derivatives along longitude and latitude.
//!
//! Zonal:
//! `df/dλ = δf / (R cos φ δλ)`
//!
//! Meridional, scalar field:
//! `df/dφ = δf / (R δφ)`
//!
//! Meridional, vector component (divergence/curl form of the spherical del):
//! `δ(cos φ · f) / (R cos φ δφ)`
//!
//! `δ` is the three-point centered difference, wrapped periodically at the
//! domain edges.

use ndarray::{Array1, ArrayD, ArrayViewD, Axis, Zip};
use serde::{Deserialize, Serialize};

use crate::{
    config::{DimRole, MeridionalBoundary, Options},
    errors::{DiffError, Result},
    field::Field,
    periodic::shift_axis,
    spacing::{spacing, AxisSpacing},
    telemetry,
    utils::centered_nonuniform,
};

/// Metric factors with magnitude at or below this are treated as a pole.
pub const METRIC_FLOOR: f64 = 1e-12;

/// Whether a meridional derivative treats the field as a scalar or as the
/// meridional component of a vector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Scalar,
    VectorComponent,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::VectorComponent => "vector_component",
        }
    }
}

impl From<bool> for FieldKind {
    fn from(vector_component: bool) -> Self {
        if vector_component {
            Self::VectorComponent
        } else {
            Self::Scalar
        }
    }
}

/// Derivative of `field` in direction `role`. `kind` only affects meridional derivatives.
pub fn derivative(field: &Field, role: DimRole, kind: FieldKind, opts: &Options) -> Result<Field> {
    match role {
        DimRole::Zonal => d_dlon(field, opts),
        DimRole::Meridional => d_dlat(field, kind, opts),
    }
}

/// Zonal derivative `(f[i+1] - f[i-1]) / (R cos φ Δλ)`.
///
/// Grids carrying a latitude row exactly on a pole (e.g. 181 points from -90
/// to 90) are rejected as a whole with [`DiffError::DegenerateGrid`]; drop or
/// offset the pole rows first.
pub fn d_dlon(field: &Field, opts: &Options) -> Result<Field> {
    let (lon_dim, lat_dim) = resolve_dims(opts)?;
    let axis = field.axis_of(lon_dim)?;
    let spacing = spacing(field, lon_dim, DimRole::Zonal, opts)?;
    let values = field.values().view();
    let prev = shift_axis(&values, axis, -1);
    let next = shift_axis(&values, axis, 1);
    let mut out = apply_stencil(&prev, &values, &next, axis, &spacing);

    match zonal_metric(field, lat_dim, opts)? {
        ZonalMetric::Band { axis: lat_axis, cos } => {
            for (mut band, c) in out.axis_iter_mut(Axis(lat_axis)).zip(cos.iter()) {
                let scale = opts.radius * c;
                band.mapv_inplace(|v| v / scale);
            }
        }
        ZonalMetric::Constant(cos) => out.mapv_inplace(|v| v / (opts.radius * cos)),
    }

    finish(field, out, DimRole::Zonal, FieldKind::Scalar)
}

/// Meridional derivative, dispatching on the field kind.
pub fn d_dlat(field: &Field, kind: FieldKind, opts: &Options) -> Result<Field> {
    match kind {
        FieldKind::Scalar => meridional_scalar(field, opts),
        FieldKind::VectorComponent => meridional_vector_component(field, opts),
    }
}

/// `(f[j+1] - f[j-1]) / (R Δφ)`
pub fn meridional_scalar(field: &Field, opts: &Options) -> Result<Field> {
    let stencil = MeridionalStencil::gather(field, opts)?;
    let values = field.values().view();
    let mut out = apply_stencil(
        &stencil.prev,
        &values,
        &stencil.next,
        stencil.axis,
        &stencil.spacing,
    );
    out.mapv_inplace(|v| v / opts.radius);
    finish(field, out, DimRole::Meridional, FieldKind::Scalar)
}

/// `(cos φ[j+1] f[j+1] - cos φ[j-1] f[j-1]) / (R cos φ[j] Δφ)`
///
/// Neighbour weights use the cosine of the neighbour's extended coordinate,
/// taken in absolute value so the weighting stays positive across a pole.
pub fn meridional_vector_component(field: &Field, opts: &Options) -> Result<Field> {
    let stencil = MeridionalStencil::gather(field, opts)?;
    let axis = stencil.axis;
    let spacing = &stencil.spacing;
    let weight = |a: &Array1<f64>| a.mapv(|phi| phi.cos().abs());
    let w_before = weight(&spacing.before);
    let w_center = weight(&spacing.coord);
    let w_after = weight(&spacing.after);
    check_metric(&spacing.dim, &spacing.coord, &w_center)?;

    let values = field.values().view();
    let mut out = ArrayD::zeros(values.raw_dim());
    Zip::from(out.lanes_mut(Axis(axis)))
        .and(stencil.prev.lanes(Axis(axis)))
        .and(values.lanes(Axis(axis)))
        .and(stencil.next.lanes(Axis(axis)))
        .for_each(|mut o, p, c, n| {
            for k in 0..o.len() {
                let d = centered_nonuniform(
                    w_before[k] * p[k],
                    w_center[k] * c[k],
                    w_after[k] * n[k],
                    spacing.backward[k],
                    spacing.forward[k],
                );
                o[k] = d / (opts.radius * w_center[k]);
            }
        });
    finish(field, out, DimRole::Meridional, FieldKind::VectorComponent)
}

/// Neighbour values and spacing along the latitude dimension.
struct MeridionalStencil {
    axis: usize,
    spacing: AxisSpacing,
    prev: ArrayD<f64>,
    next: ArrayD<f64>,
}

impl MeridionalStencil {
    fn gather(field: &Field, opts: &Options) -> Result<Self> {
        let (lon_dim, lat_dim) = resolve_dims(opts)?;
        let axis = field.axis_of(lat_dim)?;
        let spacing = spacing(field, lat_dim, DimRole::Meridional, opts)?;
        let values = field.values().view();
        let mut prev = shift_axis(&values, axis, -1);
        let mut next = shift_axis(&values, axis, 1);

        if opts.lat_boundary == MeridionalBoundary::PoleReflection {
            // Rows beyond a pole are the edge rows seen from the opposite meridian.
            let lon_axis = field.axis_of(lon_dim)?;
            let half = (values.len_of(Axis(lon_axis)) / 2) as isize;
            let across = shift_axis(&values, lon_axis, half);
            let last = spacing.len() - 1;
            prev.index_axis_mut(Axis(axis), 0)
                .assign(&across.index_axis(Axis(axis), 0));
            next.index_axis_mut(Axis(axis), last)
                .assign(&across.index_axis(Axis(axis), last));
        }

        Ok(Self {
            axis,
            spacing,
            prev,
            next,
        })
    }
}

enum ZonalMetric {
    /// `cos φ` per index along the latitude axis.
    Band { axis: usize, cos: Array1<f64> },
    Constant(f64),
}

fn zonal_metric(field: &Field, lat_dim: &str, opts: &Options) -> Result<ZonalMetric> {
    let unit = opts.angle_unit;
    if field.has_dim(lat_dim) {
        let axis = field.axis_of(lat_dim)?;
        let lat = field.dim_coord(lat_dim)?.mapv(|v| unit.to_radians(v));
        let cos = lat.mapv(f64::cos);
        check_metric(lat_dim, &lat, &cos)?;
        return Ok(ZonalMetric::Band { axis, cos });
    }
    match field.scalar_coord(lat_dim) {
        Some(value) => {
            let lat = unit.to_radians(value);
            let cos = lat.cos();
            check_metric(lat_dim, &Array1::from_elem(1, lat), &Array1::from_elem(1, cos))?;
            Ok(ZonalMetric::Constant(cos))
        }
        None => {
            tracing::debug!(
                target: "spherediff",
                lat_dim,
                "no latitude on field; zonal metric taken at the equator"
            );
            Ok(ZonalMetric::Constant(1.0))
        }
    }
}

fn check_metric(dim: &str, lat: &Array1<f64>, cos: &Array1<f64>) -> Result<()> {
    if let Some(k) = cos.iter().position(|c| !c.is_finite() || c.abs() <= METRIC_FLOOR) {
        tracing::warn!(
            target: "spherediff",
            dim,
            index = k,
            "metric factor vanishes at latitude {:.6} rad",
            lat[k]
        );
        return Err(DiffError::degenerate_grid(
            dim,
            format!("cos(latitude) vanishes at index {k}; grid point lies on a pole"),
        ));
    }
    Ok(())
}

fn resolve_dims(opts: &Options) -> Result<(&str, &str)> {
    let lon_dim = opts.dim_name(DimRole::Zonal)?;
    let lat_dim = opts.dim_name(DimRole::Meridional)?;
    if lon_dim == lat_dim {
        return Err(DiffError::Configuration(format!(
            "longitude and latitude both resolve to dimension `{lon_dim}`"
        )));
    }
    Ok((lon_dim, lat_dim))
}

fn apply_stencil(
    prev: &ArrayD<f64>,
    center: &ArrayViewD<'_, f64>,
    next: &ArrayD<f64>,
    axis: usize,
    spacing: &AxisSpacing,
) -> ArrayD<f64> {
    let mut out = ArrayD::zeros(center.raw_dim());
    Zip::from(out.lanes_mut(Axis(axis)))
        .and(prev.lanes(Axis(axis)))
        .and(center.lanes(Axis(axis)))
        .and(next.lanes(Axis(axis)))
        .for_each(|mut o, p, c, n| {
            for k in 0..o.len() {
                o[k] = centered_nonuniform(p[k], c[k], n[k], spacing.backward[k], spacing.forward[k]);
            }
        });
    out
}

fn finish(field: &Field, out: ArrayD<f64>, role: DimRole, kind: FieldKind) -> Result<Field> {
    telemetry::record_derivative(role, kind, out.len());
    tracing::debug!(
        target: "spherediff",
        role = role.as_str(),
        kind = kind.as_str(),
        shape = ?out.shape(),
        "computed derivative"
    );
    field.with_values(out)
}
