//! Horizontal gradient and divergence built from the two derivatives.

use crate::{
    config::Options,
    differencing::{d_dlat, d_dlon, FieldKind},
    errors::{DiffError, Result},
    field::Field,
};

/// `(∂f/∂x, ∂f/∂y)` of a scalar field.
pub fn gradient(field: &Field, opts: &Options) -> Result<(Field, Field)> {
    let zonal = d_dlon(field, opts)?;
    let meridional = d_dlat(field, FieldKind::Scalar, opts)?;
    Ok((zonal, meridional))
}

/// `∂u/∂x + (1 / cos φ) ∂(v cos φ)/∂y` for a vector field `(u, v)`.
pub fn divergence(u: &Field, v: &Field, opts: &Options) -> Result<Field> {
    if u.dims() != v.dims() || u.shape() != v.shape() {
        return Err(DiffError::shape(format!(
            "vector components disagree: u{:?} {:?} vs v{:?} {:?}",
            u.dims(),
            u.shape(),
            v.dims(),
            v.shape()
        )));
    }
    let du = d_dlon(u, opts)?;
    let dv = d_dlat(v, FieldKind::VectorComponent, opts)?;
    du.with_values(du.values() + dv.values())
}
