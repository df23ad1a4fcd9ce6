//! Minimal labeled array: an `ndarray` buffer with named dimensions and
//! one-dimensional coordinates.

use std::collections::BTreeMap;

use ndarray::{Array1, ArrayD, Axis, IxDyn};

use crate::errors::{DiffError, Result};

/// N-dimensional numeric array with named dimensions.
///
/// A coordinate is either attached to a dimension (same length as that
/// dimension) or is a scalar coordinate of length one whose name is not a
/// dimension, e.g. the latitude of a single zonal band.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: Option<String>,
    dims: Vec<String>,
    values: ArrayD<f64>,
    coords: BTreeMap<String, Array1<f64>>,
}

impl Field {
    pub fn new<S: Into<String>>(dims: Vec<S>, values: ArrayD<f64>) -> Result<Self> {
        let dims: Vec<String> = dims.into_iter().map(Into::into).collect();
        if dims.len() != values.ndim() {
            return Err(DiffError::shape(format!(
                "{} dimension names given for an array of rank {}",
                dims.len(),
                values.ndim()
            )));
        }
        for (idx, dim) in dims.iter().enumerate() {
            if dims[..idx].contains(dim) {
                return Err(DiffError::shape(format!("duplicate dimension `{dim}`")));
            }
        }
        Ok(Self {
            name: None,
            dims,
            values,
            coords: BTreeMap::new(),
        })
    }

    /// Build a field by evaluating `f` at every grid point.
    ///
    /// `f` receives the coordinate values in dimension order.
    pub fn from_grid<S, F>(axes: Vec<(S, Vec<f64>)>, f: F) -> Result<Self>
    where
        S: Into<String>,
        F: Fn(&[f64]) -> f64,
    {
        let axes: Vec<(String, Vec<f64>)> = axes
            .into_iter()
            .map(|(name, coord)| (name.into(), coord))
            .collect();
        let shape: Vec<usize> = axes.iter().map(|(_, coord)| coord.len()).collect();
        let mut point = vec![0.0; axes.len()];
        let values = ArrayD::from_shape_fn(IxDyn(&shape), |idx| {
            for (slot, (axis, (_, coord))) in point.iter_mut().zip(axes.iter().enumerate()) {
                *slot = coord[idx[axis]];
            }
            f(&point)
        });
        let names = axes.iter().map(|(name, _)| name.clone()).collect::<Vec<String>>();
        let mut field = Self::new(names, values)?;
        for (name, coord) in axes {
            field = field.with_coord(name, coord)?;
        }
        Ok(field)
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach a dimension coordinate, or a scalar coordinate when `name` is not a dimension.
    pub fn with_coord<S, A>(mut self, name: S, coord: A) -> Result<Self>
    where
        S: Into<String>,
        A: Into<Array1<f64>>,
    {
        let name = name.into();
        let coord = coord.into();
        let expected = match self.dims.iter().position(|d| *d == name) {
            Some(axis) => self.values.len_of(Axis(axis)),
            None => 1,
        };
        if coord.len() != expected {
            return Err(DiffError::shape(format!(
                "coordinate `{name}` has length {} but {expected} was expected",
                coord.len()
            )));
        }
        self.coords.insert(name, coord);
        Ok(self)
    }

    /// New field with the same name, dimensions and coordinates holding `values`.
    pub fn with_values(&self, values: ArrayD<f64>) -> Result<Self> {
        if values.shape() != self.values.shape() {
            return Err(DiffError::shape(format!(
                "values of shape {:?} do not match field shape {:?}",
                values.shape(),
                self.values.shape()
            )));
        }
        Ok(Self {
            name: self.name.clone(),
            dims: self.dims.clone(),
            values,
            coords: self.coords.clone(),
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn values(&self) -> &ArrayD<f64> {
        &self.values
    }

    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    pub fn coords(&self) -> &BTreeMap<String, Array1<f64>> {
        &self.coords
    }

    pub fn has_dim(&self, name: &str) -> bool {
        self.dims.iter().any(|d| d == name)
    }

    pub fn axis_of(&self, name: &str) -> Result<usize> {
        self.dims
            .iter()
            .position(|d| d == name)
            .ok_or_else(|| DiffError::DimensionNotFound(name.to_string()))
    }

    pub fn len_of(&self, name: &str) -> Result<usize> {
        Ok(self.values.len_of(Axis(self.axis_of(name)?)))
    }

    pub fn coord(&self, name: &str) -> Option<&Array1<f64>> {
        self.coords.get(name)
    }

    /// Coordinate of the dimension `name`.
    pub fn dim_coord(&self, name: &str) -> Result<&Array1<f64>> {
        self.axis_of(name)?;
        self.coords
            .get(name)
            .ok_or_else(|| DiffError::invalid_grid(name, "dimension has no coordinate values"))
    }

    /// Value of a non-dimension coordinate of length one.
    pub fn scalar_coord(&self, name: &str) -> Option<f64> {
        if self.has_dim(name) {
            return None;
        }
        self.coords.get(name).and_then(|c| c.first().copied())
    }
}
