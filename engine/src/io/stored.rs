use std::collections::BTreeMap;

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{DiffError, Result},
    field::Field,
};

/// On-disk form of a [`Field`]: dimension names, row-major values and coordinates.
///
/// The shape is taken from the dimension coordinates, so every dimension
/// needs one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub dims: Vec<String>,
    pub values: Vec<f64>,
    pub coords: BTreeMap<String, Vec<f64>>,
}

impl TryFrom<StoredField> for Field {
    type Error = DiffError;

    fn try_from(value: StoredField) -> Result<Self> {
        let shape = value
            .dims
            .iter()
            .map(|dim| {
                value.coords.get(dim).map(Vec::len).ok_or_else(|| {
                    DiffError::shape(format!("stored field has no coordinate for `{dim}`"))
                })
            })
            .collect::<Result<Vec<usize>>>()?;
        let values = ArrayD::from_shape_vec(IxDyn(&shape), value.values).map_err(|err| {
            DiffError::shape(format!("values do not fit shape {shape:?}: {err}"))
        })?;
        let mut field = Field::new(value.dims, values)?;
        for (name, coord) in value.coords {
            field = field.with_coord(name, coord)?;
        }
        if let Some(name) = value.name {
            field = field.with_name(name);
        }
        Ok(field)
    }
}

impl From<&Field> for StoredField {
    fn from(field: &Field) -> Self {
        StoredField {
            name: field.name().map(str::to_string),
            dims: field.dims().to_vec(),
            values: field.values().iter().copied().collect(),
            coords: field
                .coords()
                .iter()
                .map(|(name, coord)| (name.clone(), coord.to_vec()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_comes_from_dimension_coordinates() {
        let raw = r#"{
            "dims": ["lat", "lon"],
            "values": [1, 2, 3, 4, 5, 6],
            "coords": {"lat": [-30, 30], "lon": [60, 180, 300], "level": [500]}
        }"#;
        let stored: StoredField = serde_json::from_str(raw).unwrap();
        let field = Field::try_from(stored.clone()).unwrap();
        assert_eq!(field.shape(), &[2, 3]);
        assert_eq!(field.values()[[1, 0]], 4.0);
        assert_eq!(field.scalar_coord("level"), Some(500.0));
        assert_eq!(StoredField::from(&field), stored);
    }

    #[test]
    fn mismatched_value_count_is_shape_error() {
        let stored = StoredField {
            name: Some("u".into()),
            dims: vec!["lon".into()],
            values: vec![1.0, 2.0],
            coords: BTreeMap::from([("lon".to_string(), vec![0.0, 120.0, 240.0])]),
        };
        assert!(matches!(Field::try_from(stored), Err(DiffError::Shape(_))));
    }

    #[test]
    fn dimension_without_coordinate_is_rejected() {
        let stored = StoredField {
            name: None,
            dims: vec!["lon".into()],
            values: vec![1.0],
            coords: BTreeMap::new(),
        };
        assert!(Field::try_from(stored).is_err());
    }
}
