use std::{fs, path::Path};

use serde::{de::DeserializeOwned, Serialize};

use crate::{errors::Result, field::Field};

pub mod stored;

pub use stored::StoredField;

pub fn load_json<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let bytes = fs::read(path)?;
    let value = serde_json::from_slice(&bytes)?;
    Ok(value)
}

pub fn write_json<T, P>(path: P, value: &T) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let bytes = serde_json::to_vec_pretty(value)?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn to_json_string<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Read a [`StoredField`] document and rebuild the field.
pub fn load_field<P: AsRef<Path>>(path: P) -> Result<Field> {
    let stored: StoredField = load_json(path)?;
    Field::try_from(stored)
}

pub fn write_field<P: AsRef<Path>>(path: P, field: &Field) -> Result<()> {
    write_json(path, &StoredField::from(field))
}
