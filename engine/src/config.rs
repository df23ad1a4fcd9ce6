use std::{fmt, fs, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::{DiffError, Result};

/// Mean radius of the Earth in metres.
pub const EARTH_RADIUS: f64 = 6_370_997.0;

/// Units of the coordinate values attached to the differenced dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleUnit {
    Degrees,
    Radians,
}

impl Default for AngleUnit {
    fn default() -> Self {
        Self::Degrees
    }
}

impl AngleUnit {
    pub fn to_radians(self, value: f64) -> f64 {
        match self {
            Self::Degrees => value.to_radians(),
            Self::Radians => value,
        }
    }

    /// Periodic span of longitude.
    pub fn full_turn(self) -> f64 {
        match self {
            Self::Degrees => 360.0,
            Self::Radians => std::f64::consts::TAU,
        }
    }

    /// Pole-to-pole span of latitude.
    pub fn half_turn(self) -> f64 {
        match self {
            Self::Degrees => 180.0,
            Self::Radians => std::f64::consts::PI,
        }
    }
}

impl FromStr for AngleUnit {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "degrees" | "deg" => Ok(Self::Degrees),
            "radians" | "rad" => Ok(Self::Radians),
            other => Err(DiffError::InvalidOption(format!(
                "option `angle_unit` given an invalid value: {other:?}"
            ))),
        }
    }
}

/// How the meridional stencil finds neighbours beyond the first and last rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeridionalBoundary {
    /// Latitude wraps over its own half-turn span like longitude does.
    Periodic,
    /// Edge rows fold across the pole, rolled by half the longitude circle.
    PoleReflection,
}

impl Default for MeridionalBoundary {
    fn default() -> Self {
        Self::Periodic
    }
}

impl FromStr for MeridionalBoundary {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "periodic" => Ok(Self::Periodic),
            "pole_reflection" => Ok(Self::PoleReflection),
            other => Err(DiffError::InvalidOption(format!(
                "option `lat_boundary` given an invalid value: {other:?}"
            ))),
        }
    }
}

/// Direction of differentiation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimRole {
    Zonal,
    Meridional,
}

impl DimRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Zonal => "zonal",
            Self::Meridional => "meridional",
        }
    }
}

/// Names of the recognised options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OptionKey {
    LonDim,
    LatDim,
    Radius,
    AngleUnit,
    LatBoundary,
}

impl OptionKey {
    pub const ALL: [OptionKey; 5] = [
        Self::LonDim,
        Self::LatDim,
        Self::Radius,
        Self::AngleUnit,
        Self::LatBoundary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LonDim => "lon_dim",
            Self::LatDim => "lat_dim",
            Self::Radius => "radius",
            Self::AngleUnit => "angle_unit",
            Self::LatBoundary => "lat_boundary",
        }
    }
}

impl FromStr for OptionKey {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
                DiffError::InvalidOption(format!(
                    "argument name {s:?} is not in the set of valid options {valid:?}"
                ))
            })
    }
}

/// Current value of a single option.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    Name(String),
    Number(f64),
    Unit(AngleUnit),
    Boundary(MeridionalBoundary),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Unit(unit) => write!(f, "{unit:?}"),
            Self::Boundary(boundary) => write!(f, "{boundary:?}"),
        }
    }
}

fn default_lon_dim() -> String {
    "lon".to_string()
}

fn default_lat_dim() -> String {
    "lat".to_string()
}

const fn default_radius() -> f64 {
    EARTH_RADIUS
}

/// Effective defaults read by every derivative call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Options {
    #[serde(default = "default_lon_dim")]
    pub lon_dim: String,
    #[serde(default = "default_lat_dim")]
    pub lat_dim: String,
    #[serde(default = "default_radius")]
    pub radius: f64,
    #[serde(default)]
    pub angle_unit: AngleUnit,
    #[serde(default)]
    pub lat_boundary: MeridionalBoundary,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            lon_dim: default_lon_dim(),
            lat_dim: default_lat_dim(),
            radius: default_radius(),
            angle_unit: AngleUnit::default(),
            lat_boundary: MeridionalBoundary::default(),
        }
    }
}

impl Options {
    /// Load options from a TOML file on disk.
    pub fn from_toml_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let opts: Self = toml::from_str(&raw)?;
        validate_radius(opts.radius)?;
        Ok(opts)
    }

    /// Load options from a YAML file on disk.
    pub fn from_yaml_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let opts: Self = serde_yaml::from_str(&raw)?;
        validate_radius(opts.radius)?;
        Ok(opts)
    }

    pub fn get(&self, key: OptionKey) -> OptionValue {
        match key {
            OptionKey::LonDim => OptionValue::Name(self.lon_dim.clone()),
            OptionKey::LatDim => OptionValue::Name(self.lat_dim.clone()),
            OptionKey::Radius => OptionValue::Number(self.radius),
            OptionKey::AngleUnit => OptionValue::Unit(self.angle_unit),
            OptionKey::LatBoundary => OptionValue::Boundary(self.lat_boundary),
        }
    }

    /// Copy of `self` with `overrides` applied. `self` is left untouched on error.
    pub fn merged(&self, overrides: &OptionOverrides) -> Result<Self> {
        overrides.validate()?;
        let mut next = self.clone();
        next.apply(overrides);
        Ok(next)
    }

    /// Write every key set in `overrides` without validating it.
    pub(crate) fn apply(&mut self, overrides: &OptionOverrides) {
        if let Some(name) = &overrides.lon_dim {
            self.lon_dim = name.clone();
        }
        if let Some(name) = &overrides.lat_dim {
            self.lat_dim = name.clone();
        }
        if let Some(radius) = overrides.radius {
            self.radius = radius;
        }
        if let Some(unit) = overrides.angle_unit {
            self.angle_unit = unit;
        }
        if let Some(boundary) = overrides.lat_boundary {
            self.lat_boundary = boundary;
        }
    }

    /// Current values of exactly the keys that `overrides` sets.
    pub fn snapshot(&self, overrides: &OptionOverrides) -> OptionOverrides {
        OptionOverrides {
            lon_dim: overrides.lon_dim.as_ref().map(|_| self.lon_dim.clone()),
            lat_dim: overrides.lat_dim.as_ref().map(|_| self.lat_dim.clone()),
            radius: overrides.radius.map(|_| self.radius),
            angle_unit: overrides.angle_unit.map(|_| self.angle_unit),
            lat_boundary: overrides.lat_boundary.map(|_| self.lat_boundary),
        }
    }

    /// Dimension name used for `role`.
    pub fn dim_name(&self, role: DimRole) -> Result<&str> {
        let (key, name) = match role {
            DimRole::Zonal => (OptionKey::LonDim, self.lon_dim.as_str()),
            DimRole::Meridional => (OptionKey::LatDim, self.lat_dim.as_str()),
        };
        if name.trim().is_empty() {
            return Err(DiffError::Configuration(format!(
                "no {} dimension name given and option `{}` is unset",
                role.as_str(),
                key.as_str()
            )));
        }
        Ok(name)
    }
}

/// Partial set of options; `None` leaves the current value in place.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionOverrides {
    #[serde(default)]
    pub lon_dim: Option<String>,
    #[serde(default)]
    pub lat_dim: Option<String>,
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default)]
    pub angle_unit: Option<AngleUnit>,
    #[serde(default)]
    pub lat_boundary: Option<MeridionalBoundary>,
}

impl OptionOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lon_dim<S: Into<String>>(mut self, name: S) -> Self {
        self.lon_dim = Some(name.into());
        self
    }

    pub fn lat_dim<S: Into<String>>(mut self, name: S) -> Self {
        self.lat_dim = Some(name.into());
        self
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn angle_unit(mut self, unit: AngleUnit) -> Self {
        self.angle_unit = Some(unit);
        self
    }

    pub fn lat_boundary(mut self, boundary: MeridionalBoundary) -> Self {
        self.lat_boundary = Some(boundary);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Set one option from its textual name and value, e.g. `("radius", "6.4e6")`.
    pub fn set_str(&mut self, key: &str, value: &str) -> Result<()> {
        match key.parse::<OptionKey>()? {
            OptionKey::LonDim => self.lon_dim = Some(value.to_string()),
            OptionKey::LatDim => self.lat_dim = Some(value.to_string()),
            OptionKey::Radius => {
                let radius = value.parse::<f64>().map_err(|_| {
                    DiffError::InvalidOption(format!(
                        "option `radius` given an invalid value: {value:?}"
                    ))
                })?;
                self.radius = Some(radius);
            }
            OptionKey::AngleUnit => self.angle_unit = Some(value.parse()?),
            OptionKey::LatBoundary => self.lat_boundary = Some(value.parse()?),
        }
        Ok(())
    }

    /// Parse `key=value` pairs into a set of overrides.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut overrides = Self::default();
        for pair in pairs {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                DiffError::InvalidOption(format!("expected `key=value`, got {pair:?}"))
            })?;
            overrides.set_str(key.trim(), value.trim())?;
        }
        overrides.validate()?;
        Ok(overrides)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(radius) = self.radius {
            validate_radius(radius)?;
        }
        for (key, name) in [
            (OptionKey::LonDim, &self.lon_dim),
            (OptionKey::LatDim, &self.lat_dim),
        ] {
            if matches!(name, Some(n) if n.trim().is_empty()) {
                return Err(DiffError::InvalidOption(format!(
                    "option `{}` given an empty dimension name",
                    key.as_str()
                )));
            }
        }
        Ok(())
    }
}

fn validate_radius(radius: f64) -> Result<()> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(DiffError::InvalidOption(format!(
            "option `radius` given an invalid value: {radius}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_builtin_names() {
        let opts = Options::default();
        assert_eq!(opts.get(OptionKey::LonDim), OptionValue::Name("lon".into()));
        assert_eq!(opts.get(OptionKey::LatDim), OptionValue::Name("lat".into()));
        assert_eq!(opts.get(OptionKey::Radius), OptionValue::Number(EARTH_RADIUS));
        assert_eq!(opts.angle_unit, AngleUnit::Degrees);
        assert_eq!(opts.lat_boundary, MeridionalBoundary::Periodic);
    }

    #[test]
    fn unknown_option_name_is_rejected() {
        let err = "not_a_valid_option".parse::<OptionKey>().unwrap_err();
        assert!(matches!(err, DiffError::InvalidOption(_)));
        assert!(OptionOverrides::from_pairs(["time_dim=t"]).is_err());
    }

    #[test]
    fn radius_must_be_positive_number() {
        assert!(OptionOverrides::from_pairs(["radius=5"]).is_ok());
        assert!(OptionOverrides::from_pairs(["radius=a"]).is_err());
        assert!(OptionOverrides::from_pairs(["radius=-1"]).is_err());
        assert!(Options::default()
            .merged(&OptionOverrides::new().radius(f64::NAN))
            .is_err());
    }

    #[test]
    fn merged_leaves_unset_fields() {
        let base = Options::default();
        let merged = base
            .merged(&OptionOverrides::new().lon_dim("longitude"))
            .unwrap();
        assert_eq!(merged.lon_dim, "longitude");
        assert_eq!(merged.lat_dim, "lat");
        assert_eq!(base.lon_dim, "lon");
    }

    #[test]
    fn snapshot_covers_only_overridden_keys() {
        let opts = Options::default();
        let saved = opts.snapshot(&OptionOverrides::new().radius(5.0).lat_dim("y"));
        assert_eq!(saved.radius, Some(EARTH_RADIUS));
        assert_eq!(saved.lat_dim.as_deref(), Some("lat"));
        assert_eq!(saved.lon_dim, None);
        assert_eq!(saved.angle_unit, None);
        assert_eq!(saved.lat_boundary, None);
    }

    #[test]
    fn empty_dimension_name_is_configuration_error() {
        let opts = Options {
            lat_dim: String::new(),
            ..Options::default()
        };
        assert!(opts.dim_name(DimRole::Zonal).is_ok());
        assert!(matches!(
            opts.dim_name(DimRole::Meridional),
            Err(DiffError::Configuration(_))
        ));
    }

    #[test]
    fn toml_fills_missing_fields_with_defaults() {
        let opts: Options = toml::from_str(
            "lon_dim = \"longitude\"\nangle_unit = \"radians\"\nlat_boundary = \"pole_reflection\"\n",
        )
        .unwrap();
        assert_eq!(opts.lon_dim, "longitude");
        assert_eq!(opts.lat_dim, "lat");
        assert_eq!(opts.radius, EARTH_RADIUS);
        assert_eq!(opts.angle_unit, AngleUnit::Radians);
        assert_eq!(opts.lat_boundary, MeridionalBoundary::PoleReflection);
    }

    #[test]
    fn yaml_parses_radius() {
        let opts: Options = serde_yaml::from_str("radius: 5.0\nlat_dim: latitude\n").unwrap();
        assert_eq!(opts.radius, 5.0);
        assert_eq!(opts.lat_dim, "latitude");
    }
}
