//! Second-order centered finite differences on a global, periodic
//! latitude-longitude grid, with the spherical metric terms of the del
//! operator.
//!
//! ```no_run
//! use spherediff::{io, FieldKind, OptionOverrides, OptionsRegistry};
//!
//! # fn main() -> spherediff::Result<()> {
//! let field = io::load_field("t2m.json")?;
//! let mut registry = OptionsRegistry::default();
//! let dtdy = registry.scoped(&OptionOverrides::new().lat_dim("latitude"), |reg| {
//!     reg.d_dlat(&field, FieldKind::Scalar, &OptionOverrides::new())
//! })?;
//! # let _ = dtdy;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod differencing;
pub mod errors;
pub mod field;
pub mod io;
pub mod ops;
pub mod periodic;
pub mod registry;
pub mod spacing;
pub mod telemetry;
pub mod utils;

pub use config::{
    AngleUnit, DimRole, MeridionalBoundary, OptionKey, OptionOverrides, OptionValue, Options,
    EARTH_RADIUS,
};
pub use differencing::{
    d_dlat, d_dlon, derivative, meridional_scalar, meridional_vector_component, FieldKind,
};
pub use errors::{DiffError, Result};
pub use field::Field;
pub use ops::{divergence, gradient};
pub use registry::{OptionsRegistry, OptionsScope};
pub use spacing::{spacing, AxisSpacing};
