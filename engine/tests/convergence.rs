//! Accuracy of the differencing engine on analytic fields.

use approx::assert_abs_diff_eq;
use ndarray::{Axis, Ix2};
use spherediff::{
    d_dlat, d_dlon, DiffError, Field, FieldKind, OptionKey, OptionOverrides, OptionValue, Options,
    OptionsRegistry, EARTH_RADIUS,
};

fn centers(n: usize, start: f64, span: f64) -> Vec<f64> {
    let step = span / n as f64;
    (0..n).map(|i| start + step * (i as f64 + 0.5)).collect()
}

/// `R cos(lat) sin(6 lon)` along the equator.
fn equatorial_wave(nlon: usize) -> Field {
    Field::from_grid(vec![("lon", centers(nlon, 0.0, 360.0))], |p| {
        EARTH_RADIUS * (6.0 * p[0].to_radians()).sin()
    })
    .unwrap()
    .with_coord("lat", vec![0.0])
    .unwrap()
}

fn max_zonal_error(nlon: usize) -> f64 {
    let field = equatorial_wave(nlon);
    let out = d_dlon(&field, &Options::default()).unwrap();
    let lon = field.dim_coord("lon").unwrap();
    out.values()
        .iter()
        .zip(lon.iter())
        .map(|(value, x)| (value - 6.0 * (6.0 * x.to_radians()).cos()).abs())
        .fold(0.0, f64::max)
}

#[test]
fn zonal_error_shrinks_quadratically() {
    let coarse = max_zonal_error(360);
    let fine = max_zonal_error(720);
    assert!(coarse < 0.05, "coarse error {coarse}");
    let ratio = coarse / fine;
    assert!((3.8..4.2).contains(&ratio), "refinement ratio {ratio}");
}

#[test]
fn constant_field_has_zero_derivatives() {
    let field = Field::from_grid(
        vec![("lat", centers(30, -90.0, 180.0)), ("lon", centers(40, 0.0, 360.0))],
        |_| 273.15,
    )
    .unwrap();
    let opts = Options::default();
    for out in [
        d_dlon(&field, &opts).unwrap(),
        d_dlat(&field, FieldKind::Scalar, &opts).unwrap(),
    ] {
        for value in out.values().iter() {
            assert_abs_diff_eq!(*value, 0.0, epsilon = 1e-15);
        }
    }
}

#[test]
fn vector_component_differs_from_scalar_at_mid_latitudes() {
    let opts = Options {
        radius: 1.0,
        ..Options::default()
    };
    let field = Field::from_grid(
        vec![("lat", centers(90, -90.0, 180.0)), ("lon", centers(8, 0.0, 360.0))],
        |p| p[0].to_radians().cos(),
    )
    .unwrap();
    let scalar = d_dlat(&field, FieldKind::Scalar, &opts).unwrap();
    let vector = d_dlat(&field, FieldKind::VectorComponent, &opts).unwrap();
    let lat = field.dim_coord("lat").unwrap();
    let scalar = scalar.values().view().into_dimensionality::<Ix2>().unwrap();
    let vector = vector.values().view().into_dimensionality::<Ix2>().unwrap();

    // 45° N sits at index 67 of a 2° cell-centred grid.
    let j = 67;
    assert_abs_diff_eq!(lat[j], 45.0, epsilon = 1e-9);
    let phi = lat[j].to_radians();
    for k in 0..8 {
        assert_abs_diff_eq!(scalar[[j, k]], -phi.sin(), epsilon = 1e-3);
        assert_abs_diff_eq!(vector[[j, k]], -2.0 * phi.sin(), epsilon = 2e-3);
        assert!((scalar[[j, k]] - vector[[j, k]]).abs() > 0.5);
    }
}

#[test]
fn vector_and_scalar_agree_near_the_equator() {
    // d(cos φ f)/cos φ = f' - tan φ f, so the two forms coincide where f vanishes
    // or tan φ does.
    let opts = Options {
        radius: 1.0,
        ..Options::default()
    };
    let field = Field::from_grid(
        vec![("lat", centers(90, -90.0, 180.0)), ("lon", centers(4, 0.0, 360.0))],
        |p| p[0].to_radians().sin(),
    )
    .unwrap();
    let scalar = d_dlat(&field, FieldKind::Scalar, &opts).unwrap();
    let vector = d_dlat(&field, FieldKind::VectorComponent, &opts).unwrap();
    let lat = field.dim_coord("lat").unwrap();
    let equator = lat
        .iter()
        .position(|v| (v - 1.0).abs() < 1e-9)
        .unwrap();
    let s = scalar.values().index_axis(Axis(0), equator).to_owned();
    let v = vector.values().index_axis(Axis(0), equator).to_owned();
    for (a, b) in s.iter().zip(v.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-3);
    }
}

fn named_grid() -> Field {
    Field::from_grid(
        vec![
            ("latitude", centers(18, -90.0, 180.0)),
            ("longitude", centers(36, 0.0, 360.0)),
        ],
        |p| p[0].to_radians().cos() * p[1].to_radians().sin(),
    )
    .unwrap()
}

#[test]
fn scoped_dimension_names_apply_only_inside_the_scope() {
    let field = named_grid();
    let mut registry = OptionsRegistry::default();

    assert!(matches!(
        registry.d_dlon(&field, &OptionOverrides::new()),
        Err(DiffError::DimensionNotFound(_))
    ));

    let out = registry
        .scoped(
            &OptionOverrides::new()
                .lon_dim("longitude")
                .lat_dim("latitude"),
            |reg| reg.d_dlon(&field, &OptionOverrides::new()),
        )
        .unwrap();
    assert_eq!(out.shape(), field.shape());
    assert_eq!(
        registry.get_option(OptionKey::LonDim),
        OptionValue::Name("lon".into())
    );
}

#[test]
fn scope_is_restored_when_the_call_fails() {
    let field = named_grid();
    let mut registry = OptionsRegistry::default();
    let result = registry.scoped(&OptionOverrides::new().lon_dim("longitude"), |reg| {
        // latitude is still "lat", which the field lacks.
        reg.d_dlat(&field, FieldKind::Scalar, &OptionOverrides::new())
    });
    assert!(matches!(result, Err(DiffError::DimensionNotFound(name)) if name == "lat"));
    assert_eq!(registry.current().lon_dim, "lon");
    assert_eq!(registry.depth(), 1);
}

#[test]
fn explicit_names_override_registry_defaults() {
    let field = named_grid();
    let registry = OptionsRegistry::default();
    let out = registry
        .d_dlat(
            &field,
            FieldKind::VectorComponent,
            &OptionOverrides::new()
                .lon_dim("longitude")
                .lat_dim("latitude"),
        )
        .unwrap();
    assert_eq!(out.dims(), field.dims());
}
