use metrics::{counter, gauge};

use crate::{config::DimRole, differencing::FieldKind, spacing::AxisSpacing};

pub fn record_spacing(spacing: &AxisSpacing) {
    let centered = spacing.centered();
    if let Some(min) = centered.iter().cloned().reduce(f64::min) {
        gauge!("spherediff.spacing.min_rad", min, "dim" => spacing.dim.clone());
    }
    if let Some(max) = centered.iter().cloned().reduce(f64::max) {
        gauge!("spherediff.spacing.max_rad", max, "dim" => spacing.dim.clone());
    }
}

pub fn record_derivative(role: DimRole, kind: FieldKind, points: usize) {
    counter!(
        "spherediff.derivative.calls",
        1,
        "role" => role.as_str(),
        "kind" => kind.as_str()
    );
    gauge!("spherediff.derivative.points", points as f64, "role" => role.as_str());
}
