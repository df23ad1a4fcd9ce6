/// Three-point centered first derivative on a non-uniform grid.
///
/// `h_back = x[i] - x[i-1]` and `h_fwd = x[i+1] - x[i]`. Reduces to
/// `(next - prev) / (h_back + h_fwd)` when the two gaps are equal.
#[inline]
pub fn centered_nonuniform(prev: f64, center: f64, next: f64, h_back: f64, h_fwd: f64) -> f64 {
    (h_back * (next - center) / h_fwd + h_fwd * (center - prev) / h_back) / (h_back + h_fwd)
}
