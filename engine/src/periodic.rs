//! Modular index arithmetic shared by the spacing resolver and the stencil.

use ndarray::{Array1, ArrayD, ArrayViewD, Axis, Zip};

/// Map a possibly out-of-range index onto `0..n`.
#[inline]
pub fn wrap_index(i: isize, n: usize) -> usize {
    debug_assert!(n > 0, "cannot wrap into an empty range");
    i.rem_euclid(n as isize) as usize
}

/// Number of whole periods crossed when stepping to index `i`.
#[inline]
pub fn wraps(i: isize, n: usize) -> isize {
    i.div_euclid(n as isize)
}

/// Cyclic shift along `axis`: `out[.., i, ..] = input[.., (i + offset) mod n, ..]`.
pub fn shift_axis(input: &ArrayViewD<'_, f64>, axis: usize, offset: isize) -> ArrayD<f64> {
    let n = input.len_of(Axis(axis));
    let mut out = ArrayD::zeros(input.raw_dim());
    if n == 0 {
        return out;
    }
    Zip::from(out.lanes_mut(Axis(axis)))
        .and(input.lanes(Axis(axis)))
        .for_each(|mut dst, src| {
            for (i, slot) in dst.iter_mut().enumerate() {
                *slot = src[wrap_index(i as isize + offset, n)];
            }
        });
    out
}

/// Periodic extension of a monotonic coordinate.
///
/// Entry `i` holds the coordinate of grid point `i + offset`, with `period`
/// added for every wrap past the end (or subtracted for every wrap before the
/// start), so the result stays monotonic.
pub fn extended_coord(coord: &Array1<f64>, offset: isize, period: f64) -> Array1<f64> {
    let n = coord.len();
    Array1::from_shape_fn(n, |i| {
        let target = i as isize + offset;
        coord[wrap_index(target, n)] + wraps(target, n) as f64 * period
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn wrap_index_handles_both_edges() {
        assert_eq!(wrap_index(-1, 5), 4);
        assert_eq!(wrap_index(5, 5), 0);
        assert_eq!(wrap_index(-6, 5), 4);
        assert_eq!(wrap_index(12, 5), 2);
        assert_eq!(wraps(-1, 5), -1);
        assert_eq!(wraps(4, 5), 0);
        assert_eq!(wraps(5, 5), 1);
    }

    #[test]
    fn shift_axis_rolls_each_lane() {
        let input = Array2::from_shape_vec((2, 4), vec![0., 1., 2., 3., 10., 11., 12., 13.])
            .unwrap()
            .into_dyn();
        let next = shift_axis(&input.view(), 1, 1);
        assert_eq!(
            next.into_dimensionality::<ndarray::Ix2>().unwrap(),
            array![[1., 2., 3., 0.], [11., 12., 13., 10.]]
        );
        let prev = shift_axis(&input.view(), 1, -1);
        assert_eq!(
            prev.into_dimensionality::<ndarray::Ix2>().unwrap(),
            array![[3., 0., 1., 2.], [13., 10., 11., 12.]]
        );
        let rows = shift_axis(&input.view(), 0, 1);
        assert_eq!(
            rows.into_dimensionality::<ndarray::Ix2>().unwrap(),
            array![[10., 11., 12., 13.], [0., 1., 2., 3.]]
        );
    }

    #[test]
    fn full_rotation_is_identity() {
        let input = Array1::linspace(0.0, 1.0, 7).into_dyn();
        assert_eq!(shift_axis(&input.view(), 0, 7), input);
        assert_eq!(shift_axis(&input.view(), 0, -14), input);
    }

    #[test]
    fn extended_coord_adds_period_across_the_seam() {
        let lon = array![45.0, 135.0, 225.0, 315.0];
        assert_eq!(
            extended_coord(&lon, -1, 360.0),
            array![-45.0, 45.0, 135.0, 225.0]
        );
        assert_eq!(
            extended_coord(&lon, 1, 360.0),
            array![135.0, 225.0, 315.0, 405.0]
        );
    }
}
