//! Piecewise linear interpolation over a sorted sample.

/// Left index of the interval of `intervals` containing `point`.
///
/// Points below the first sample give 0 and points above the last give the
/// last index. Samples must be sorted ascending.
pub fn find_interval_left_border_index(point: f64, intervals: &[f64]) -> usize {
    let last = intervals.len().saturating_sub(1);
    if intervals.len() < 2 || point < intervals[0] {
        return 0;
    }
    if point > intervals[last] {
        return last;
    }

    let mut left = 0;
    let mut right = last;
    while right - left != 1 {
        let mid = left + (right - left) / 2;
        if point >= intervals[mid] {
            left = mid;
        } else {
            right = mid;
        }
    }
    left
}

/// Value at `x` of the line through `(x0, y0)` and `(x1, y1)`.
pub fn linear_interpolation(x: f64, x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
    let a = (y1 - y0) / (x1 - x0);
    let b = -a * x0 + y0;
    a * x + b
}

/// Interpolate `ys` at `point` along `xs`. Outside the sample range the
/// nearest edge interval is extended. `None` with fewer than two samples.
pub fn interpolate(point: f64, xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() < 2 || ys.len() < xs.len() {
        return None;
    }
    let mut index = find_interval_left_border_index(point, xs);
    if index == xs.len() - 1 {
        index -= 1;
    }
    Some(linear_interpolation(
        point,
        xs[index],
        ys[index],
        xs[index + 1],
        ys[index + 1],
    ))
}
