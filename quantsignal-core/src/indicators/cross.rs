//! Crossover detection between two aligned series.

/// `a` crossed above `b` at `index`: a[i-1] <= b[i-1] and a[i] > b[i].
/// False at index 0, out of range, or when any of the four values is NaN.
pub fn crossover(a: &[f64], b: &[f64], index: usize) -> bool {
    match points(a, b, index) {
        Some((a_prev, b_prev, a_now, b_now)) => a_prev <= b_prev && a_now > b_now,
        None => false,
    }
}

/// `a` crossed below `b` at `index`: a[i-1] >= b[i-1] and a[i] < b[i].
pub fn crossunder(a: &[f64], b: &[f64], index: usize) -> bool {
    match points(a, b, index) {
        Some((a_prev, b_prev, a_now, b_now)) => a_prev >= b_prev && a_now < b_now,
        None => false,
    }
}

fn points(a: &[f64], b: &[f64], index: usize) -> Option<(f64, f64, f64, f64)> {
    if index == 0 || index >= a.len() || index >= b.len() {
        return None;
    }
    let p = (a[index - 1], b[index - 1], a[index], b[index]);
    if p.0.is_nan() || p.1.is_nan() || p.2.is_nan() || p.3.is_nan() {
        return None;
    }
    Some(p)
}
