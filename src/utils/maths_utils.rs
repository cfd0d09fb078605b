use statrs::statistics::{Data, Median, Statistics};

/// Keep a value only if it is a real number. NaN/inf become missing.
#[inline]
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Trailing simple mean over exactly `window` values ending at each index.
/// Positions before the window fills, and windows touching a missing value, are `None`.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling_apply(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Trailing population standard deviation (ddof = 0), same windowing rules as `rolling_mean`.
pub fn rolling_population_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling_apply(values, window, |w| w.iter().population_std_dev())
}

fn rolling_apply<F>(values: &[Option<f64>], window: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }
    let mut buffer: Vec<f64> = Vec::with_capacity(window);
    for (end, slot) in out.iter_mut().enumerate().skip(window - 1) {
        buffer.clear();
        let complete = values[end + 1 - window..=end].iter().all(|v| match v {
            Some(x) if x.is_finite() => {
                buffer.push(*x);
                true
            }
            _ => false,
        });
        if complete {
            *slot = finite(f(&buffer));
        }
    }
    out
}

/// Median over the defined cells of a column. `None` if there are none.
pub fn median_of_defined(values: &[Option<f64>]) -> Option<f64> {
    let defined: Vec<f64> = values.iter().flatten().copied().filter(|v| v.is_finite()).collect();
    if defined.is_empty() {
        return None;
    }
    finite(Data::new(defined).median())
}
