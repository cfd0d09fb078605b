/// Replace every `None` with the nearest preceding `Some`. Leading `None`s stay `None`.
/// Returns how many cells were filled.
pub fn fill_forward_mut(values: &mut [Option<f64>]) -> usize {
    let mut last: Option<f64> = None;
    let mut filled = 0;
    for value in values.iter_mut() {
        match value {
            Some(v) => last = Some(*v),
            None => {
                if last.is_some() {
                    *value = last;
                    filled += 1;
                }
            }
        }
    }
    filled
}

/// Replace every `None` with the nearest following `Some`. Trailing `None`s stay `None`.
pub fn fill_backward_mut(values: &mut [Option<f64>]) -> usize {
    let mut next: Option<f64> = None;
    let mut filled = 0;
    for value in values.iter_mut().rev() {
        match value {
            Some(v) => next = Some(*v),
            None => {
                if next.is_some() {
                    *value = next;
                    filled += 1;
                }
            }
        }
    }
    filled
}

/// Fill every `None` with `default`.
pub fn fill_with_mut(values: &mut [Option<f64>], default: f64) -> usize {
    let mut filled = 0;
    for value in values.iter_mut().filter(|v| v.is_none()) {
        *value = Some(default);
        filled += 1;
    }
    filled
}

pub fn has_any_none_elements<T>(values: &[Option<T>]) -> bool {
    values.iter().any(Option::is_none)
}
