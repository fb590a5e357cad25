//! Per-bucket gradient-descent budgets

use pipeline_core::mean;

/// Iterations for each of `segments` seasonality buckets.
///
/// With one error per bucket from the last validation and a positive mean
/// error `ē`, bucket `k` trains for `round(gd · e_k / ē)` iterations clamped
/// to `[max(1, gd / max_iteration_factor), gd]`. Buckets whose error is
/// unknown, or every bucket when there is no usable history, train for
/// the full `gd`.
pub fn dynamic_iterations(
    gd: usize,
    max_iteration_factor: usize,
    errors: Option<&[f64]>,
    segments: usize,
) -> Vec<usize> {
    let full = vec![gd; segments];
    let Some(errors) = errors.filter(|e| e.len() == segments) else {
        return full;
    };
    let known: Vec<f64> = errors.iter().copied().filter(|e| e.is_finite()).collect();
    if known.is_empty() {
        return full;
    }
    let average = mean(&known);
    if !(average > 0.0) {
        return full;
    }

    let floor = (gd / max_iteration_factor.max(1)).max(1).min(gd);
    errors
        .iter()
        .map(|&e| {
            if e.is_finite() {
                ((gd as f64 * e / average).round() as usize).clamp(floor, gd)
            } else {
                gd
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_history() {
        assert_eq!(dynamic_iterations(55, 10, None, 3), vec![55, 55, 55]);
    }

    #[test]
    fn test_scales_with_relative_error() {
        // mean error 0.375, floor 4
        let errors = [0.25, 0.5, 0.75, 0.0];
        assert_eq!(
            dynamic_iterations(40, 10, Some(&errors), 4),
            vec![27, 40, 40, 4]
        );
    }

    #[test]
    fn test_floor_is_at_least_one() {
        let errors = [0.0, 1.0];
        assert_eq!(dynamic_iterations(5, 10, Some(&errors), 2), vec![1, 5]);
    }

    #[test]
    fn test_unknown_errors_train_fully() {
        let errors = [f64::NAN, 0.1, 0.3];
        assert_eq!(dynamic_iterations(20, 10, Some(&errors), 3), vec![20, 10, 20]);
    }

    #[test]
    fn test_length_mismatch_ignores_history() {
        let errors = [0.1, 0.2];
        assert_eq!(dynamic_iterations(8, 2, Some(&errors), 3), vec![8, 8, 8]);
    }

    #[test]
    fn test_zero_mean_ignores_history() {
        let errors = [0.0, 0.0];
        assert_eq!(dynamic_iterations(8, 2, Some(&errors), 2), vec![8, 8]);
    }
}
