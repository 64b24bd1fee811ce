use statrs::statistics::Statistics;

/// Arithmetic mean, `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.iter().mean()
}

/// Population standard deviation, `0.0` when fewer than two values exist.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    values.iter().population_std_dev()
}

/// Least-squares slope of `values` against their position (0, 1, 2, ...).
///
/// Values are expected oldest first, so a negative slope means they are falling over time.
pub fn slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);

    let (numerator, denominator) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (i, y)| {
            let dx = i as f64 - x_mean;
            (num + dx * (y - y_mean), den + dx * dx)
        });

    numerator / denominator
}

/// Slope over the `window` most recent values of a newest-first series.
pub fn recent_slope(newest_first: &[f64], window: usize) -> f64 {
    let chronological: Vec<f64> = newest_first.iter().take(window).rev().copied().collect();

    slope(&chronological)
}
