//! Gaussian kernel density estimate for the pairplot diagonal.

use std::f64::consts::PI;

/// Scott's rule: sample standard deviation times `n^(-1/5)`.
///
/// `None` for fewer than two values or zero spread.
pub fn scott_bandwidth(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let bandwidth = variance.sqrt() * (n as f64).powf(-0.2);

    if bandwidth.is_finite() && bandwidth > 0.0 {
        Some(bandwidth)
    } else {
        None
    }
}

/// Evaluate the density on `points` evenly spaced positions spanning the
/// data plus three bandwidths on each side.
pub fn gaussian_kde(values: &[f64], points: usize) -> Vec<(f64, f64)> {
    let bandwidth = match scott_bandwidth(values) {
        Some(bw) => bw,
        None => return Vec::new(),
    };
    if points < 2 {
        return Vec::new();
    }

    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let start = min - 3.0 * bandwidth;
    let end = max + 3.0 * bandwidth;
    let step = (end - start) / (points - 1) as f64;

    let norm = 1.0 / (values.len() as f64 * bandwidth * (2.0 * PI).sqrt());

    (0..points)
        .map(|i| {
            let x = start + step * i as f64;
            let sum: f64 = values
                .iter()
                .map(|v| {
                    let z = (x - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum();
            (x, sum * norm)
        })
        .collect()
}

/// Min and max of the values, widened so a flat range still draws.
pub fn padded_range(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 1.0);
    }

    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let span = max - min;
    let pad = if span > 0.0 { span * 0.05 } else { 0.5 };
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bandwidth_edge_cases() {
        assert_eq!(scott_bandwidth(&[]), None);
        assert_eq!(scott_bandwidth(&[1.0]), None);
        assert_eq!(scott_bandwidth(&[4.0, 4.0, 4.0]), None);
        assert!(scott_bandwidth(&[1.0, 2.0, 3.0]).unwrap() > 0.0);
    }

    #[test]
    fn test_density_integrates_to_about_one() {
        let values: Vec<f64> = (0..200).map(|i| (i % 24) as f64).collect();
        let curve = gaussian_kde(&values, 512);

        let area: f64 = curve
            .windows(2)
            .map(|w| (w[1].0 - w[0].0) * (w[0].1 + w[1].1) / 2.0)
            .sum();
        assert!((area - 1.0).abs() < 0.02, "area {}", area);
    }

    #[test]
    fn test_density_peaks_near_the_mode() {
        let mut values = vec![17.0; 50];
        values.extend([3.0, 8.0, 12.0, 22.0]);
        let curve = gaussian_kde(&values, 256);

        let peak = curve
            .iter()
            .cloned()
            .fold((0.0, f64::NEG_INFINITY), |best, p| if p.1 > best.1 { p } else { best });
        assert!((peak.0 - 17.0).abs() < 1.0);
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range(&[]), (0.0, 1.0));
        assert_eq!(padded_range(&[4.0]), (3.5, 4.5));
        let (lo, hi) = padded_range(&[0.0, 10.0]);
        assert!(lo < 0.0 && hi > 10.0);
    }
}
