//! Histogram and brightness statistics engine
//!
//! Pure computation from an [`ImageTensor`] to a [`HistogramReport`]: no
//! state, no I/O, deterministic. The numeric conventions here are load-bearing
//! for reproducible comparisons and must not drift:
//!
//! - quantization is `floor(clamp(v, 0, 1) * 255)` cast to `u8`, never
//!   round-to-nearest;
//! - luminance is derived from the already-quantized R/G/B planes
//!   (quantize-then-combine);
//! - standard deviation uses the population denominator N, not N-1;
//! - the median of an even-count channel averages the two middle values in
//!   `f64` and truncates the fractional half toward zero.

use crate::models::{
    ChannelHistograms, ChannelStats, ChannelStatsSet, HistogramReport, ImageTensor,
};

/// One bucket per 8-bit intensity, covering `[0, 256)`.
pub const HISTOGRAM_BUCKETS: usize = 256;

/// Map a normalized sample to its 8-bit intensity.
pub(crate) fn quantize(value: f32) -> u8 {
    // `as u8` truncates toward zero after the clamp, so this is exactly
    // floor(clamp(v, 0, 1) * 255).
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

/// ITU-R BT.601 luma from quantized planes, floored and clipped to 8 bits.
fn luminance(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)) as u8
}

/// Compute per-channel histograms and summary statistics for a single image.
///
/// A redundant leading batch dimension is collapsed; a fourth (alpha) channel
/// is ignored. Multi-image batches must have been rejected by the caller.
pub fn compute_histogram_stats(image: &ImageTensor) -> HistogramReport {
    let (height, width, channels) = image.logical_dims();
    let pixels = height * width;

    let mut red = Vec::with_capacity(pixels);
    let mut green = Vec::with_capacity(pixels);
    let mut blue = Vec::with_capacity(pixels);
    let mut luma = Vec::with_capacity(pixels);

    debug_assert!(matches!(channels, 3 | 4));
    for y in 0..height {
        for x in 0..width {
            let r = quantize(image.sample(y, x, 0));
            let g = quantize(image.sample(y, x, 1));
            let b = quantize(image.sample(y, x, 2));
            red.push(r);
            green.push(g);
            blue.push(b);
            luma.push(luminance(r, g, b));
        }
    }

    let (luminance_hist, luminance_stats) = analyze_channel(&luma);
    let (red_hist, red_stats) = analyze_channel(&red);
    let (green_hist, green_stats) = analyze_channel(&green);
    let (blue_hist, blue_stats) = analyze_channel(&blue);

    HistogramReport {
        histograms: ChannelHistograms {
            luminance: luminance_hist,
            red: red_hist,
            green: green_hist,
            blue: blue_hist,
        },
        stats: ChannelStatsSet {
            luminance: luminance_stats,
            red: red_stats,
            green: green_stats,
            blue: blue_stats,
        },
    }
}

/// Histogram plus summary statistics for one quantized plane.
///
/// Everything derives from the bucket counts, which keeps the integer
/// statistics exact and the floating-point ones free of accumulation order
/// effects.
fn analyze_channel(samples: &[u8]) -> (Vec<u32>, ChannelStats) {
    let mut counts = vec![0u32; HISTOGRAM_BUCKETS];
    for &sample in samples {
        counts[sample as usize] += 1;
    }
    let stats = stats_from_counts(&counts, samples.len());
    (counts, stats)
}

fn stats_from_counts(counts: &[u32], n: usize) -> ChannelStats {
    debug_assert!(n > 0, "channels of a validated tensor are never empty");

    let min = counts.iter().position(|&c| c > 0).unwrap_or(0) as u32;
    let max = counts.iter().rposition(|&c| c > 0).unwrap_or(0) as u32;

    let sum: u64 = counts
        .iter()
        .enumerate()
        .map(|(value, &count)| value as u64 * u64::from(count))
        .sum();
    let mean = sum as f64 / n as f64;

    let variance = counts
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count > 0)
        .map(|(value, &count)| {
            let delta = value as f64 - mean;
            delta * delta * f64::from(count)
        })
        .sum::<f64>()
        / n as f64;

    // First occurrence wins ties, so the mode lands on the lowest intensity.
    let mut mode = 0u32;
    let mut best = 0u32;
    for (value, &count) in counts.iter().enumerate() {
        if count > best {
            best = count;
            mode = value as u32;
        }
    }

    ChannelStats {
        min,
        max,
        mean,
        median: median_from_counts(counts, n),
        std_dev: variance.sqrt(),
        mode,
        dynamic_range: max - min,
    }
}

/// Numeric median from bucket counts, reported as an integer.
///
/// Odd counts take the middle element. Even counts average the two middle
/// elements in `f64` and truncate toward zero.
fn median_from_counts(counts: &[u32], n: usize) -> u32 {
    let nth = |k: usize| -> u32 {
        let mut seen = 0usize;
        for (value, &count) in counts.iter().enumerate() {
            seen += count as usize;
            if seen > k {
                return value as u32;
            }
        }
        (HISTOGRAM_BUCKETS - 1) as u32
    };
    if n % 2 == 1 {
        nth(n / 2)
    } else {
        let lower = nth(n / 2 - 1);
        let upper = nth(n / 2);
        ((f64::from(lower) + f64::from(upper)) / 2.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A sample that quantizes exactly to `value`, away from bucket edges.
    fn px(value: u8) -> f32 {
        (f32::from(value) + 0.5) / 255.0
    }

    fn plane_image(red: &[u8]) -> ImageTensor {
        let data: Vec<f32> = red
            .iter()
            .flat_map(|&r| [px(r), 0.0, 0.0])
            .collect();
        ImageTensor::from_pixels(1, red.len(), 3, data).unwrap()
    }

    #[test]
    fn quantize_floors_after_scaling() {
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(0.5), 127); // 127.5 floors down
        assert_eq!(quantize(1.0), 255);
        assert_eq!(quantize(-0.25), 0);
        assert_eq!(quantize(1.75), 255);
    }

    #[test]
    fn histograms_sum_to_pixel_count() {
        let data: Vec<f32> = (0..60).map(|i| (i as f32) / 60.0).collect();
        let image = ImageTensor::from_pixels(4, 5, 3, data).unwrap();
        let report = compute_histogram_stats(&image);
        for hist in [
            &report.histograms.luminance,
            &report.histograms.red,
            &report.histograms.green,
            &report.histograms.blue,
        ] {
            assert_eq!(hist.len(), HISTOGRAM_BUCKETS);
            assert_eq!(hist.iter().sum::<u32>(), 20);
        }
    }

    #[test]
    fn uniform_mid_gray_image() {
        let image = ImageTensor::from_pixels(2, 2, 3, vec![0.5; 12]).unwrap();
        let report = compute_histogram_stats(&image);

        for stats in [
            &report.stats.red,
            &report.stats.green,
            &report.stats.blue,
        ] {
            assert_eq!(stats.min, 127);
            assert_eq!(stats.max, 127);
            assert_eq!(stats.mean, 127.0);
            assert_eq!(stats.median, 127);
            assert_eq!(stats.std_dev, 0.0);
            assert_eq!(stats.mode, 127);
            assert_eq!(stats.dynamic_range, 0);
        }

        // quantization leaves the luma within one intensity step of mid-gray
        let luma = &report.stats.luminance;
        assert!((luma.mean - 127.0).abs() <= 1.0);
        assert_eq!(luma.std_dev, 0.0);
        assert_eq!(luma.mode, luma.min);
        assert_eq!(luma.mode, luma.max);
        assert_eq!(report.histograms.luminance[luma.mode as usize], 4);
    }

    #[test]
    fn pure_red_image() {
        let data: Vec<f32> = [1.0, 0.0, 0.0].repeat(4);
        let image = ImageTensor::from_pixels(2, 2, 3, data).unwrap();
        let report = compute_histogram_stats(&image);

        assert_eq!(report.stats.red.min, 255);
        assert_eq!(report.stats.red.max, 255);
        assert_eq!(report.stats.red.mean, 255.0);
        assert_eq!(report.stats.red.std_dev, 0.0);
        for stats in [&report.stats.green, &report.stats.blue] {
            assert_eq!(stats.min, 0);
            assert_eq!(stats.max, 0);
            assert_eq!(stats.mean, 0.0);
            assert_eq!(stats.dynamic_range, 0);
        }
        // floor(0.299 * 255) from the quantized red plane alone
        assert_eq!(report.stats.luminance.min, 76);
        assert_eq!(report.stats.luminance.max, 76);
    }

    #[test]
    fn alpha_channel_is_ignored() {
        let rgb: Vec<f32> = (0..12).map(|i| px((i * 20) as u8)).collect();
        let rgba: Vec<f32> = rgb
            .chunks(3)
            .flat_map(|p| [p[0], p[1], p[2], 0.37])
            .collect();
        let with_alpha = ImageTensor::from_pixels(2, 2, 4, rgba).unwrap();
        let without = ImageTensor::from_pixels(2, 2, 3, rgb).unwrap();
        assert_eq!(
            compute_histogram_stats(&with_alpha),
            compute_histogram_stats(&without)
        );
    }

    #[test]
    fn leading_batch_dimension_is_collapsed() {
        let data: Vec<f32> = (0..12).map(|i| px((i * 9) as u8)).collect();
        let rank3 = ImageTensor::from_pixels(2, 2, 3, data.clone()).unwrap();
        let rank4 = ImageTensor::new(vec![1, 2, 2, 3], data).unwrap();
        assert_eq!(
            compute_histogram_stats(&rank3),
            compute_histogram_stats(&rank4)
        );
    }

    #[test]
    fn median_of_even_count_truncates_toward_zero() {
        // red plane [0, 0, 1, 1]: numeric median 0.5 reports as 0
        let report = compute_histogram_stats(&plane_image(&[0, 0, 1, 1]));
        assert_eq!(report.stats.red.median, 0);
        // [10, 20]: median 15.0, no fractional part to drop
        let report = compute_histogram_stats(&plane_image(&[10, 20]));
        assert_eq!(report.stats.red.median, 15);
    }

    #[test]
    fn median_of_odd_count_is_middle_element() {
        let report = compute_histogram_stats(&plane_image(&[5, 9, 200]));
        assert_eq!(report.stats.red.median, 9);
    }

    #[test]
    fn mode_ties_break_toward_lowest_intensity() {
        let report = compute_histogram_stats(&plane_image(&[7, 7, 3, 3, 9]));
        assert_eq!(report.stats.red.mode, 3);
    }

    #[test]
    fn population_std_dev_uses_n_denominator() {
        // red plane [0, 2]: population variance 1.0, sample variance would be 2.0
        let report = compute_histogram_stats(&plane_image(&[0, 2]));
        assert_eq!(report.stats.red.mean, 1.0);
        assert_eq!(report.stats.red.std_dev, 1.0);
        assert_eq!(report.stats.red.dynamic_range, 2);
    }

    #[test]
    fn dynamic_range_matches_extrema() {
        let report = compute_histogram_stats(&plane_image(&[12, 200, 44, 97]));
        let stats = &report.stats.red;
        assert_eq!(stats.min, 12);
        assert_eq!(stats.max, 200);
        assert_eq!(stats.dynamic_range, stats.max - stats.min);
    }
}
