//! Bass-band energy extraction.
//!
//! Averaging the lowest bins approximates bass-driven pulse energy. It is
//! not onset detection; the visuals only need a plausible pulsation.

/// Default floor on the band width (bins)
pub const MIN_BAND_BINS: usize = 12;

/// Number of low bins averaged for a sample of `len` bins
///
/// `max(min_bins, floor(len * band_fraction))`, capped at `len`.
pub fn band_size(len: usize, band_fraction: f32, min_bins: usize) -> usize {
    let fraction = if band_fraction.is_finite() {
        band_fraction.max(0.0)
    } else {
        0.0
    };
    let proportional = (len as f32 * fraction).floor() as usize;
    proportional.max(min_bins).min(len)
}

/// Normalized bass level in 0..=1 using the default band floor
pub fn extract(sample: &[u8], band_fraction: f32) -> f32 {
    extract_with_floor(sample, band_fraction, MIN_BAND_BINS)
}

/// Normalized bass level in 0..=1
pub fn extract_with_floor(sample: &[u8], band_fraction: f32, min_bins: usize) -> f32 {
    let band = band_size(sample.len(), band_fraction, min_bins);
    if band == 0 {
        return 0.0;
    }
    let sum: u32 = sample[..band].iter().map(|&b| u32::from(b)).sum();
    sum as f32 / (band as f32 * 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_scale_band_is_one() {
        let sample = [255u8; 256];
        assert_eq!(extract(&sample, 0.18), 1.0);
    }

    #[test]
    fn test_band_uses_lowest_bins_only() {
        let mut sample = [0u8; 128];
        // floor(128 * 0.18) = 23 bins
        sample[..23].fill(255);
        assert_eq!(extract(&sample, 0.18), 1.0);

        sample[..23].fill(0);
        sample[23..].fill(255);
        assert_eq!(extract(&sample, 0.18), 0.0);
    }

    #[test]
    fn test_band_floor_applies_to_short_transforms() {
        assert_eq!(band_size(32, 0.18, MIN_BAND_BINS), 12);
        assert_eq!(band_size(128, 0.18, MIN_BAND_BINS), 23);
        // Never wider than the sample itself
        assert_eq!(band_size(8, 0.18, MIN_BAND_BINS), 8);
    }

    #[test]
    fn test_empty_sample_is_silent() {
        assert_eq!(extract(&[], 0.18), 0.0);
    }

    #[test]
    fn test_half_scale_band() {
        let sample = [51u8; 64];
        let level = extract(&sample, 0.25);
        assert!((level - 0.2).abs() < 1e-6);
    }
}
