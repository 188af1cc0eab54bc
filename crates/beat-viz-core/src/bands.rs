//! Frequency band aggregation.
//!
//! Maps a byte magnitude spectrum onto the five named bands the renderers
//! care about. Bin edges follow the analyser convention where bin `i` of
//! `bin_count` bins covers `i / bin_count` of the Nyquist frequency.

/// A named closed frequency interval in Hz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyBand {
    pub name: &'static str,
    pub low_hz: f32,
    pub high_hz: f32,
}

impl FrequencyBand {
    pub const fn new(name: &'static str, low_hz: f32, high_hz: f32) -> Self {
        Self {
            name,
            low_hz,
            high_hz,
        }
    }

    /// Inclusive bin range covered by this band, clamped to `[0, bin_count - 1]`.
    ///
    /// Returns `None` when there are no bins to look at.
    pub fn bin_range(&self, sample_rate: f32, bin_count: usize) -> Option<(usize, usize)> {
        if bin_count == 0 || !(sample_rate > 0.0) {
            return None;
        }
        let low = freq_to_bin(self.low_hz, sample_rate, bin_count);
        let high = freq_to_bin(self.high_hz, sample_rate, bin_count);
        Some((low, high))
    }
}

pub const BASS: FrequencyBand = FrequencyBand::new("bass", 20.0, 250.0);
pub const MID: FrequencyBand = FrequencyBand::new("mid", 251.0, 2000.0);
pub const HIGH: FrequencyBand = FrequencyBand::new("high", 2001.0, 9000.0);
pub const VOCALS: FrequencyBand = FrequencyBand::new("vocals", 300.0, 3000.0);
pub const OVERALL: FrequencyBand = FrequencyBand::new("overall", 20.0, 9000.0);

/// Bands in the order `BandLayout` stores them
pub const ALL_BANDS: [FrequencyBand; 5] = [OVERALL, BASS, MID, HIGH, VOCALS];

/// `round(freq / nyquist * bin_count)`, clamped to a valid index.
fn freq_to_bin(freq: f32, sample_rate: f32, bin_count: usize) -> usize {
    let nyquist = sample_rate / 2.0;
    let bin = (freq / nyquist * bin_count as f32).round();
    if bin <= 0.0 {
        0
    } else {
        (bin as usize).min(bin_count - 1)
    }
}

/// Arithmetic mean of `sample[low..=high]` for the band's bins.
///
/// The upper edge is clamped to the last index of `sample`. Empty ranges
/// (inverted edges, zero bins, an empty sample) average to 0.
pub fn average_in_band(
    sample: &[u8],
    band: &FrequencyBand,
    sample_rate: f32,
    bin_count: usize,
) -> f32 {
    match band.bin_range(sample_rate, bin_count) {
        Some(range) => average_bins(sample, range),
        None => 0.0,
    }
}

fn average_bins(sample: &[u8], (low, high): (usize, usize)) -> f32 {
    let high = match sample.len().checked_sub(1) {
        Some(last) => high.min(last),
        None => return 0.0,
    };
    if low > high {
        return 0.0;
    }
    let bins = &sample[low..=high];
    let sum: u32 = bins.iter().map(|&v| v as u32).sum();
    sum as f32 / bins.len() as f32
}

/// Averaged amplitude (0-255 scale) per band for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BandAverages {
    pub overall: f32,
    pub bass: f32,
    pub mid: f32,
    pub high: f32,
    pub vocals: f32,
}

/// Bin ranges of `ALL_BANDS`, pre-computed for one analysis source.
///
/// Only rebuilt when the source reports a different sample rate or bin count.
#[derive(Debug, Clone, PartialEq)]
pub struct BandLayout {
    sample_rate: f32,
    bin_count: usize,
    ranges: [Option<(usize, usize)>; 5],
}

impl BandLayout {
    pub fn new(sample_rate: f32, bin_count: usize) -> Self {
        let ranges = ALL_BANDS.map(|band| band.bin_range(sample_rate, bin_count));
        Self {
            sample_rate,
            bin_count,
            ranges,
        }
    }

    pub fn matches(&self, sample_rate: f32, bin_count: usize) -> bool {
        self.sample_rate == sample_rate && self.bin_count == bin_count
    }

    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn ranges(&self) -> &[Option<(usize, usize)>; 5] {
        &self.ranges
    }

    /// Computes all five band averages for one magnitude sample
    pub fn averages(&self, sample: &[u8]) -> BandAverages {
        let avg = |idx: usize| self.ranges[idx].map_or(0.0, |range| average_bins(sample, range));
        BandAverages {
            overall: avg(0),
            bass: avg(1),
            mid: avg(2),
            high: avg(3),
            vocals: avg(4),
        }
    }
}
