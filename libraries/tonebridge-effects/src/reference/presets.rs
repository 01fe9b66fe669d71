//! Stock equalizer tables of the reference engines

/// Preset names shared by both equalizers
pub static PRESET_NAMES: [&str; 10] = [
    "Normal",
    "Classical",
    "Dance",
    "Flat",
    "Folk",
    "Heavy Metal",
    "Hip Hop",
    "Jazz",
    "Pop",
    "Rock",
];

/// Band level limits in millibel (+-15 dB)
pub const BAND_LEVEL_RANGE: (i16, i16) = (-1500, 1500);

/// Platform equalizer center frequencies in milli-hertz
pub static EQUALIZER_CENTER_FREQS: [u32; 5] = [60_000, 230_000, 910_000, 3_600_000, 14_000_000];

/// Platform equalizer band levels per preset
pub static EQUALIZER_PRESETS: [[i16; 5]; 10] = [
    [300, 0, 0, 0, 300],
    [500, 300, -200, 400, 400],
    [600, 0, 200, 400, 100],
    [0, 0, 0, 0, 0],
    [300, 0, 0, 200, -100],
    [400, 100, 900, 300, 0],
    [500, 300, 0, 100, 300],
    [400, 200, -200, 200, 500],
    [-100, 200, 500, 100, -200],
    [500, 300, -100, 300, 50],
];

/// High-quality equalizer octave bands in milli-hertz
pub static HQ_EQUALIZER_CENTER_FREQS: [u32; 10] = [
    31_250, 62_500, 125_000, 250_000, 500_000, 1_000_000, 2_000_000, 4_000_000, 8_000_000,
    16_000_000,
];

/// High-quality equalizer band levels per preset
pub static HQ_EQUALIZER_PRESETS: [[i16; 10]; 10] = [
    [300, 300, 200, 0, 0, 0, 0, 100, 300, 300],
    [0, 0, 0, 0, 0, 0, -100, -100, -200, -300],
    [500, 400, 300, 0, 0, -100, 0, 100, 100, 100],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [200, 300, 300, 100, 0, 0, 0, 200, -100, -100],
    [400, 400, 200, 100, 0, 300, 500, 100, 200, 400],
    [400, 500, 400, 300, 0, 0, 100, 100, 200, 300],
    [300, 400, 400, 200, 0, -200, 0, 200, 300, 500],
    [-100, -100, 0, 200, 300, 500, 200, 100, -100, -200],
    [400, 500, 400, 300, 0, -100, 0, 300, 400, 500],
];
