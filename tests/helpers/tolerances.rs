//! Tolerance constants for Hook Aid tests.

/// Floating point rounding errors (for exact gain and averaging).
pub const FLOAT_EPSILON: f32 = 1e-6;

/// 16-bit quantization step size.
/// Use when comparing rendered audio against decoded WAV output.
pub const INT16_EPSILON: f32 = 1.0 / 32768.0;

/// Tempo estimates are quantized to whole onset frames (about 43 per
/// second), which moves a ~120 BPM estimate by up to ~3 BPM per frame.
pub const TEMPO_TOLERANCE_BPM: f64 = 4.0;

/// Allowed deviation of a rendered buffer length from the analytic length.
pub const LENGTH_TOLERANCE_SAMPLES: usize = 1;
