//! Audio Probe Adapters

mod symphonia_probe;

pub use symphonia_probe::{decode_duration, SymphoniaProbe};
