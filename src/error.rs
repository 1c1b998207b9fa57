//! Error types shared by the frame model, the render pipeline and the loader.

use std::path::PathBuf;
use thiserror::Error;

/// A frame record that cannot be rendered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame has zero size ({width}x{height})")]
    ZeroDimension { width: u32, height: u32 },

    #[error("unsupported bits allocated: {0} (expected 8 or 16)")]
    UnsupportedBitsAllocated(u16),

    #[error("bits stored {stored} is outside 1..={allocated}")]
    InvalidBitsStored { stored: u16, allocated: u16 },

    #[error("sample buffer holds {actual} bytes, {expected} required")]
    UndersizedBuffer { expected: usize, actual: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalibrationError {
    #[error("pixel ({x}, {y}) is outside the {width}x{height} frame")]
    IndexOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("zoom factor must be finite and positive, got {0}")]
    InvalidZoomFactor(f64),
}

/// Failure to turn a file on disk into a renderable frame.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("{}: failed to open DICOM file ({message})", path.display())]
    Open { path: PathBuf, message: String },

    #[error("{}: failed to decode pixel data ({message})", path.display())]
    Decode { path: PathBuf, message: String },

    #[error("{}: missing required attribute {name}", path.display())]
    MissingAttribute { path: PathBuf, name: &'static str },

    #[error("{}: unsupported photometric interpretation `{interpretation}`", path.display())]
    UnsupportedPhotometric {
        path: PathBuf,
        interpretation: String,
    },

    #[error("{}: {source}", path.display())]
    InvalidFrame {
        path: PathBuf,
        #[source]
        source: FrameError,
    },

    #[error("no readable DICOM files in selection")]
    EmptySeries,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
