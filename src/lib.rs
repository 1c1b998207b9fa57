//! Grayscale DICOM viewing core: calibration, window/level rendering, view
//! transforms and gesture handling, plus the loader that feeds them.

pub mod config;
pub mod error;
pub mod gesture;
pub mod image_pipeline;
pub mod model;
pub mod transform;
pub mod utils;
pub mod viewer;

pub use config::ViewerConfig;
pub use error::{CalibrationError, ConfigError, FrameError, LoadError, TransformError};
pub use gesture::{GestureController, GestureMode, InputEvent, ViewCommand};
pub use image_pipeline::{Raster, WindowLevelRenderer};
pub use model::{ImageFrame, Polarity, Rescale, SeriesStack, WindowLevel};
pub use transform::{Affine, ViewTransformEngine};
pub use viewer::{Refresh, ViewParameters, ViewerState};
