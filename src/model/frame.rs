use crate::error::{CalibrationError, FrameError};

/// Whether increasing intensity brightens (`Normal`, MONOCHROME2) or darkens
/// (`Inverted`, MONOCHROME1) the displayed pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    #[default]
    Normal,
    Inverted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rescale {
    pub slope: f64,
    pub intercept: f64,
}

impl Rescale {
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    #[inline]
    pub fn apply(&self, raw: f64) -> f64 {
        raw * self.slope + self.intercept
    }
}

impl Default for Rescale {
    fn default() -> Self {
        Self::new(1.0, 0.0)
    }
}

/// Window center and width, in calibrated intensity units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowLevel {
    pub center: f64,
    pub width: f64,
}

impl WindowLevel {
    pub const DEFAULT: WindowLevel = WindowLevel {
        center: 40.0,
        width: 400.0,
    };

    pub fn new(center: f64, width: f64) -> Self {
        Self { center, width }
    }

    /// A window that can be applied without dividing by zero.
    pub fn is_usable(&self) -> bool {
        self.center.is_finite() && self.width.is_finite() && self.width > 0.0
    }

    pub fn lower(&self) -> f64 {
        self.center - self.width / 2.0
    }

    pub fn upper(&self) -> f64 {
        self.center + self.width / 2.0
    }
}

impl Default for WindowLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A single decoded grayscale slice.
///
/// The sample buffer is owned and never modified after construction, so any
/// number of windows can be rendered from it without re-decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFrame {
    id: String,
    instance_number: Option<i32>,
    width: u32,
    height: u32,
    bits_allocated: u16,
    bits_stored: u16,
    polarity: Polarity,
    rescale: Rescale,
    default_window: WindowLevel,
    samples: Vec<u8>,
}

impl ImageFrame {
    /// Validate and wrap a raw sample buffer.
    ///
    /// 16-bit samples are expected little-endian. Rescale defaults to identity
    /// and the default window to 40/400; see [`with_rescale`](Self::with_rescale)
    /// and [`with_default_window`](Self::with_default_window).
    pub fn new(
        id: impl Into<String>,
        width: u32,
        height: u32,
        bits_allocated: u16,
        bits_stored: u16,
        polarity: Polarity,
        samples: Vec<u8>,
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::ZeroDimension { width, height });
        }
        if !matches!(bits_allocated, 8 | 16) {
            return Err(FrameError::UnsupportedBitsAllocated(bits_allocated));
        }
        if bits_stored == 0 || bits_stored > bits_allocated {
            return Err(FrameError::InvalidBitsStored {
                stored: bits_stored,
                allocated: bits_allocated,
            });
        }

        let bytes_per_sample = usize::from(bits_allocated).div_ceil(8);
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|count| count.checked_mul(bytes_per_sample))
            .unwrap_or(usize::MAX);
        if samples.len() < expected {
            return Err(FrameError::UndersizedBuffer {
                expected,
                actual: samples.len(),
            });
        }

        Ok(Self {
            id: id.into(),
            instance_number: None,
            width,
            height,
            bits_allocated,
            bits_stored,
            polarity,
            rescale: Rescale::default(),
            default_window: WindowLevel::DEFAULT,
            samples,
        })
    }

    pub fn with_rescale(mut self, rescale: Rescale) -> Self {
        self.rescale = rescale;
        self
    }

    pub fn with_default_window(mut self, window: WindowLevel) -> Self {
        self.default_window = window;
        self
    }

    pub fn with_instance_number(mut self, instance_number: Option<i32>) -> Self {
        self.instance_number = instance_number;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn instance_number(&self) -> Option<i32> {
        self.instance_number
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bits_allocated(&self) -> u16 {
        self.bits_allocated
    }

    pub fn bits_stored(&self) -> u16 {
        self.bits_stored
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn rescale(&self) -> Rescale {
        self.rescale
    }

    pub fn default_window(&self) -> WindowLevel {
        self.default_window
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Raw stored value of the sample at linear offset `index`.
    ///
    /// `index` must be below [`pixel_count`](Self::pixel_count); the buffer
    /// length invariant makes the slice access in range.
    #[inline]
    pub(crate) fn raw_at(&self, index: usize) -> u16 {
        match self.bits_allocated {
            8 => u16::from(self.samples[index]),
            _ => {
                let offset = index * 2;
                u16::from_le_bytes([self.samples[offset], self.samples[offset + 1]])
            }
        }
    }

    /// Calibrated intensity of the pixel at `(x, y)`.
    pub fn calibrate(&self, x: u32, y: u32) -> Result<f64, CalibrationError> {
        if x >= self.width || y >= self.height {
            return Err(CalibrationError::IndexOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let index = y as usize * self.width as usize + x as usize;
        Ok(self.rescale.apply(f64::from(self.raw_at(index))))
    }

    /// Calibrated intensities of every pixel, row-major.
    pub fn intensities(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.pixel_count()).map(move |index| self.rescale.apply(f64::from(self.raw_at(index))))
    }
}
