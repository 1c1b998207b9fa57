//! Window/level rendering of calibrated frames into 8-bit rasters.

use crate::model::{ImageFrame, Polarity, WindowLevel};

/// One 8-bit luminance value per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    luminance: Vec<u8>,
}

impl Raster {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn luminance(&self) -> &[u8] {
        &self.luminance
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.luminance
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Opaque RGBA expansion for display surfaces.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.luminance.len() * 4);
        for &gray in &self.luminance {
            rgba.extend_from_slice(&[gray, gray, gray, 255]);
        }
        rgba
    }

    pub fn into_luminance(self) -> Vec<u8> {
        self.luminance
    }
}

pub struct WindowLevelRenderer;

impl WindowLevelRenderer {
    /// Render `frame` through the window `center`/`width`.
    ///
    /// The raw samples are re-calibrated on every call, so the result depends
    /// only on the frame and the window and repeated calls are byte-identical.
    pub fn render(frame: &ImageFrame, center: f64, width: f64) -> Raster {
        let mut luminance = Vec::with_capacity(frame.pixel_count());
        Self::render_into(frame, center, width, &mut luminance);
        Raster {
            width: frame.width(),
            height: frame.height(),
            luminance,
        }
    }

    /// Like [`render`](Self::render), writing into a caller-owned buffer that
    /// is cleared first.
    pub fn render_into(frame: &ImageFrame, center: f64, width: f64, out: &mut Vec<u8>) {
        let window = effective_window(WindowLevel::new(center, width));
        let polarity = frame.polarity();

        out.clear();
        out.reserve(frame.pixel_count());
        out.extend(
            frame
                .intensities()
                .map(|intensity| Self::display_value(intensity, window, polarity)),
        );
    }

    /// Map one calibrated intensity to its display value.
    ///
    /// `window` must be usable (see [`WindowLevel::is_usable`]).
    #[inline]
    pub fn display_value(intensity: f64, window: WindowLevel, polarity: Polarity) -> u8 {
        let lo = window.lower();
        let hi = window.upper();

        let value = if intensity <= lo {
            0
        } else if intensity >= hi {
            255
        } else {
            (255.0 * (intensity - lo) / window.width)
                .round()
                .clamp(0.0, 255.0) as u8
        };

        match polarity {
            Polarity::Normal => value,
            Polarity::Inverted => 255 - value,
        }
    }
}

/// Substitute the default window for a degenerate one.
pub fn effective_window(window: WindowLevel) -> WindowLevel {
    if window.is_usable() {
        window
    } else {
        log::debug!(
            "Degenerate window {}/{}, falling back to {}/{}",
            window.center,
            window.width,
            WindowLevel::DEFAULT.center,
            WindowLevel::DEFAULT.width
        );
        WindowLevel::DEFAULT
    }
}
