//! View parameters and the state the host drives its render loop from.
//!
//! Every mutation reports a [`Refresh`] telling the host what to redo. The
//! host renders with [`ViewerState::render_current`] when the raster is stale
//! and recomposites with [`ViewerState::transform`] when only the view moved.

use crate::config::{ViewerConfig, WindowConfig, ZoomConfig};
use crate::gesture::ViewCommand;
use crate::image_pipeline::{Raster, WindowLevelRenderer};
use crate::model::{ImageFrame, SeriesStack, WindowLevel};
use crate::transform::{Affine, Point, Size, Vector, ViewTransformEngine};

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Refresh {
    Unchanged,
    /// Only the transform changed; the current raster is still valid.
    Transform,
    Raster,
}

impl Refresh {
    pub fn merge(self, other: Refresh) -> Refresh {
        self.max(other)
    }

    pub fn needs_render(self) -> bool {
        self == Refresh::Raster
    }
}

/// Window, zoom and transform with their clamping rules built in.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewParameters {
    window: WindowLevel,
    zoom: f64,
    transform: Affine,
    window_limits: WindowConfig,
    zoom_limits: ZoomConfig,
}

impl ViewParameters {
    pub fn new(window_limits: WindowConfig, zoom_limits: ZoomConfig) -> Self {
        let mut params = Self {
            window: WindowLevel::DEFAULT,
            zoom: 1.0,
            transform: Affine::IDENTITY,
            window_limits,
            zoom_limits,
        };
        params.window = params.sanitize_window(WindowLevel::new(
            window_limits.default_center,
            window_limits.default_width,
        ));
        params
    }

    pub fn window(&self) -> WindowLevel {
        self.window
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// Clamp `window` into the configured limits. Degenerate windows (width
    /// <= 0 or non-finite values) become the configured default instead.
    pub fn sanitize_window(&self, window: WindowLevel) -> WindowLevel {
        let limits = &self.window_limits;
        let window = if window.is_usable() {
            window
        } else {
            log::debug!(
                "Degenerate window {}/{}, using default {}/{}",
                window.center,
                window.width,
                limits.default_center,
                limits.default_width
            );
            WindowLevel::new(limits.default_center, limits.default_width)
        };
        WindowLevel::new(
            window.center.clamp(limits.center_min, limits.center_max),
            window.width.clamp(limits.width_min, limits.width_max),
        )
    }

    pub fn set_window(&mut self, center: f64, width: f64) -> Refresh {
        let window = self.sanitize_window(WindowLevel::new(center, width));
        if window == self.window {
            return Refresh::Unchanged;
        }
        self.window = window;
        Refresh::Raster
    }

    /// Shift the window by a gesture delta. The result is clamped into the
    /// limits; a width driven to zero or below stops at the minimum width.
    pub fn adjust_window(&mut self, delta_center: f64, delta_width: f64) -> Refresh {
        if !(delta_center.is_finite() && delta_width.is_finite()) {
            log::debug!("Ignoring window delta {delta_center}/{delta_width}");
            return Refresh::Unchanged;
        }
        let limits = &self.window_limits;
        let window = WindowLevel::new(
            (self.window.center + delta_center).clamp(limits.center_min, limits.center_max),
            (self.window.width + delta_width).clamp(limits.width_min, limits.width_max),
        );
        if window == self.window {
            return Refresh::Unchanged;
        }
        self.window = window;
        Refresh::Raster
    }

    /// Zoom about `pivot` (image space). The factor is reduced when the zoom
    /// limits would be crossed so that the scalar and the transform agree.
    pub fn zoom_at(&mut self, pivot: Point, factor: f64) -> Refresh {
        if !(factor.is_finite() && factor > 0.0) {
            log::debug!("Ignoring zoom factor {factor}");
            return Refresh::Unchanged;
        }
        let target = (self.zoom * factor).clamp(self.zoom_limits.min, self.zoom_limits.max);
        let applied = target / self.zoom;
        if applied == 1.0 {
            return Refresh::Unchanged;
        }
        match ViewTransformEngine::zoom(pivot, applied, self.transform) {
            Ok(transform) => {
                self.transform = transform;
                self.zoom = target;
                Refresh::Transform
            }
            Err(err) => {
                log::debug!("{err}");
                Refresh::Unchanged
            }
        }
    }

    pub fn pan_by(&mut self, delta: Vector) -> Refresh {
        if delta.x == 0.0 && delta.y == 0.0 {
            return Refresh::Unchanged;
        }
        self.transform = ViewTransformEngine::pan(delta, self.transform);
        Refresh::Transform
    }

    /// Replace the transform with a fit of `image` into `viewport`, with the
    /// fitted scale clamped to the zoom limits.
    pub fn fit(&mut self, image: Size, viewport: Size) -> Refresh {
        let fitted = ViewTransformEngine::fit_to_window(image, viewport);
        let scale = fitted.m11;
        let (transform, zoom) = if scale.is_finite() && scale > 0.0 {
            let zoom = scale.clamp(self.zoom_limits.min, self.zoom_limits.max);
            (Affine::uniform_scale(zoom), zoom)
        } else {
            (Affine::IDENTITY, 1.0)
        };
        self.replace_view(transform, zoom)
    }

    pub fn reset_view(&mut self) -> Refresh {
        self.replace_view(ViewTransformEngine::reset(), 1.0)
    }

    fn replace_view(&mut self, transform: Affine, zoom: f64) -> Refresh {
        if transform == self.transform && zoom == self.zoom {
            return Refresh::Unchanged;
        }
        self.transform = transform;
        self.zoom = zoom;
        Refresh::Transform
    }
}

/// Everything the viewer shows, owned by the host's update loop.
#[derive(Debug, Clone)]
pub struct ViewerState {
    config: ViewerConfig,
    series: Option<SeriesStack>,
    params: ViewParameters,
    viewport: Option<Size>,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl ViewerState {
    pub fn new(config: ViewerConfig) -> Self {
        let params = ViewParameters::new(config.window, config.zoom);
        Self {
            config,
            series: None,
            params,
            viewport: None,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn series(&self) -> Option<&SeriesStack> {
        self.series.as_ref()
    }

    pub fn current_frame(&self) -> Option<&ImageFrame> {
        self.series.as_ref().map(SeriesStack::current)
    }

    pub fn params(&self) -> &ViewParameters {
        &self.params
    }

    pub fn window(&self) -> WindowLevel {
        self.params.window()
    }

    pub fn zoom(&self) -> f64 {
        self.params.zoom()
    }

    pub fn transform(&self) -> Affine {
        self.params.transform()
    }

    pub fn viewport(&self) -> Option<Size> {
        self.viewport
    }

    /// Swap in a freshly loaded series and reset the view to its first frame.
    pub fn adopt_series(&mut self, series: SeriesStack) -> Refresh {
        let mut params = ViewParameters::new(self.config.window, self.config.zoom);
        let window = series.current().default_window();
        let _ = params.set_window(window.center, window.width);

        log::info!(
            "Showing series of {} slice(s), window {}/{}",
            series.len(),
            params.window().center,
            params.window().width
        );
        self.params = params;
        self.series = Some(series);
        Refresh::Raster
    }

    pub fn clear(&mut self) -> Refresh {
        self.series = None;
        self.params = ViewParameters::new(self.config.window, self.config.zoom);
        Refresh::Raster
    }

    pub fn apply(&mut self, command: ViewCommand) -> Refresh {
        match command {
            ViewCommand::AdjustWindow {
                delta_center,
                delta_width,
            } => self.adjust_window(delta_center, delta_width),
            ViewCommand::Pan(delta) => self.pan_by(delta),
            ViewCommand::Zoom { pivot, factor } => self.zoom_at(pivot, factor),
            ViewCommand::PreviousSlice => self.previous_slice(),
            ViewCommand::NextSlice => self.next_slice(),
            ViewCommand::ResetView => self.reset_view(),
        }
    }

    pub fn set_window(&mut self, center: f64, width: f64) -> Refresh {
        if self.series.is_none() {
            return Refresh::Unchanged;
        }
        self.params.set_window(center, width)
    }

    pub fn adjust_window(&mut self, delta_center: f64, delta_width: f64) -> Refresh {
        if self.series.is_none() {
            return Refresh::Unchanged;
        }
        self.params.adjust_window(delta_center, delta_width)
    }

    pub fn zoom_at(&mut self, pivot: Point, factor: f64) -> Refresh {
        if self.series.is_none() {
            return Refresh::Unchanged;
        }
        self.params.zoom_at(pivot, factor)
    }

    pub fn zoom_in(&mut self) -> Refresh {
        self.zoom_about_center(self.config.zoom.step_in)
    }

    pub fn zoom_out(&mut self) -> Refresh {
        self.zoom_about_center(self.config.zoom.step_out)
    }

    fn zoom_about_center(&mut self, factor: f64) -> Refresh {
        let Some(frame) = self.current_frame() else {
            return Refresh::Unchanged;
        };
        let center = Point::new(
            f64::from(frame.width()) / 2.0,
            f64::from(frame.height()) / 2.0,
        );
        self.params.zoom_at(center, factor)
    }

    pub fn pan_by(&mut self, delta: Vector) -> Refresh {
        if self.series.is_none() {
            return Refresh::Unchanged;
        }
        self.params.pan_by(delta)
    }

    pub fn set_viewport(&mut self, viewport: Size) -> Refresh {
        self.viewport = Some(viewport);
        Refresh::Unchanged
    }

    /// Fit the current frame into the last reported viewport.
    pub fn fit_to_window(&mut self) -> Refresh {
        let (Some(frame), Some(viewport)) = (self.current_frame(), self.viewport) else {
            return Refresh::Unchanged;
        };
        let image = Size::new(f64::from(frame.width()), f64::from(frame.height()));
        self.params.fit(image, viewport)
    }

    pub fn reset_view(&mut self) -> Refresh {
        self.params.reset_view()
    }

    pub fn next_slice(&mut self) -> Refresh {
        self.navigate(SeriesStack::next_slice)
    }

    pub fn previous_slice(&mut self) -> Refresh {
        self.navigate(SeriesStack::previous_slice)
    }

    pub fn select_slice(&mut self, index: usize) -> Refresh {
        self.navigate(|series| series.select(index))
    }

    fn navigate(&mut self, step: impl FnOnce(&mut SeriesStack) -> bool) -> Refresh {
        let Some(series) = self.series.as_mut() else {
            return Refresh::Unchanged;
        };
        if !step(series) {
            return Refresh::Unchanged;
        }
        log::debug!("Slice {}/{}", series.current_index() + 1, series.len());
        Refresh::Raster
    }

    /// Render the current slice with the current window.
    pub fn render_current(&self) -> Option<Raster> {
        let frame = self.current_frame()?;
        let window = self.params.window();
        Some(WindowLevelRenderer::render(frame, window.center, window.width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Polarity;

    fn frame(id: &str, instance: i32, window: WindowLevel) -> ImageFrame {
        ImageFrame::new(id, 4, 2, 8, 8, Polarity::Normal, (0..8).collect())
            .unwrap()
            .with_instance_number(Some(instance))
            .with_default_window(window)
    }

    fn loaded_state() -> ViewerState {
        let mut state = ViewerState::default();
        let series = SeriesStack::new(vec![
            frame("a", 1, WindowLevel::new(50.0, 350.0)),
            frame("b", 2, WindowLevel::new(60.0, 200.0)),
        ])
        .unwrap();
        assert_eq!(state.adopt_series(series), Refresh::Raster);
        state
    }

    fn params() -> ViewParameters {
        ViewParameters::new(WindowConfig::default(), ZoomConfig::default())
    }

    #[test]
    fn window_is_clamped_on_every_path() {
        let mut params = params();
        assert_eq!(params.set_window(5000.0, 9000.0), Refresh::Raster);
        assert_eq!(params.window(), WindowLevel::new(3000.0, 4000.0));

        let _ = params.adjust_window(-10_000.0, -3999.5);
        assert_eq!(params.window(), WindowLevel::new(-1024.0, 1.0));
    }

    #[test]
    fn narrowing_drag_stops_at_minimum_width() {
        let mut params = params();
        let _ = params.set_window(500.0, 10.0);
        assert_eq!(params.adjust_window(0.0, -20.0), Refresh::Raster);
        assert_eq!(params.window(), WindowLevel::new(500.0, 1.0));

        assert_eq!(params.adjust_window(0.0, -5.0), Refresh::Unchanged);
        assert_eq!(params.adjust_window(f64::NAN, 1.0), Refresh::Unchanged);
        assert_eq!(params.window(), WindowLevel::new(500.0, 1.0));
    }

    #[test]
    fn degenerate_width_falls_back_to_default() {
        let mut params = params();
        let _ = params.set_window(700.0, 900.0);
        assert_eq!(params.set_window(100.0, 0.0), Refresh::Raster);
        assert_eq!(params.window(), WindowLevel::new(40.0, 400.0));
        assert_eq!(params.set_window(f64::NAN, 300.0), Refresh::Unchanged);
    }

    #[test]
    fn unchanged_window_needs_no_render() {
        let mut params = params();
        assert_eq!(params.set_window(40.0, 400.0), Refresh::Unchanged);
        assert_eq!(params.adjust_window(0.0, 0.0), Refresh::Unchanged);
    }

    #[test]
    fn zoom_scalar_tracks_transform_within_limits() {
        let mut params = params();
        assert_eq!(params.zoom_at(Point::ORIGIN, 10.0), Refresh::Transform);
        assert_eq!(params.zoom_at(Point::ORIGIN, 10.0), Refresh::Transform);
        assert_eq!(params.zoom(), 50.0);
        assert!((params.transform().m11 - 50.0).abs() < 1e-9);

        assert_eq!(params.zoom_at(Point::ORIGIN, 2.0), Refresh::Unchanged);
        assert_eq!(params.zoom_at(Point::ORIGIN, 0.0), Refresh::Unchanged);
    }

    #[test]
    fn fit_clamps_scale_to_zoom_limits() {
        let mut params = params();
        assert_eq!(
            params.fit(Size::new(10.0, 10.0), Size::new(1000.0, 1000.0)),
            Refresh::Transform
        );
        assert_eq!(params.zoom(), 50.0);
        assert_eq!(params.transform(), Affine::uniform_scale(50.0));

        let _ = params.fit(Size::new(0.0, 10.0), Size::new(1000.0, 1000.0));
        assert!(params.transform().is_identity());
        assert_eq!(params.zoom(), 1.0);
    }

    #[test]
    fn adopting_series_uses_first_frame_window() {
        let state = loaded_state();
        assert_eq!(state.window(), WindowLevel::new(50.0, 350.0));
        assert_eq!(state.zoom(), 1.0);
        assert!(state.transform().is_identity());
        assert_eq!(state.series().unwrap().current_index(), 0);
    }

    #[test]
    fn adopting_series_resets_previous_view() {
        let mut state = loaded_state();
        let _ = state.zoom_in();
        let _ = state.pan_by(Vector::new(4.0, 4.0));
        let _ = state.set_window(300.0, 30.0);
        let _ = state.next_slice();

        let series = SeriesStack::new(vec![frame("c", 1, WindowLevel::new(10.0, 0.0))]).unwrap();
        let _ = state.adopt_series(series);

        assert_eq!(state.window(), WindowLevel::new(40.0, 400.0));
        assert!(state.transform().is_identity());
        assert_eq!(state.series().unwrap().current_index(), 0);
    }

    #[test]
    fn slice_navigation_is_clamped() {
        let mut state = loaded_state();
        assert_eq!(state.previous_slice(), Refresh::Unchanged);
        assert_eq!(state.next_slice(), Refresh::Raster);
        assert_eq!(state.next_slice(), Refresh::Unchanged);
        assert_eq!(state.current_frame().unwrap().id(), "b");
        assert_eq!(state.select_slice(0), Refresh::Raster);
        assert_eq!(state.select_slice(10), Refresh::Raster);
        assert_eq!(state.series().unwrap().current_index(), 1);
    }

    #[test]
    fn slice_change_keeps_window() {
        let mut state = loaded_state();
        let _ = state.next_slice();
        assert_eq!(state.window(), WindowLevel::new(50.0, 350.0));
    }

    #[test]
    fn commands_without_series_do_nothing() {
        let mut state = ViewerState::default();
        assert_eq!(state.apply(ViewCommand::NextSlice), Refresh::Unchanged);
        assert_eq!(
            state.apply(ViewCommand::AdjustWindow {
                delta_center: 1.0,
                delta_width: 1.0
            }),
            Refresh::Unchanged
        );
        assert_eq!(state.apply(ViewCommand::Pan(Vector::new(1.0, 0.0))), Refresh::Unchanged);
        assert_eq!(state.zoom_in(), Refresh::Unchanged);
        assert!(state.render_current().is_none());
    }

    #[test]
    fn button_zoom_pivots_on_image_center() {
        let mut state = loaded_state();
        assert_eq!(state.zoom_in(), Refresh::Transform);
        let center = state.transform().transform_point(Point::new(2.0, 1.0));
        assert!((center.x - 2.0).abs() < 1e-9 && (center.y - 1.0).abs() < 1e-9);
        assert!((state.zoom() - 1.2).abs() < 1e-12);
    }

    #[test]
    fn fit_needs_a_viewport() {
        let mut state = loaded_state();
        assert_eq!(state.fit_to_window(), Refresh::Unchanged);
        let _ = state.set_viewport(Size::new(400.0, 100.0));
        assert_eq!(state.fit_to_window(), Refresh::Transform);
        assert_eq!(state.transform(), Affine::uniform_scale(50.0));
    }

    #[test]
    fn reset_restores_identity() {
        let mut state = loaded_state();
        let _ = state.apply(ViewCommand::Zoom {
            pivot: Point::new(1.0, 1.0),
            factor: 1.1,
        });
        assert_eq!(state.apply(ViewCommand::ResetView), Refresh::Transform);
        assert!(state.transform().is_identity());
        assert_eq!(state.zoom(), 1.0);
        assert_eq!(state.apply(ViewCommand::ResetView), Refresh::Unchanged);
    }

    #[test]
    fn render_is_repeatable() {
        let state = loaded_state();
        assert_eq!(state.render_current(), state.render_current());
    }

    #[test]
    fn refresh_merge_keeps_strongest() {
        assert_eq!(Refresh::Transform.merge(Refresh::Raster), Refresh::Raster);
        assert_eq!(Refresh::Unchanged.merge(Refresh::Transform), Refresh::Transform);
        assert!(!Refresh::Transform.needs_render());
    }
}
