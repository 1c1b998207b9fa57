//! Pointer, wheel and key handling for the image view.
//!
//! [`GestureController`] turns raw input into [`ViewCommand`]s. It never
//! touches view parameters itself; the caller applies the command to its
//! [`ViewerState`](crate::viewer::ViewerState).

use crate::config::{GestureConfig, ZoomConfig, ZoomModifier};
use crate::transform::{Point, Vector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub control: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        control: false,
        shift: false,
        alt: false,
    };

    pub const CONTROL: Modifiers = Modifiers {
        control: true,
        shift: false,
        alt: false,
    };

    fn holds(&self, modifier: ZoomModifier) -> bool {
        match modifier {
            ZoomModifier::Control => self.control,
            ZoomModifier::Shift => self.shift,
            ZoomModifier::Alt => self.alt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown {
        position: Point,
        button: PointerButton,
    },
    PointerMove {
        position: Point,
    },
    PointerUp {
        position: Point,
    },
    Wheel {
        position: Point,
        delta_y: f64,
        modifiers: Modifiers,
    },
    KeyPress(Key),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewCommand {
    AdjustWindow { delta_center: f64, delta_width: f64 },
    Pan(Vector),
    Zoom { pivot: Point, factor: f64 },
    PreviousSlice,
    NextSlice,
    ResetView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureMode {
    #[default]
    Idle,
    Windowing,
    Panning,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InteractionState {
    pub mode: GestureMode,
    pub last_position: Option<Point>,
}

#[derive(Debug, Clone)]
pub struct GestureController {
    state: InteractionState,
    center_sensitivity: f64,
    width_sensitivity: f64,
    zoom_modifier: ZoomModifier,
    wheel_zoom_in: f64,
    wheel_zoom_out: f64,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(&GestureConfig::default(), &ZoomConfig::default())
    }
}

impl GestureController {
    pub fn new(gesture: &GestureConfig, zoom: &ZoomConfig) -> Self {
        Self {
            state: InteractionState::default(),
            center_sensitivity: gesture.center_sensitivity,
            width_sensitivity: gesture.width_sensitivity,
            zoom_modifier: gesture.zoom_modifier,
            wheel_zoom_in: zoom.wheel_in,
            wheel_zoom_out: zoom.wheel_out,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn mode(&self) -> GestureMode {
        self.state.mode
    }

    /// Feed one event. Events that mean nothing in the current mode are
    /// dropped without changing state.
    pub fn handle(&mut self, event: InputEvent) -> Option<ViewCommand> {
        match (self.state.mode, event) {
            (_, InputEvent::KeyPress(key)) => Self::key_command(key),

            (GestureMode::Idle, InputEvent::PointerDown { position, button }) => {
                let mode = match button {
                    PointerButton::Primary => GestureMode::Windowing,
                    PointerButton::Secondary | PointerButton::Middle => GestureMode::Panning,
                    PointerButton::Other => return None,
                };
                self.begin(mode, position);
                None
            }

            (GestureMode::Windowing, InputEvent::PointerMove { position }) => {
                let delta = self.advance(position)?;
                Some(ViewCommand::AdjustWindow {
                    delta_center: delta.x * self.center_sensitivity,
                    delta_width: delta.y * self.width_sensitivity,
                })
            }

            (GestureMode::Panning, InputEvent::PointerMove { position }) => {
                self.advance(position).map(ViewCommand::Pan)
            }

            (GestureMode::Windowing | GestureMode::Panning, InputEvent::PointerUp { .. }) => {
                log::trace!("Gesture {:?} finished", self.state.mode);
                self.state = InteractionState::default();
                None
            }

            (
                GestureMode::Idle,
                InputEvent::Wheel {
                    position,
                    delta_y,
                    modifiers,
                },
            ) => self.wheel_command(position, delta_y, modifiers),

            (mode, event) => {
                log::trace!("Ignoring {event:?} while {mode:?}");
                None
            }
        }
    }

    fn begin(&mut self, mode: GestureMode, position: Point) {
        log::trace!("Gesture {mode:?} started at ({}, {})", position.x, position.y);
        self.state = InteractionState {
            mode,
            last_position: Some(position),
        };
    }

    /// Displacement since the last captured position, capturing the new one.
    fn advance(&mut self, position: Point) -> Option<Vector> {
        let previous = self.state.last_position.replace(position)?;
        Some(Vector::between(previous, position))
    }

    fn wheel_command(&self, position: Point, delta_y: f64, modifiers: Modifiers) -> Option<ViewCommand> {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return None;
        }
        if modifiers.holds(self.zoom_modifier) {
            let factor = if delta_y > 0.0 {
                self.wheel_zoom_in
            } else {
                self.wheel_zoom_out
            };
            return Some(ViewCommand::Zoom {
                pivot: position,
                factor,
            });
        }
        Some(if delta_y > 0.0 {
            ViewCommand::PreviousSlice
        } else {
            ViewCommand::NextSlice
        })
    }

    fn key_command(key: Key) -> Option<ViewCommand> {
        match key {
            Key::ArrowLeft => Some(ViewCommand::PreviousSlice),
            Key::ArrowRight => Some(ViewCommand::NextSlice),
            Key::Char('r' | 'R') => Some(ViewCommand::ResetView),
            Key::Char(_) | Key::Other => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(x: f64, y: f64, button: PointerButton) -> InputEvent {
        InputEvent::PointerDown {
            position: Point::new(x, y),
            button,
        }
    }

    fn moved(x: f64, y: f64) -> InputEvent {
        InputEvent::PointerMove {
            position: Point::new(x, y),
        }
    }

    fn up(x: f64, y: f64) -> InputEvent {
        InputEvent::PointerUp {
            position: Point::new(x, y),
        }
    }

    fn wheel(delta_y: f64, modifiers: Modifiers) -> InputEvent {
        InputEvent::Wheel {
            position: Point::new(30.0, 40.0),
            delta_y,
            modifiers,
        }
    }

    #[test]
    fn primary_drag_emits_window_deltas() {
        let mut controller = GestureController::default();

        assert_eq!(controller.handle(down(10.0, 10.0, PointerButton::Primary)), None);
        assert_eq!(controller.mode(), GestureMode::Windowing);
        assert_eq!(
            controller.handle(moved(12.0, 14.0)),
            Some(ViewCommand::AdjustWindow {
                delta_center: 4.0,
                delta_width: 8.0
            })
        );
        assert_eq!(
            controller.handle(moved(11.0, 14.0)),
            Some(ViewCommand::AdjustWindow {
                delta_center: -2.0,
                delta_width: 0.0
            })
        );
        assert_eq!(controller.handle(up(11.0, 14.0)), None);
        assert_eq!(controller.state(), InteractionState::default());
    }

    #[test]
    fn secondary_and_middle_buttons_pan() {
        for button in [PointerButton::Secondary, PointerButton::Middle] {
            let mut controller = GestureController::default();
            controller.handle(down(0.0, 0.0, button));
            assert_eq!(controller.mode(), GestureMode::Panning);
            assert_eq!(
                controller.handle(moved(3.0, -4.0)),
                Some(ViewCommand::Pan(Vector::new(3.0, -4.0)))
            );
        }
    }

    #[test]
    fn move_without_button_is_ignored() {
        let mut controller = GestureController::default();
        assert_eq!(controller.handle(moved(5.0, 5.0)), None);
        assert_eq!(controller.handle(up(5.0, 5.0)), None);
        assert_eq!(controller.state(), InteractionState::default());
    }

    #[test]
    fn second_button_during_drag_is_ignored() {
        let mut controller = GestureController::default();
        controller.handle(down(1.0, 1.0, PointerButton::Primary));
        controller.handle(down(9.0, 9.0, PointerButton::Middle));

        assert_eq!(controller.mode(), GestureMode::Windowing);
        assert_eq!(controller.state().last_position, Some(Point::new(1.0, 1.0)));
    }

    #[test]
    fn unknown_button_stays_idle() {
        let mut controller = GestureController::default();
        controller.handle(down(1.0, 1.0, PointerButton::Other));
        assert_eq!(controller.mode(), GestureMode::Idle);
    }

    #[test]
    fn wheel_with_modifier_zooms_at_pointer() {
        let mut controller = GestureController::default();
        assert_eq!(
            controller.handle(wheel(1.0, Modifiers::CONTROL)),
            Some(ViewCommand::Zoom {
                pivot: Point::new(30.0, 40.0),
                factor: 1.1
            })
        );
        assert_eq!(
            controller.handle(wheel(-3.0, Modifiers::CONTROL)),
            Some(ViewCommand::Zoom {
                pivot: Point::new(30.0, 40.0),
                factor: 0.9
            })
        );
    }

    #[test]
    fn plain_wheel_navigates_slices() {
        let mut controller = GestureController::default();
        assert_eq!(
            controller.handle(wheel(1.0, Modifiers::NONE)),
            Some(ViewCommand::PreviousSlice)
        );
        assert_eq!(
            controller.handle(wheel(-1.0, Modifiers::NONE)),
            Some(ViewCommand::NextSlice)
        );
        assert_eq!(controller.handle(wheel(0.0, Modifiers::NONE)), None);
    }

    #[test]
    fn wheel_during_drag_is_ignored() {
        let mut controller = GestureController::default();
        controller.handle(down(0.0, 0.0, PointerButton::Middle));
        assert_eq!(controller.handle(wheel(1.0, Modifiers::CONTROL)), None);
        assert_eq!(controller.mode(), GestureMode::Panning);
    }

    #[test]
    fn configured_modifier_selects_zoom() {
        let gesture = GestureConfig {
            zoom_modifier: ZoomModifier::Shift,
            ..GestureConfig::default()
        };
        let mut controller = GestureController::new(&gesture, &ZoomConfig::default());
        let shift = Modifiers {
            shift: true,
            ..Modifiers::NONE
        };

        assert!(matches!(
            controller.handle(wheel(1.0, shift)),
            Some(ViewCommand::Zoom { .. })
        ));
        assert_eq!(
            controller.handle(wheel(1.0, Modifiers::CONTROL)),
            Some(ViewCommand::PreviousSlice)
        );
    }

    #[test]
    fn keys_map_to_fixed_bindings() {
        let mut controller = GestureController::default();
        assert_eq!(
            controller.handle(InputEvent::KeyPress(Key::ArrowLeft)),
            Some(ViewCommand::PreviousSlice)
        );
        assert_eq!(
            controller.handle(InputEvent::KeyPress(Key::ArrowRight)),
            Some(ViewCommand::NextSlice)
        );
        assert_eq!(
            controller.handle(InputEvent::KeyPress(Key::Char('R'))),
            Some(ViewCommand::ResetView)
        );
        assert_eq!(controller.handle(InputEvent::KeyPress(Key::Char('q'))), None);
        assert_eq!(controller.handle(InputEvent::KeyPress(Key::Other)), None);
    }
}
