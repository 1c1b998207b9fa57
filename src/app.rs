use std::path::PathBuf;

use dicomscope::config::ViewerConfig;
use dicomscope::gesture::{self, GestureController, InputEvent, Modifiers, PointerButton};
use dicomscope::model::{load_series, StudyContext};
use dicomscope::transform::{Point, Size};
use dicomscope::viewer::{Refresh, ViewerState};
use iced::event::{self, Event};
use iced::keyboard::{self, key};
use iced::widget::image::Handle;
use iced::widget::text::Wrapping;
use iced::widget::{button, column, container, row, text};
use iced::{application, mouse, window, Alignment, Element, Length, Subscription, Task, Theme};
use rfd::AsyncFileDialog;

use crate::message::Message;
use crate::views::{image_panel, metadata_panel, CanvasInput};

const APP_TITLE: &str = "Dicomscope";

pub fn run() -> iced::Result {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .try_init();

    application(APP_TITLE, App::update, App::view)
        .subscription(App::subscription)
        .theme(App::theme)
        .run()
}

pub struct App {
    viewer: ViewerState,
    gestures: GestureController,
    modifiers: keyboard::Modifiers,
    context: Option<StudyContext>,
    image: Option<Handle>,
    status: String,
    last_error: Option<String>,
}

impl Default for App {
    fn default() -> Self {
        let config = ViewerConfig::load();
        Self {
            gestures: GestureController::new(&config.gesture, &config.zoom),
            viewer: ViewerState::new(config),
            modifiers: keyboard::Modifiers::default(),
            context: None,
            image: None,
            status: String::from("Ready"),
            last_error: None,
        }
    }
}

impl App {
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenFile => self.pick(false),
            Message::OpenSeries => self.pick(true),
            Message::SeriesLoaded(None) => {
                self.status = String::from("Ready");
                Task::none()
            }
            Message::SeriesLoaded(Some(Ok(series))) => {
                let slices = series.stack.len();
                let refresh = self.viewer.adopt_series(series.stack);
                self.context = Some(series.context);
                self.last_error = (!series.skipped.is_empty()).then(|| series.skipped.join("\n"));
                self.refresh(refresh);
                self.status = format!("Loaded {slices} slice(s)");
                Task::none()
            }
            Message::SeriesLoaded(Some(Err(err))) => {
                log::error!("{err}");
                self.status = String::from("Failed to load DICOM files");
                self.last_error = Some(err);
                Task::none()
            }
            Message::Canvas { input, viewport } => {
                let _ = self.viewer.set_viewport(Size::new(
                    f64::from(viewport.width),
                    f64::from(viewport.height),
                ));
                let event = self.input_event(input);
                self.dispatch(event);
                Task::none()
            }
            Message::KeyPressed(key) => {
                self.dispatch(InputEvent::KeyPress(map_key(&key)));
                Task::none()
            }
            Message::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers;
                Task::none()
            }
            Message::PreviousSlice => {
                let refresh = self.viewer.previous_slice();
                self.refresh(refresh);
                Task::none()
            }
            Message::NextSlice => {
                let refresh = self.viewer.next_slice();
                self.refresh(refresh);
                Task::none()
            }
            Message::ZoomIn => {
                let refresh = self.viewer.zoom_in();
                self.refresh(refresh);
                Task::none()
            }
            Message::ZoomOut => {
                let refresh = self.viewer.zoom_out();
                self.refresh(refresh);
                Task::none()
            }
            Message::FitToWindow => {
                let refresh = self.viewer.fit_to_window();
                self.refresh(refresh);
                Task::none()
            }
            Message::ResetView => {
                let refresh = self.viewer.reset_view();
                self.refresh(refresh);
                Task::none()
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let loaded = self.viewer.series().is_some();
        let when_loaded = |message: Message| loaded.then_some(message);

        let toolbar = row![
            button("Open File").on_press(Message::OpenFile),
            button("Open Series").on_press(Message::OpenSeries),
            button("Previous").on_press_maybe(when_loaded(Message::PreviousSlice)),
            button("Next").on_press_maybe(when_loaded(Message::NextSlice)),
            button("Zoom In").on_press_maybe(when_loaded(Message::ZoomIn)),
            button("Zoom Out").on_press_maybe(when_loaded(Message::ZoomOut)),
            button("Fit").on_press_maybe(when_loaded(Message::FitToWindow)),
            button("Reset").on_press_maybe(when_loaded(Message::ResetView)),
        ]
        .spacing(8)
        .align_y(Alignment::Center);

        let image_size = self
            .viewer
            .current_frame()
            .map(|frame| iced::Size::new(frame.width() as f32, frame.height() as f32))
            .unwrap_or(iced::Size::ZERO);
        let image = container(image_panel(
            self.image.as_ref(),
            image_size,
            self.viewer.transform(),
        ))
        .width(Length::FillPortion(3))
        .height(Length::Fill);

        let metadata = container(metadata_panel(self.context.as_ref()))
            .padding(16)
            .width(Length::FillPortion(2))
            .height(Length::Fill);

        let mut content = column![
            toolbar,
            row![image, metadata]
                .spacing(16)
                .width(Length::Fill)
                .height(Length::Fill),
            text(self.status_line()).size(14),
        ]
        .spacing(12);

        if let Some(error) = &self.last_error {
            content = content.push(text(error).size(14).wrapping(Wrapping::Word));
        }

        content.padding(20).into()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        event::listen_with(keyboard_message)
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn pick(&mut self, multiple: bool) -> Task<Message> {
        self.status = String::from("Loading DICOM files…");
        Task::perform(
            async move {
                let dialog = AsyncFileDialog::new().set_title(if multiple {
                    "Open DICOM series"
                } else {
                    "Open DICOM file"
                });
                let handles = if multiple {
                    dialog.pick_files().await.unwrap_or_default()
                } else {
                    dialog.pick_file().await.into_iter().collect()
                };
                if handles.is_empty() {
                    return None;
                }
                let paths: Vec<PathBuf> = handles
                    .iter()
                    .map(|handle| handle.path().to_path_buf())
                    .collect();
                Some(load_series(&paths).map_err(|err| err.to_string()))
            },
            Message::SeriesLoaded,
        )
    }

    fn input_event(&self, input: CanvasInput) -> InputEvent {
        let point = |position: iced::Point| Point::new(f64::from(position.x), f64::from(position.y));
        match input {
            CanvasInput::Pressed { position, button } => InputEvent::PointerDown {
                position: point(position),
                button: map_button(button),
            },
            CanvasInput::Moved(position) => InputEvent::PointerMove {
                position: point(position),
            },
            CanvasInput::Released(position) => InputEvent::PointerUp {
                position: point(position),
            },
            // Zoom pivots are expressed in image space.
            CanvasInput::Wheel { position, delta_y } => {
                let position = point(position);
                let pivot = self
                    .viewer
                    .transform()
                    .invert()
                    .map(|inverse| inverse.transform_point(position))
                    .unwrap_or(position);
                InputEvent::Wheel {
                    position: pivot,
                    delta_y: f64::from(delta_y),
                    modifiers: gesture_modifiers(self.modifiers),
                }
            }
        }
    }

    fn dispatch(&mut self, event: InputEvent) {
        if let Some(command) = self.gestures.handle(event) {
            let refresh = self.viewer.apply(command);
            self.refresh(refresh);
        }
    }

    /// Rebuild the displayed image when the raster went stale.
    fn refresh(&mut self, refresh: Refresh) {
        if !refresh.needs_render() {
            return;
        }
        self.image = self.viewer.render_current().map(|raster| {
            Handle::from_rgba(raster.width(), raster.height(), raster.to_rgba())
        });
    }

    fn status_line(&self) -> String {
        let Some(series) = self.viewer.series() else {
            return self.status.clone();
        };
        let window = self.viewer.window();
        format!(
            "{}  |  Slice {}/{}  |  WC {:.0}  WW {:.0}  |  Zoom {:.0}%",
            self.status,
            series.current_index() + 1,
            series.len(),
            window.center,
            window.width,
            self.viewer.zoom() * 100.0
        )
    }
}

fn keyboard_message(event: Event, status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Keyboard(keyboard::Event::ModifiersChanged(modifiers)) => {
            Some(Message::ModifiersChanged(modifiers))
        }
        Event::Keyboard(keyboard::Event::KeyPressed { key, .. })
            if status == event::Status::Ignored =>
        {
            Some(Message::KeyPressed(key))
        }
        _ => None,
    }
}

fn map_key(key: &keyboard::Key) -> gesture::Key {
    match key.as_ref() {
        keyboard::Key::Named(key::Named::ArrowLeft) => gesture::Key::ArrowLeft,
        keyboard::Key::Named(key::Named::ArrowRight) => gesture::Key::ArrowRight,
        keyboard::Key::Character(text) => text
            .chars()
            .next()
            .map(gesture::Key::Char)
            .unwrap_or(gesture::Key::Other),
        _ => gesture::Key::Other,
    }
}

/// `control` is the physical Control key on every platform, not Cmd.
fn gesture_modifiers(modifiers: keyboard::Modifiers) -> Modifiers {
    Modifiers {
        control: modifiers.control(),
        shift: modifiers.shift(),
        alt: modifiers.alt(),
    }
}

fn map_button(button: mouse::Button) -> PointerButton {
    match button {
        mouse::Button::Left => PointerButton::Primary,
        mouse::Button::Right => PointerButton::Secondary,
        mouse::Button::Middle => PointerButton::Middle,
        _ => PointerButton::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_modifier_tracks_physical_control_key() {
        assert!(gesture_modifiers(keyboard::Modifiers::CTRL).control);
        assert!(!gesture_modifiers(keyboard::Modifiers::LOGO).control);

        let held = gesture_modifiers(keyboard::Modifiers::SHIFT | keyboard::Modifiers::ALT);
        assert!(held.shift && held.alt && !held.control);
    }
}
