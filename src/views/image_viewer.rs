use dicomscope::transform::Affine;
use iced::mouse;
use iced::widget::canvas::event::{self, Event};
use iced::widget::canvas::{self, Canvas, Frame, Geometry, Program};
use iced::widget::image::Handle;
use iced::widget::{container, text};
use iced::{Color, Element, Length, Point, Rectangle, Renderer, Size, Theme, Vector};

use crate::message::Message;

/// Pointer input in canvas-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasInput {
    Pressed {
        position: Point,
        button: mouse::Button,
    },
    Moved(Point),
    Released(Point),
    Wheel {
        position: Point,
        delta_y: f32,
    },
}

pub fn image_panel<'a>(
    image: Option<&'a Handle>,
    image_size: Size,
    transform: Affine,
) -> Element<'a, Message> {
    match image {
        Some(handle) => Canvas::new(ImageCanvas {
            handle,
            image_size,
            transform,
        })
        .width(Length::Fill)
        .height(Length::Fill)
        .into(),
        None => container(text("Open a DICOM file or series to start viewing"))
            .center(Length::Fill)
            .into(),
    }
}

struct ImageCanvas<'a> {
    handle: &'a Handle,
    image_size: Size,
    transform: Affine,
}

impl Program<Message> for ImageCanvas<'_> {
    /// Last pointer position seen inside the canvas' coordinate space.
    type State = Option<Point>;

    fn update(
        &self,
        state: &mut Self::State,
        event: Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (event::Status, Option<Message>) {
        let Event::Mouse(mouse_event) = event else {
            return (event::Status::Ignored, None);
        };
        // Drags keep reporting once the pointer leaves the canvas.
        let local = cursor
            .position()
            .map(|position| Point::new(position.x - bounds.x, position.y - bounds.y));
        let over = cursor.is_over(bounds);

        let Some(input) = canvas_input(state, mouse_event, local, over) else {
            return (event::Status::Ignored, None);
        };
        let status = match input {
            CanvasInput::Moved(_) => event::Status::Ignored,
            _ => event::Status::Captured,
        };
        (
            status,
            Some(Message::Canvas {
                input,
                viewport: bounds.size(),
            }),
        )
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), Color::BLACK);

        let transform = self.transform;
        frame.with_save(|frame| {
            // Only scale and translation are composited.
            frame.translate(Vector::new(
                transform.offset_x as f32,
                transform.offset_y as f32,
            ));
            frame.scale_nonuniform(Vector::new(transform.m11 as f32, transform.m22 as f32));
            frame.draw_image(
                Rectangle::new(Point::ORIGIN, self.image_size),
                canvas::Image::new(self.handle.clone()),
            );
        });

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

/// Translate a mouse event into canvas input. Releases are always forwarded,
/// falling back to the last known position when the cursor is unavailable,
/// so a drag never outlives its button.
fn canvas_input(
    last: &mut Option<Point>,
    event: mouse::Event,
    local: Option<Point>,
    over: bool,
) -> Option<CanvasInput> {
    if let Some(position) = local {
        *last = Some(position);
    }

    if let mouse::Event::ButtonReleased(_) = event {
        return local.or(*last).map(CanvasInput::Released);
    }

    let position = local?;
    match event {
        mouse::Event::ButtonPressed(button) if over => {
            Some(CanvasInput::Pressed { position, button })
        }
        mouse::Event::CursorMoved { .. } => Some(CanvasInput::Moved(position)),
        mouse::Event::WheelScrolled { delta } if over => {
            let delta_y = match delta {
                mouse::ScrollDelta::Lines { y, .. } | mouse::ScrollDelta::Pixels { y, .. } => y,
            };
            Some(CanvasInput::Wheel { position, delta_y })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_without_cursor_uses_last_position() {
        let mut last = None;
        let pressed = canvas_input(
            &mut last,
            mouse::Event::ButtonPressed(mouse::Button::Left),
            Some(Point::new(4.0, 6.0)),
            true,
        );
        assert_eq!(
            pressed,
            Some(CanvasInput::Pressed {
                position: Point::new(4.0, 6.0),
                button: mouse::Button::Left
            })
        );

        let released = canvas_input(
            &mut last,
            mouse::Event::ButtonReleased(mouse::Button::Left),
            None,
            false,
        );
        assert_eq!(released, Some(CanvasInput::Released(Point::new(4.0, 6.0))));
    }

    #[test]
    fn events_without_cursor_are_dropped() {
        let mut last = None;
        assert_eq!(
            canvas_input(&mut last, mouse::Event::CursorMoved { position: Point::ORIGIN }, None, false),
            None
        );
        assert_eq!(
            canvas_input(&mut last, mouse::Event::ButtonReleased(mouse::Button::Left), None, false),
            None
        );
    }

    #[test]
    fn presses_outside_the_canvas_are_ignored() {
        let mut last = None;
        let pressed = canvas_input(
            &mut last,
            mouse::Event::ButtonPressed(mouse::Button::Left),
            Some(Point::new(-5.0, 2.0)),
            false,
        );
        assert_eq!(pressed, None);
        assert_eq!(last, Some(Point::new(-5.0, 2.0)));
    }
}
