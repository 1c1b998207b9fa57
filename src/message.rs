use dicomscope::model::LoadedSeries;
use iced::keyboard;

use crate::views::CanvasInput;

#[derive(Debug, Clone)]
pub enum Message {
    OpenFile,
    OpenSeries,
    SeriesLoaded(Option<Result<LoadedSeries, String>>),
    Canvas {
        input: CanvasInput,
        viewport: iced::Size,
    },
    KeyPressed(keyboard::Key),
    ModifiersChanged(keyboard::Modifiers),
    PreviousSlice,
    NextSlice,
    ZoomIn,
    ZoomOut,
    FitToWindow,
    ResetView,
}
