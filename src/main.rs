mod app;
mod message;
mod views;

pub fn main() -> iced::Result {
    app::run()
}
