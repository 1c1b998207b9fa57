pub mod frame;
pub mod loader;
pub mod series;
pub mod study;

pub use frame::{ImageFrame, Polarity, Rescale, WindowLevel};
pub use loader::{load_instance, load_series, LoadedInstance, LoadedSeries};
pub use series::SeriesStack;
pub use study::{PatientInfo, SeriesInfo, StudyContext, StudyInfo, TagRow};
