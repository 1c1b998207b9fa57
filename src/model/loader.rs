//! Turns DICOM files into frames the viewer core can render.

use std::path::{Path, PathBuf};

use dicom::core::dictionary::DataDictionary;
use dicom::core::header::Header;
use dicom::dictionary_std::StandardDataDictionary;
use dicom::object::{open_file, DefaultDicomObject};
use dicom::pixeldata::{PhotometricInterpretation, PixelDecoder, PixelRepresentation};

use super::frame::{ImageFrame, Polarity, Rescale, WindowLevel};
use super::series::SeriesStack;
use super::study::{PatientInfo, SeriesInfo, StudyContext, StudyInfo, TagRow};
use crate::error::LoadError;
use crate::utils::{format_tag, value_to_string};

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone)]
pub struct LoadedInstance {
    pub frame: ImageFrame,
    pub context: StudyContext,
}

#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub stack: SeriesStack,
    pub context: StudyContext,
    /// Files that were part of the selection but could not be loaded.
    pub skipped: Vec<String>,
}

/// Load every readable file of `paths` into one series.
///
/// Unreadable files are skipped and reported in [`LoadedSeries::skipped`];
/// the study context comes from the first file that loaded.
pub fn load_series(paths: &[PathBuf]) -> Result<LoadedSeries, LoadError> {
    let mut frames = Vec::with_capacity(paths.len());
    let mut context = None;
    let mut skipped = Vec::new();

    for path in paths {
        match load_instance(path) {
            Ok(instance) => {
                if context.is_none() {
                    context = Some(instance.context);
                }
                frames.push(instance.frame);
            }
            Err(err) => {
                log::warn!("Skipping {}: {err}", path.display());
                skipped.push(err.to_string());
            }
        }
    }

    let stack = SeriesStack::new(frames).ok_or(LoadError::EmptySeries)?;
    log::info!(
        "Loaded series with {} slice(s), {} file(s) skipped",
        stack.len(),
        skipped.len()
    );

    Ok(LoadedSeries {
        stack,
        context: context.unwrap_or_default(),
        skipped,
    })
}

pub fn load_instance(path: &Path) -> Result<LoadedInstance, LoadError> {
    log::info!("Loading DICOM file: {}", path.display());
    let object = open_file(path).map_err(|err| {
        let err = LoadError::Open {
            path: path.to_path_buf(),
            message: err.to_string(),
        };
        log::error!("{err}");
        err
    })?;

    let frame = extract_frame(path, &object)?;
    let context = extract_context(&object);

    Ok(LoadedInstance { frame, context })
}

fn extract_frame(path: &Path, object: &DefaultDicomObject) -> Result<ImageFrame, LoadError> {
    let decode_error = |message: String| LoadError::Decode {
        path: path.to_path_buf(),
        message,
    };

    let decoded = object
        .decode_pixel_data()
        .map_err(|err| decode_error(err.to_string()))?;

    if decoded.number_of_frames() == 0 {
        return Err(decode_error(String::from("pixel data holds no frames")));
    }
    if decoded.number_of_frames() > 1 {
        log::debug!(
            "{}: {} frames present, using the first",
            path.display(),
            decoded.number_of_frames()
        );
    }
    if decoded.samples_per_pixel() != 1 {
        return Err(LoadError::UnsupportedPhotometric {
            path: path.to_path_buf(),
            interpretation: decoded.photometric_interpretation().as_str().to_string(),
        });
    }

    let polarity = match decoded.photometric_interpretation() {
        PhotometricInterpretation::Monochrome1 => Polarity::Inverted,
        PhotometricInterpretation::Monochrome2 => Polarity::Normal,
        other => {
            return Err(LoadError::UnsupportedPhotometric {
                path: path.to_path_buf(),
                interpretation: other.as_str().to_string(),
            })
        }
    };

    if matches!(decoded.pixel_representation(), PixelRepresentation::Signed) {
        log::warn!(
            "{}: signed samples are read as unsigned values",
            path.display()
        );
    }

    let samples = decoded
        .frame_data(0)
        .map_err(|err| decode_error(format!("failed to materialize frame data: {err}")))?
        .to_vec();

    let rescale = Rescale::new(
        attribute_f64(object, "RescaleSlope").unwrap_or(1.0),
        attribute_f64(object, "RescaleIntercept").unwrap_or(0.0),
    );
    let window = WindowLevel::new(
        attribute_f64(object, "WindowCenter").unwrap_or(WindowLevel::DEFAULT.center),
        attribute_f64(object, "WindowWidth").unwrap_or(WindowLevel::DEFAULT.width),
    );
    let id = attribute_text(object, "SOPInstanceUID").unwrap_or_default();

    ImageFrame::new(
        id,
        decoded.columns(),
        decoded.rows(),
        decoded.bits_allocated(),
        decoded.bits_stored(),
        polarity,
        samples,
    )
    .map(|frame| {
        frame
            .with_rescale(rescale)
            .with_default_window(window)
            .with_instance_number(attribute_i32(object, "InstanceNumber"))
    })
    .map_err(|source| LoadError::InvalidFrame {
        path: path.to_path_buf(),
        source,
    })
}

fn extract_context(object: &DefaultDicomObject) -> StudyContext {
    let text = |name: &str| attribute_text(object, name).unwrap_or_default();

    StudyContext {
        patient: PatientInfo {
            name: text("PatientName"),
            id: attribute_text(object, "PatientID").unwrap_or_else(|| UNKNOWN.to_string()),
            birth_date: text("PatientBirthDate"),
            sex: text("PatientSex"),
        },
        study: StudyInfo {
            instance_uid: text("StudyInstanceUID"),
            date: text("StudyDate"),
            description: text("StudyDescription"),
            institution: text("InstitutionName"),
            modality: text("Modality"),
        },
        series: SeriesInfo {
            instance_uid: text("SeriesInstanceUID"),
            number: attribute_i32(object, "SeriesNumber"),
            description: text("SeriesDescription"),
        },
        tags: tag_rows(object),
    }
}

fn tag_rows(object: &DefaultDicomObject) -> Vec<TagRow> {
    object
        .iter()
        .map(|element| {
            let tag = element.tag();
            let vr = element.vr();
            TagRow {
                tag: format_tag(tag),
                vr: vr.to_string().to_owned(),
                alias: StandardDataDictionary
                    .by_tag(tag)
                    .map(|entry| entry.alias)
                    .unwrap_or(UNKNOWN)
                    .to_string(),
                value: value_to_string(element.value(), vr),
            }
        })
        .collect()
}

fn attribute_text(object: &DefaultDicomObject, name: &str) -> Option<String> {
    object
        .element_by_name(name)
        .ok()
        .and_then(|element| element.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// First value of a numeric attribute; multi-valued windows use the first pair.
fn attribute_f64(object: &DefaultDicomObject, name: &str) -> Option<f64> {
    object
        .element_by_name(name)
        .ok()
        .and_then(|element| element.to_multi_float64().ok())
        .and_then(|values| values.first().copied())
        .filter(|value| value.is_finite())
}

fn attribute_i32(object: &DefaultDicomObject, name: &str) -> Option<i32> {
    object
        .element_by_name(name)
        .ok()
        .and_then(|element| element.to_int::<i32>().ok())
}
