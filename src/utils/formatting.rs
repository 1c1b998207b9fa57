//! Display strings for the tag table.

use dicom::core::value::{PrimitiveValue, Value};
use dicom::core::{Tag, VR};

const MAX_VALUE_CHARS: usize = 120;

pub fn format_tag(tag: Tag) -> String {
    format!("({:04X},{:04X})", tag.group(), tag.element())
}

/// Render an element value on one line, truncated for the tag table.
pub fn value_to_string<I, P>(value: &Value<I, P>, vr: VR) -> String {
    let rendered = match value {
        Value::Primitive(primitive) => primitive_to_string(primitive, vr),
        Value::Sequence(sequence) => {
            format!("Sequence ({})", counted(sequence.multiplicity() as usize, "item"))
        }
        Value::PixelSequence(sequence) => {
            let fragments = counted(sequence.fragments().len(), "fragment");
            match sequence.offset_table().len() {
                0 => format!("Encapsulated pixel data ({fragments})"),
                offsets => format!(
                    "Encapsulated pixel data ({fragments}, {})",
                    counted(offsets, "offset")
                ),
            }
        }
    };
    truncate(rendered)
}

fn primitive_to_string(value: &PrimitiveValue, vr: VR) -> String {
    match value {
        PrimitiveValue::Empty => String::from("(empty)"),
        PrimitiveValue::Tags(tags) => tags
            .iter()
            .map(|tag| format_tag(*tag))
            .collect::<Vec<_>>()
            .join("\\"),
        PrimitiveValue::U8(_) if is_binary_vr(vr) => {
            format!("Binary data ({} bytes)", value.calculate_byte_len())
        }
        _ => value.to_str().into_owned(),
    }
}

fn counted(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn truncate(rendered: String) -> String {
    if rendered.chars().count() <= MAX_VALUE_CHARS {
        return rendered;
    }
    let mut truncated: String = rendered.chars().take(MAX_VALUE_CHARS).collect();
    truncated.push('…');
    truncated
}

fn is_binary_vr(vr: VR) -> bool {
    matches!(
        vr,
        VR::OB | VR::OD | VR::OF | VR::OL | VR::OV | VR::OW | VR::UN
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_render_as_group_element_pairs() {
        assert_eq!(format_tag(Tag(0x0028, 0x1050)), "(0028,1050)");
    }

    #[test]
    fn long_values_are_truncated_on_char_boundaries() {
        let long = "é".repeat(MAX_VALUE_CHARS + 5);
        let truncated = truncate(long);
        assert_eq!(truncated.chars().count(), MAX_VALUE_CHARS + 1);
        assert!(truncated.ends_with('…'));
    }

    #[test]
    fn counts_are_pluralized() {
        assert_eq!(counted(1, "item"), "1 item");
        assert_eq!(counted(3, "item"), "3 items");
    }
}
