use dicomscope::model::StudyContext;
use iced::widget::text::Wrapping;
use iced::widget::{column, row, scrollable, text, Column};
use iced::{Element, Length};

use crate::message::Message;

pub fn metadata_panel(context: Option<&StudyContext>) -> Element<'_, Message> {
    let Some(context) = context else {
        return text("Patient, study and tag details appear here once a file is open").into();
    };

    let summary = column![
        text("Patient").size(18),
        field("Name", &context.patient.name),
        field("ID", &context.patient.id),
        field("Birth date", &context.patient.birth_date),
        field("Sex", &context.patient.sex),
        text("Study").size(18),
        field("Date", &context.study.date),
        field("Description", &context.study.description),
        field("Institution", &context.study.institution),
        field("Modality", &context.study.modality),
        text("Series").size(18),
        field(
            "Number",
            &context
                .series
                .number
                .map(|number| number.to_string())
                .unwrap_or_default()
        ),
        field("Description", &context.series.description),
    ]
    .spacing(4);

    let header = row![
        text("Tag").width(Length::FillPortion(2)),
        text("VR").width(Length::FillPortion(1)),
        text("Alias").width(Length::FillPortion(3)),
        text("Value").width(Length::FillPortion(4)),
    ]
    .spacing(12);

    let table = context
        .tags
        .iter()
        .fold(Column::new().push(header), |table, tag| {
            table.push(
                row![
                    text(&tag.tag).width(Length::FillPortion(2)),
                    text(&tag.vr).width(Length::FillPortion(1)),
                    text(&tag.alias).width(Length::FillPortion(3)),
                    text(&tag.value)
                        .width(Length::FillPortion(4))
                        .wrapping(Wrapping::Word),
                ]
                .spacing(12),
            )
        })
        .spacing(6);

    column![summary, scrollable(table).height(Length::Fill)]
        .spacing(16)
        .into()
}

fn field<'a>(label: &'a str, value: &str) -> Element<'a, Message> {
    let value = if value.is_empty() { "-" } else { value };
    row![
        text(label).width(Length::FillPortion(1)),
        text(value.to_string())
            .width(Length::FillPortion(2))
            .wrapping(Wrapping::Word),
    ]
    .spacing(12)
    .into()
}
