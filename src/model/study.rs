#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientInfo {
    pub name: String,
    pub id: String,
    pub birth_date: String,
    pub sex: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyInfo {
    pub instance_uid: String,
    pub date: String,
    pub description: String,
    pub institution: String,
    pub modality: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesInfo {
    pub instance_uid: String,
    pub number: Option<i32>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRow {
    pub tag: String,
    pub vr: String,
    pub alias: String,
    pub value: String,
}

/// Descriptive context shown next to the image. Taken from the first
/// instance of a series.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyContext {
    pub patient: PatientInfo,
    pub study: StudyInfo,
    pub series: SeriesInfo,
    pub tags: Vec<TagRow>,
}
