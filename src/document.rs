use crate::defaults;
use crate::model::{BellSchedule, Placement, Room, SchoolInfo, Teacher, TeacherLayoutConfig};
use crate::policy::OverlapPolicies;
use crate::store::Store;
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use uuid::Uuid;

pub const DOCUMENT_VERSION: &str = "1.4";

/// `schoolInfo` as stored on disk. Older files predate bell schedules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolInfoDoc {
    pub name: String,
    #[serde(default)]
    pub classes_per_grade: BTreeMap<u32, u32>,
    #[serde(default)]
    pub max_periods: BTreeMap<u32, u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bell_schedules: Option<Vec<BellSchedule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_distinct_schedules: Option<bool>,
}

impl From<SchoolInfoDoc> for SchoolInfo {
    fn from(doc: SchoolInfoDoc) -> Self {
        SchoolInfo {
            name: doc.name,
            classes_per_grade: doc.classes_per_grade,
            max_periods: doc.max_periods,
            bell_schedules: doc.bell_schedules.unwrap_or_else(defaults::bell_schedules),
            has_distinct_schedules: doc.has_distinct_schedules.unwrap_or(false),
        }
    }
}

impl From<&SchoolInfo> for SchoolInfoDoc {
    fn from(info: &SchoolInfo) -> Self {
        SchoolInfoDoc {
            name: info.name.clone(),
            classes_per_grade: info.classes_per_grade.clone(),
            max_periods: info.max_periods.clone(),
            bell_schedules: Some(info.bell_schedules.clone()),
            has_distinct_schedules: Some(info.has_distinct_schedules),
        }
    }
}

/// The saved project. Every section is optional on import; a missing
/// section leaves the current one in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_info: Option<SchoolInfoDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teachers: Option<Vec<Teacher>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooms: Option<Vec<Room>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timetable: Option<Vec<Placement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_styles: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_hours: Option<BTreeMap<String, u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_config: Option<TeacherLayoutConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_configs: Option<OverlapPolicies>,
    #[serde(default)]
    pub project_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub total: usize,
    pub conflicts: usize,
}

pub fn parse_document(value: serde_json::Value) -> anyhow::Result<ProjectDocument> {
    if !value.is_object() {
        anyhow::bail!("project document must be a JSON object");
    }
    serde_json::from_value(value).context("malformed project document")
}

/// Parses the text of a saved project file.
pub fn parse_str(text: &str) -> anyhow::Result<ProjectDocument> {
    let value: serde_json::Value =
        serde_json::from_str(text).context("project file is not valid JSON")?;
    parse_document(value)
}

/// Replaces every section present in `doc`. Parsing has already succeeded by
/// the time this runs, so a bad file never leaves the store half-loaded.
/// Timetable entries with a missing or repeated id get a fresh one.
pub fn apply_document(store: &mut Store, doc: ProjectDocument) -> ImportReport {
    if let Some(info) = doc.school_info {
        store.school = info.into();
    }
    if let Some(teachers) = doc.teachers {
        store.teachers = teachers;
    }
    if let Some(rooms) = doc.rooms {
        store.rooms = rooms;
    }
    if let Some(subjects) = doc.subjects {
        store.subjects = subjects;
    }
    if let Some(styles) = doc.subject_styles {
        store.subject_styles = styles;
    }
    if let Some(hours) = doc.subject_hours {
        store.subject_hours = hours;
    }
    if let Some(layout) = doc.teacher_config {
        store.layout = TeacherLayoutConfig {
            level_class_counts: Some(layout.level_class_counts.clone().unwrap_or_default()),
            ..layout
        };
    }
    if let Some(configs) = doc.subject_configs {
        store.policies = configs;
    }

    let Some(timetable) = doc.timetable else {
        return ImportReport {
            total: 0,
            conflicts: 0,
        };
    };
    let mut seen = HashSet::new();
    store.placements = timetable
        .into_iter()
        .map(|mut p| {
            if p.id.is_empty() || !seen.insert(p.id.clone()) {
                p.id = Uuid::new_v4().to_string();
                seen.insert(p.id.clone());
            }
            p
        })
        .collect();
    ImportReport {
        total: store.placements.len(),
        conflicts: store.conflicting_ids().len(),
    }
}

pub fn snapshot(store: &Store, password_hash: Option<String>) -> ProjectDocument {
    ProjectDocument {
        school_info: Some(SchoolInfoDoc::from(&store.school)),
        teachers: Some(store.teachers.clone()),
        rooms: Some(store.rooms.clone()),
        subjects: Some(store.subjects.clone()),
        timetable: Some(store.placements.clone()),
        subject_styles: Some(store.subject_styles.clone()),
        subject_hours: Some(store.subject_hours.clone()),
        teacher_config: Some(store.layout.clone()),
        subject_configs: Some(store.policies.clone()),
        project_password: password_hash,
        version: Some(DOCUMENT_VERSION.to_string()),
    }
}

pub fn write_document(path: &Path, doc: &ProjectDocument) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let text = serde_json::to_string_pretty(doc).context("failed to serialize project")?;
    std::fs::write(path, text)
        .with_context(|| format!("failed to write project file {}", path.to_string_lossy()))?;
    Ok(())
}

pub fn default_file_name(date: NaiveDate) -> String {
    format!("smart_schedule_project_{}.json", date.format("%Y-%m-%d"))
}
