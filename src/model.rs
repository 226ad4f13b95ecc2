use crate::class_key::ClassId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Highest period number any bell schedule may define.
pub const MAX_PERIOD: u8 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    #[serde(rename = "월")]
    Mon,
    #[serde(rename = "화")]
    Tue,
    #[serde(rename = "수")]
    Wed,
    #[serde(rename = "목")]
    Thu,
    #[serde(rename = "금")]
    Fri,
}

impl Day {
    pub const ALL: [Day; 5] = [Day::Mon, Day::Tue, Day::Wed, Day::Thu, Day::Fri];

    pub fn symbol(self) -> &'static str {
        match self {
            Day::Mon => "월",
            Day::Tue => "화",
            Day::Wed => "수",
            Day::Thu => "목",
            Day::Fri => "금",
        }
    }

    pub fn from_symbol(s: &str) -> Option<Day> {
        Day::ALL.into_iter().find(|d| d.symbol() == s)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One occupied timetable cell: at (day, period) class `class_id` does `subject`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    #[serde(default)]
    pub id: String,
    pub day: Day,
    pub period: u8,
    pub class_id: ClassId,
    #[serde(default)]
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_text: Option<String>,
    // Cosmetic payload, copied through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_style: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rich_text: Option<serde_json::Value>,
}

impl Placement {
    pub fn new(id: &str, day: Day, period: u8, class_id: &str, subject: &str) -> Self {
        Self {
            id: id.to_string(),
            day,
            period,
            class_id: ClassId::parse(class_id),
            subject: subject.to_string(),
            teacher_id: None,
            room_id: None,
            custom_text: None,
            custom_style: None,
            rich_text: None,
        }
    }

    pub fn with_teacher(mut self, teacher_id: &str) -> Self {
        self.teacher_id = Some(teacher_id.to_string());
        self
    }

    #[allow(dead_code)]
    pub fn with_room(mut self, room_id: &str) -> Self {
        self.room_id = Some(room_id.to_string());
        self
    }

    /// Teacher id, treating an empty string as absent.
    pub fn teacher(&self) -> Option<&str> {
        self.teacher_id.as_deref().filter(|s| !s.is_empty())
    }

    /// Room id, treating an empty string as absent.
    pub fn room(&self) -> Option<&str> {
        self.room_id.as_deref().filter(|s| !s.is_empty())
    }

    pub fn same_cell(&self, other: &Placement) -> bool {
        self.day == other.day && self.period == other.period
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherAssignment {
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    /// Grade rows (`"3"`), classes (`"5-1"`) or aggregates. Empty means every grade.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub assignments: Vec<TeacherAssignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hours: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Number of placements the room can host in one cell.
    pub capacity: u32,
}

/// Per-subject overlap policy and grade sync flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectConfig {
    #[serde(default)]
    pub allow_overlap: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_grade_classes: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_overlap_by_grade: Option<Vec<u32>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodKind {
    #[default]
    #[serde(rename = "CLASS")]
    Class,
    /// Break, lunch or any other non-class block.
    #[serde(rename = "ETC")]
    Etc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSlot {
    pub start: String,
    pub end: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<PeriodKind>,
}

impl PeriodSlot {
    pub fn kind(&self) -> PeriodKind {
        self.kind.unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BellSchedule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub target_grades: Vec<u32>,
    #[serde(default)]
    pub periods: BTreeMap<u8, PeriodSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolInfo {
    pub name: String,
    #[serde(default)]
    pub classes_per_grade: BTreeMap<u32, u32>,
    #[serde(default)]
    pub max_periods: BTreeMap<u32, u8>,
    #[serde(default)]
    pub bell_schedules: Vec<BellSchedule>,
    #[serde(default)]
    pub has_distinct_schedules: bool,
}

/// Row layout of the teacher assignment grid: which grade rows exist and how
/// many extra classes each has.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherLayoutConfig {
    #[serde(default)]
    pub grades: Vec<String>,
    #[serde(default)]
    pub extra_class_counts: BTreeMap<String, i64>,
    #[serde(default)]
    pub custom_labels: BTreeMap<String, String>,
    #[serde(default)]
    pub hidden_level: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_class_counts: Option<BTreeMap<String, i64>>,
}
