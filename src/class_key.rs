use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const UNASSIGNED: &str = "미배정";
pub const MISC: &str = "기타";
pub const LEVEL_MARKER: &str = "레벨";
pub const INTEGRATED_MARKER: &str = "통합";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    /// A single homeroom class such as `3-2`.
    Concrete,
    /// The whole student body of a grade (`4레벨`, `2통합`).
    Aggregate,
    /// `미배정` / `기타`: never part of a class-identity check.
    Sentinel,
}

/// A class identifier parsed once from its raw string form.
///
/// The raw string is kept verbatim and is what gets serialized, so project
/// documents round-trip byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ClassId {
    raw: String,
    grade: Option<u32>,
    class_number: Option<u32>,
    kind: ClassKind,
}

impl ClassId {
    pub fn parse(raw: &str) -> Self {
        let kind = if raw == UNASSIGNED || raw == MISC {
            ClassKind::Sentinel
        } else if raw.contains(LEVEL_MARKER) || raw.contains(INTEGRATED_MARKER) {
            ClassKind::Aggregate
        } else {
            ClassKind::Concrete
        };
        let class_number = raw.split('-').nth(1).and_then(leading_int);
        Self {
            raw: raw.to_string(),
            grade: extract_grade(raw),
            class_number,
            kind,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn grade(&self) -> Option<u32> {
        self.grade
    }

    pub fn class_number(&self) -> Option<u32> {
        self.class_number
    }

    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    pub fn is_sentinel(&self) -> bool {
        self.kind == ClassKind::Sentinel
    }

    pub fn is_aggregate(&self) -> bool {
        self.kind == ClassKind::Aggregate
    }

    /// Whether two identifiers name the same student population.
    ///
    /// Sentinels never share a population with anything. Otherwise textual
    /// equality wins, and a grade-wide aggregate covers every class of its
    /// grade.
    pub fn shares_population(&self, other: &ClassId) -> bool {
        if self.is_sentinel() || other.is_sentinel() {
            return false;
        }
        if self.raw == other.raw {
            return true;
        }
        match (self.grade, other.grade) {
            (Some(a), Some(b)) if a == b => self.is_aggregate() || other.is_aggregate(),
            _ => false,
        }
    }

    /// Human label used in batch reasons and pickers.
    pub fn display_label(&self, custom_labels: &BTreeMap<String, String>) -> String {
        if self.raw == UNASSIGNED {
            return "-".to_string();
        }
        if let Some(label) = custom_labels.get(&self.raw) {
            return label.clone();
        }
        if let Some((prefix, suffix)) = self.raw.split_once(LEVEL_MARKER) {
            return match leading_int(suffix) {
                Some(n) => format!("{prefix}학년 L{}", circled(n)),
                None => format!("{prefix}학년 L"),
            };
        }
        self.raw.clone()
    }
}

fn circled(n: u32) -> String {
    if (1..=20).contains(&n) {
        char::from_u32(0x2460 + n - 1)
            .map(|c| c.to_string())
            .unwrap_or_else(|| format!("({n})"))
    } else {
        format!("({n})")
    }
}

/// First run of ASCII digits anywhere in the identifier.
pub fn extract_grade(raw: &str) -> Option<u32> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    leading_int(&raw[start..])
}

fn leading_int(s: &str) -> Option<u32> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().ok()
}

impl From<String> for ClassId {
    fn from(raw: String) -> Self {
        ClassId::parse(&raw)
    }
}

impl From<&str> for ClassId {
    fn from(raw: &str) -> Self {
        ClassId::parse(raw)
    }
}

impl From<ClassId> for String {
    fn from(id: ClassId) -> Self {
        id.raw
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
