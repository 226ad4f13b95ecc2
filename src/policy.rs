use crate::model::SubjectConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-subject overlap configuration.
///
/// Grade grants only ever accumulate: once a subject may overlap for a
/// grade it stays that way for the life of the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlapPolicies {
    configs: BTreeMap<String, SubjectConfig>,
}

impl OverlapPolicies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, subject: &str) -> Option<&SubjectConfig> {
        self.configs.get(subject)
    }

    #[allow(dead_code)]
    pub fn configs(&self) -> &BTreeMap<String, SubjectConfig> {
        &self.configs
    }

    pub fn is_overlap_allowed(&self, subject: &str, grade: Option<u32>) -> bool {
        let Some(cfg) = self.configs.get(subject) else {
            return false;
        };
        if cfg.allow_overlap {
            return true;
        }
        match (grade, cfg.allow_overlap_by_grade.as_ref()) {
            (Some(g), Some(grades)) => grades.contains(&g),
            _ => false,
        }
    }

    /// Returns `true` when the grade was not already granted.
    pub fn grant_grade_overlap(&mut self, subject: &str, grade: u32) -> bool {
        let cfg = self.configs.entry(subject.to_string()).or_default();
        let grades = cfg.allow_overlap_by_grade.get_or_insert_with(Vec::new);
        if grades.contains(&grade) {
            return false;
        }
        grades.push(grade);
        true
    }

    pub fn set_global(&mut self, subject: &str, allow: bool) {
        self.configs
            .entry(subject.to_string())
            .or_default()
            .allow_overlap = allow;
    }

    pub fn set_sync_grade_classes(&mut self, subject: &str, sync: bool) {
        self.configs
            .entry(subject.to_string())
            .or_default()
            .sync_grade_classes = Some(sync);
    }

    /// Moves `from`'s config under `to`. Flags set on either side survive and
    /// grade grants are merged.
    pub fn rename(&mut self, from: &str, to: &str) {
        if from == to {
            return;
        }
        let Some(moved) = self.configs.remove(from) else {
            return;
        };
        let target = self.configs.entry(to.to_string()).or_default();
        target.allow_overlap |= moved.allow_overlap;
        if moved.sync_grade_classes.is_some() {
            target.sync_grade_classes = moved.sync_grade_classes;
        }
        if let Some(grades) = moved.allow_overlap_by_grade {
            let existing = target.allow_overlap_by_grade.get_or_insert_with(Vec::new);
            for g in grades {
                if !existing.contains(&g) {
                    existing.push(g);
                }
            }
        }
    }
}

impl From<BTreeMap<String, SubjectConfig>> for OverlapPolicies {
    fn from(configs: BTreeMap<String, SubjectConfig>) -> Self {
        Self { configs }
    }
}
