use crate::class_key::{ClassId, UNASSIGNED};
use crate::conflict::{self, Conflict};
use crate::defaults;
use crate::model::{Day, Placement, Room, SchoolInfo, Teacher, TeacherLayoutConfig};
use crate::policy::OverlapPolicies;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};
use uuid::Uuid;

/// Weekly sessions assumed for a subject without an explicit setting.
pub const DEFAULT_SUBJECT_HOURS: u32 = 2;

/// Weekly load cap for a teacher without `maxHours`.
pub const DEFAULT_MAX_HOURS: u32 = 20;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} id already exists: {id}")]
    DuplicateId { kind: &'static str, id: String },
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("{0}")]
    Invalid(String),
    #[error("cell is held by a specialist or grade-wide placement: {id}")]
    Locked { id: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignOutcome {
    pub applied: bool,
    pub placement_id: String,
    pub conflict: Conflict,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub applied: bool,
    pub placement_ids: Vec<String>,
    pub reports: Vec<Conflict>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherLoad {
    pub assigned: u32,
    pub max: u32,
    pub over: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeroomOutcome {
    pub placement_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced_id: Option<String>,
}

/// Changes to a subject's catalog entry. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct SubjectUpdate {
    pub new_name: Option<String>,
    pub style: Option<serde_json::Value>,
    pub allow_overlap: Option<bool>,
    pub sync_grade_classes: Option<bool>,
    pub hours: Option<u32>,
}

/// Everything the conflict engine and block derivation read: the timetable
/// and the registries its placements point into.
#[derive(Debug, Clone)]
pub struct Store {
    pub(crate) school: SchoolInfo,
    pub(crate) layout: TeacherLayoutConfig,
    pub(crate) teachers: Vec<Teacher>,
    pub(crate) rooms: Vec<Room>,
    pub(crate) subjects: Vec<String>,
    pub(crate) subject_styles: BTreeMap<String, serde_json::Value>,
    pub(crate) subject_hours: BTreeMap<String, u32>,
    pub(crate) policies: OverlapPolicies,
    pub(crate) placements: Vec<Placement>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            school: defaults::school_info(),
            layout: defaults::layout(),
            teachers: defaults::teachers(),
            rooms: defaults::rooms(),
            subjects: defaults::subjects(),
            subject_styles: BTreeMap::new(),
            subject_hours: BTreeMap::new(),
            policies: OverlapPolicies::new(),
            placements: Vec::new(),
        }
    }
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // --- placements ---

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn placement(&self, id: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.id == id)
    }

    pub fn add_placement(&mut self, mut placement: Placement) -> Result<String, StoreError> {
        if placement.id.is_empty() {
            placement.id = Uuid::new_v4().to_string();
        } else if self.placement(&placement.id).is_some() {
            return Err(StoreError::DuplicateId {
                kind: "placement",
                id: placement.id,
            });
        }
        debug!(
            id = %placement.id,
            day = %placement.day,
            period = placement.period,
            class = %placement.class_id,
            subject = %placement.subject,
            "placement added"
        );
        let id = placement.id.clone();
        self.placements.push(placement);
        Ok(id)
    }

    /// Removing an unknown id is a no-op.
    pub fn remove_placement(&mut self, id: &str) -> bool {
        let before = self.placements.len();
        self.placements.retain(|p| p.id != id);
        let removed = self.placements.len() != before;
        if removed {
            debug!(id, "placement removed");
        }
        removed
    }

    pub fn update_placement(&mut self, placement: Placement) -> bool {
        match self.placements.iter_mut().find(|p| p.id == placement.id) {
            Some(slot) => {
                debug!(id = %placement.id, "placement updated");
                *slot = placement;
                true
            }
            None => false,
        }
    }

    /// Conflict report for `candidate` against the live timetable.
    pub fn check(&self, candidate: &Placement) -> Conflict {
        conflict::check_conflict(candidate, &self.placements, &self.policies, &self.rooms)
    }

    pub fn conflicting_ids(&self) -> Vec<String> {
        conflict::conflicting_ids(&self.placements, &self.policies, &self.rooms)
    }

    /// Adds `candidate` when it is conflict-free, or regardless when `force`
    /// is set. The report is returned either way.
    pub fn assign_checked(
        &mut self,
        mut candidate: Placement,
        force: bool,
    ) -> Result<AssignOutcome, StoreError> {
        if candidate.id.is_empty() {
            candidate.id = Uuid::new_v4().to_string();
        }
        let report = self.check(&candidate);
        let placement_id = candidate.id.clone();
        let applied = !report.has_conflict || force;
        if applied {
            if report.has_conflict {
                info!(id = %placement_id, reason = %report.reason, "forced placement over conflict");
            }
            self.add_placement(candidate)?;
        } else {
            debug!(id = %placement_id, reason = %report.reason, "placement rejected");
        }
        Ok(AssignOutcome {
            applied,
            placement_id,
            conflict: report,
        })
    }

    /// Assigns several placements at once. The batch is checked against the
    /// state it would produce, so it can collide with itself; nothing is
    /// written unless every item is clean or `force` is set.
    pub fn assign_batch(
        &mut self,
        mut candidates: Vec<Placement>,
        force: bool,
    ) -> Result<BatchOutcome, StoreError> {
        let mut ids = HashSet::new();
        for c in candidates.iter_mut() {
            if c.id.is_empty() {
                c.id = Uuid::new_v4().to_string();
            }
            if !ids.insert(c.id.clone()) || self.placement(&c.id).is_some() {
                return Err(StoreError::DuplicateId {
                    kind: "placement",
                    id: c.id.clone(),
                });
            }
        }
        let reports =
            conflict::check_batch(&candidates, &self.placements, &self.policies, &self.rooms);
        let clean = reports.iter().all(|r| !r.has_conflict);
        let applied = clean || force;
        let placement_ids: Vec<String> = candidates.iter().map(|c| c.id.clone()).collect();
        if applied {
            info!(count = candidates.len(), forced = !clean, "batch assigned");
            self.placements.extend(candidates);
        }
        Ok(BatchOutcome {
            applied,
            placement_ids,
            reports,
        })
    }

    /// Writes a homeroom subject into one class cell, replacing the homeroom
    /// placement already there. A cell held by a specialist teacher or by a
    /// grade-wide placement of the class's grade is locked.
    pub fn assign_homeroom(
        &mut self,
        class_id: &str,
        day: Day,
        period: u8,
        subject: &str,
    ) -> Result<HomeroomOutcome, StoreError> {
        let class = ClassId::parse(class_id);
        if class.is_sentinel() || class.is_aggregate() || class.as_str().is_empty() {
            return Err(StoreError::Invalid(format!("not a single class: {class_id}")));
        }
        if subject.trim().is_empty() {
            return Err(StoreError::Invalid("homeroom subject must not be empty".to_string()));
        }

        let in_cell = |p: &&Placement| p.day == day && p.period == period;
        let existing = self
            .placements
            .iter()
            .filter(in_cell)
            .find(|p| p.class_id.as_str() == class_id)
            .or_else(|| {
                let grade = class.grade()?;
                self.placements
                    .iter()
                    .filter(in_cell)
                    .find(|p| p.class_id.is_aggregate() && p.class_id.grade() == Some(grade))
            });
        let replaced_id = match existing {
            Some(p) if p.teacher().is_some() || p.class_id.is_aggregate() => {
                debug!(class = class_id, %day, period, holder = %p.id, "homeroom cell locked");
                return Err(StoreError::Locked { id: p.id.clone() });
            }
            Some(p) => Some(p.id.clone()),
            None => None,
        };

        if let Some(id) = replaced_id.as_deref() {
            self.remove_placement(id);
        }
        let placement_id = self.add_placement(Placement::new("", day, period, class_id, subject))?;
        Ok(HomeroomOutcome {
            placement_id,
            replaced_id,
        })
    }

    // --- teachers ---

    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    pub fn teacher(&self, id: &str) -> Option<&Teacher> {
        self.teachers.iter().find(|t| t.id == id)
    }

    pub fn add_teacher(&mut self, mut teacher: Teacher) -> Result<String, StoreError> {
        if teacher.id.is_empty() {
            teacher.id = Uuid::new_v4().to_string();
        } else if self.teacher(&teacher.id).is_some() {
            return Err(StoreError::DuplicateId {
                kind: "teacher",
                id: teacher.id,
            });
        }
        let id = teacher.id.clone();
        self.teachers.push(teacher);
        Ok(id)
    }

    pub fn update_teacher(&mut self, teacher: Teacher) -> bool {
        match self.teachers.iter_mut().find(|t| t.id == teacher.id) {
            Some(slot) => {
                *slot = teacher;
                true
            }
            None => false,
        }
    }

    /// Deletes the teacher and every placement they deliver. Returns the
    /// number of placements removed, or `None` for an unknown teacher.
    pub fn remove_teacher(&mut self, id: &str) -> Option<usize> {
        let idx = self.teachers.iter().position(|t| t.id == id)?;
        self.teachers.remove(idx);
        let removed = self.clear_teacher_schedule(id);
        info!(teacher = id, placements = removed, "teacher removed");
        Some(removed)
    }

    pub fn clear_teacher_schedule(&mut self, teacher_id: &str) -> usize {
        let before = self.placements.len();
        self.placements.retain(|p| p.teacher() != Some(teacher_id));
        before - self.placements.len()
    }

    /// Placements a teacher delivers this week against their cap.
    /// Unassigned (`미배정`) placements do not count.
    pub fn teacher_load(&self, id: &str) -> Option<TeacherLoad> {
        let teacher = self.teacher(id)?;
        let assigned = self
            .placements
            .iter()
            .filter(|p| p.teacher() == Some(id) && p.subject != UNASSIGNED)
            .count() as u32;
        let max = teacher
            .max_hours
            .filter(|h| *h > 0)
            .unwrap_or(DEFAULT_MAX_HOURS);
        Some(TeacherLoad {
            assigned,
            max,
            over: assigned > max,
        })
    }

    // --- rooms ---

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    pub fn add_room(&mut self, mut room: Room) -> Result<String, StoreError> {
        if room.id.is_empty() {
            room.id = Uuid::new_v4().to_string();
        } else if self.room(&room.id).is_some() {
            return Err(StoreError::DuplicateId {
                kind: "room",
                id: room.id,
            });
        }
        let id = room.id.clone();
        self.rooms.push(room);
        Ok(id)
    }

    pub fn update_room(&mut self, room: Room) -> bool {
        match self.rooms.iter_mut().find(|r| r.id == room.id) {
            Some(slot) => {
                *slot = room;
                true
            }
            None => false,
        }
    }

    /// Placements keep their room id; a dangling id simply stops constraining.
    pub fn remove_room(&mut self, id: &str) -> bool {
        let before = self.rooms.len();
        self.rooms.retain(|r| r.id != id);
        self.rooms.len() != before
    }

    /// Orders rooms by `ids`. Unknown ids are ignored and rooms missing from
    /// `ids` keep their relative order at the end.
    pub fn reorder_rooms(&mut self, ids: &[String]) {
        let mut remaining = std::mem::take(&mut self.rooms);
        let mut ordered = Vec::with_capacity(remaining.len());
        for id in ids {
            if let Some(pos) = remaining.iter().position(|r| &r.id == id) {
                ordered.push(remaining.remove(pos));
            }
        }
        ordered.extend(remaining);
        self.rooms = ordered;
    }

    // --- subjects and overlap policy ---

    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    pub fn subject_styles(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.subject_styles
    }

    pub fn subject_hours(&self) -> &BTreeMap<String, u32> {
        &self.subject_hours
    }

    pub fn add_subject(&mut self, name: &str) -> bool {
        if name.is_empty() || self.subjects.iter().any(|s| s == name) {
            return false;
        }
        self.subjects.push(name.to_string());
        true
    }

    /// Applies `update` to `subject`. A rename is carried through the
    /// catalog, teacher assignments, placements, styles, hours and policy.
    pub fn update_subject(&mut self, subject: &str, update: SubjectUpdate) -> Result<String, StoreError> {
        if !self.subjects.iter().any(|s| s == subject) {
            return Err(StoreError::NotFound {
                kind: "subject",
                id: subject.to_string(),
            });
        }
        let mut name = subject.to_string();
        if let Some(new_name) = update.new_name.filter(|n| n != subject) {
            if new_name.trim().is_empty() {
                return Err(StoreError::Invalid("subject name must not be empty".to_string()));
            }
            if self.subjects.iter().any(|s| *s == new_name) {
                return Err(StoreError::DuplicateId {
                    kind: "subject",
                    id: new_name,
                });
            }
            self.rename_subject(subject, &new_name);
            name = new_name;
        }
        if let Some(style) = update.style {
            self.subject_styles.insert(name.clone(), style);
        }
        if let Some(hours) = update.hours {
            self.subject_hours.insert(name.clone(), hours);
        }
        if let Some(allow) = update.allow_overlap {
            self.policies.set_global(&name, allow);
        }
        if let Some(sync) = update.sync_grade_classes {
            self.policies.set_sync_grade_classes(&name, sync);
        }
        Ok(name)
    }

    fn rename_subject(&mut self, from: &str, to: &str) {
        for s in self.subjects.iter_mut().filter(|s| s.as_str() == from) {
            *s = to.to_string();
        }
        for a in self
            .teachers
            .iter_mut()
            .flat_map(|t| t.assignments.iter_mut())
            .filter(|a| a.subject == from)
        {
            a.subject = to.to_string();
        }
        for p in self.placements.iter_mut().filter(|p| p.subject == from) {
            p.subject = to.to_string();
        }
        if let Some(style) = self.subject_styles.remove(from) {
            self.subject_styles.insert(to.to_string(), style);
        }
        if let Some(hours) = self.subject_hours.remove(from) {
            self.subject_hours.insert(to.to_string(), hours);
        }
        self.policies.rename(from, to);
        info!(from, to, "subject renamed");
    }

    pub fn required_hours(&self, subject: &str) -> u32 {
        self.subject_hours
            .get(subject)
            .copied()
            .filter(|h| *h > 0)
            .unwrap_or(DEFAULT_SUBJECT_HOURS)
    }

    pub fn policies(&self) -> &OverlapPolicies {
        &self.policies
    }

    pub fn is_overlap_allowed(&self, subject: &str, grade: u32) -> bool {
        self.policies.is_overlap_allowed(subject, Some(grade))
    }

    pub fn grant_grade_overlap(&mut self, subject: &str, grade: u32) -> bool {
        let changed = self.policies.grant_grade_overlap(subject, grade);
        if changed {
            info!(subject, grade, "grade overlap granted");
        }
        changed
    }

    // --- school and layout ---

    pub fn school(&self) -> &SchoolInfo {
        &self.school
    }

    pub fn set_school(&mut self, school: SchoolInfo) {
        self.school = school;
    }

    pub fn layout(&self) -> &TeacherLayoutConfig {
        &self.layout
    }

    pub fn set_layout(&mut self, layout: TeacherLayoutConfig) {
        self.layout = layout;
    }

    /// Every concrete class the school configures, grade by grade.
    pub fn class_list(&self) -> Vec<String> {
        self.school
            .classes_per_grade
            .iter()
            .flat_map(|(grade, count)| (1..=*count).map(move |c| format!("{grade}-{c}")))
            .collect()
    }
}
