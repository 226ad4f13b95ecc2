use crate::class_key::ClassId;
use crate::conflict::{self, Conflict};
use crate::model::{Day, Placement};
use crate::store::Store;
use serde::Serialize;
use std::collections::HashSet;

/// One still-needed weekly session of `subject` for `class_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassBlock {
    pub id: String,
    pub grade: u32,
    pub class_num: u32,
    pub class_id: String,
    pub subject: String,
    pub teacher_id: String,
    pub required_sessions: u32,
    pub assigned_sessions: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellCandidate {
    pub block: ClassBlock,
    pub conflict: Conflict,
}

fn is_bare_grade(target: &str) -> bool {
    !target.is_empty() && target.chars().all(|c| c.is_ascii_digit())
}

/// Expands assignment targets into class identifiers, de-duplicated in
/// first-seen order. Bare grades become every class of the grade (including
/// extra classes from the layout); custom layout rows become their extra
/// classes; anything else is already a class or aggregate.
pub fn expand_targets(store: &Store, targets: &[String]) -> Vec<String> {
    let layout = store.layout();
    let school = store.school();
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut push = |class_id: String| {
        if seen.insert(class_id.clone()) {
            out.push(class_id);
        }
    };

    for target in targets {
        let extra = layout.extra_class_counts.get(target).copied().unwrap_or(0);
        if is_bare_grade(target) {
            let Ok(grade) = target.parse::<u32>() else {
                push(target.clone());
                continue;
            };
            let base = i64::from(school.classes_per_grade.get(&grade).copied().unwrap_or(0));
            let count = (base + extra).max(0);
            for c in 1..=count {
                push(format!("{grade}-{c}"));
            }
        } else if target.starts_with("custom-") && layout.grades.contains(target) {
            for c in 1..=extra.max(0) {
                push(format!("{target}-{c}"));
            }
        } else {
            push(target.clone());
        }
    }
    out
}

/// Sessions a teacher still has to place, one block per missing session.
///
/// Advisory only: nothing stops a teacher being placed outside their
/// assignments. Unknown teachers yield no blocks.
pub fn unfulfilled_blocks(store: &Store, teacher_id: &str) -> Vec<ClassBlock> {
    let Some(teacher) = store.teacher(teacher_id) else {
        return Vec::new();
    };

    let mut blocks = Vec::new();
    for assignment in &teacher.assignments {
        let targets = match assignment.targets.as_ref().filter(|t| !t.is_empty()) {
            Some(t) => t.clone(),
            None => store.layout().grades.clone(),
        };
        let required = assignment.hours.unwrap_or(0);

        for class_id in expand_targets(store, &targets) {
            let assigned = store
                .placements()
                .iter()
                .filter(|p| {
                    p.teacher() == Some(teacher_id)
                        && p.subject == assignment.subject
                        && p.class_id.as_str() == class_id
                })
                .count() as u32;
            let parsed = ClassId::parse(&class_id);
            for i in 0..required.saturating_sub(assigned) {
                blocks.push(ClassBlock {
                    id: format!("{teacher_id}-{class_id}-{}-{i}", assignment.subject),
                    grade: parsed.grade().unwrap_or(0),
                    class_num: parsed.class_number().unwrap_or(0),
                    class_id: class_id.clone(),
                    subject: assignment.subject.clone(),
                    teacher_id: teacher_id.to_string(),
                    required_sessions: required,
                    assigned_sessions: assigned,
                    room_id: assignment.room_id.clone().filter(|r| !r.is_empty()),
                });
            }
        }
    }
    blocks
}

/// Unfulfilled blocks paired with the conflict each would raise at one
/// cell of the teacher's grid. The teacher's own placement in that cell is
/// left out of the check since assigning a block replaces it.
pub fn blocks_for_cell(store: &Store, teacher_id: &str, day: Day, period: u8) -> Vec<CellCandidate> {
    let background: Vec<Placement> = store
        .placements()
        .iter()
        .filter(|p| !(p.teacher() == Some(teacher_id) && p.day == day && p.period == period))
        .cloned()
        .collect();

    unfulfilled_blocks(store, teacher_id)
        .into_iter()
        .map(|block| {
            let mut candidate = Placement::new("temp-check", day, period, &block.class_id, &block.subject)
                .with_teacher(teacher_id);
            candidate.room_id = block.room_id.clone();
            let conflict =
                conflict::check_conflict(&candidate, &background, store.policies(), store.rooms());
            CellCandidate { block, conflict }
        })
        .collect()
}
