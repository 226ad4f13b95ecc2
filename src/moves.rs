use crate::bell;
use crate::conflict::{self, Conflict};
use crate::model::{Day, Placement};
use crate::store::{Store, StoreError};
use serde::Serialize;
use tracing::debug;

/// Outcome of dragging a placement to another cell.
///
/// When the placement's teacher already teaches at the target cell the two
/// placements trade cells.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovePlan {
    pub source_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swapped_id: Option<String>,
    pub day: Day,
    pub period: u8,
    /// Set when a moved placement would land on a non-class block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_reason: Option<String>,
    pub conflicts: Vec<Conflict>,
    #[serde(skip)]
    updates: Vec<Placement>,
}

impl MovePlan {
    pub fn has_conflict(&self) -> bool {
        self.conflicts.iter().any(|c| c.has_conflict)
    }

    #[allow(dead_code)]
    pub fn is_clean(&self) -> bool {
        self.blocked_reason.is_none() && !self.has_conflict()
    }

    /// Writes the plan. Conflicts can be forced; non-class blocks cannot.
    pub fn apply(self, store: &mut Store, force: bool) -> bool {
        if self.blocked_reason.is_some() || (self.has_conflict() && !force) {
            return false;
        }
        for p in self.updates {
            debug!(id = %p.id, day = %p.day, period = p.period, "placement moved");
            store.update_placement(p);
        }
        true
    }
}

fn blocked(store: &Store, placement: &Placement, period: u8) -> Option<String> {
    if bell::is_blocked_for_grade(store.school(), placement.class_id.grade(), period) {
        Some(format!("{period}교시 is not a class period for {}", placement.class_id))
    } else {
        None
    }
}

pub fn plan_move(store: &Store, placement_id: &str, day: Day, period: u8) -> Result<MovePlan, StoreError> {
    let source = store
        .placement(placement_id)
        .ok_or_else(|| StoreError::NotFound {
            kind: "placement",
            id: placement_id.to_string(),
        })?
        .clone();
    if source.day == day && source.period == period {
        return Err(StoreError::Invalid("target cell is the source cell".to_string()));
    }

    let swapped = source.teacher().and_then(|teacher| {
        store
            .placements()
            .iter()
            .find(|p| p.teacher() == Some(teacher) && p.day == day && p.period == period)
            .cloned()
    });

    let background: Vec<Placement> = store
        .placements()
        .iter()
        .filter(|p| p.id != source.id && Some(&p.id) != swapped.as_ref().map(|s| &s.id))
        .cloned()
        .collect();

    let mut moved = source.clone();
    moved.day = day;
    moved.period = period;
    let mut blocked_reason = blocked(store, &source, period);
    let mut conflicts = vec![conflict::check_conflict(
        &moved,
        &background,
        store.policies(),
        store.rooms(),
    )];
    let mut updates = vec![moved];

    if let Some(other) = swapped.as_ref() {
        let mut back = other.clone();
        back.day = source.day;
        back.period = source.period;
        if blocked_reason.is_none() {
            blocked_reason = blocked(store, other, source.period);
        }
        conflicts.push(conflict::check_conflict(
            &back,
            &background,
            store.policies(),
            store.rooms(),
        ));
        updates.push(back);
    }

    Ok(MovePlan {
        source_id: source.id,
        swapped_id: swapped.map(|s| s.id),
        day,
        period,
        blocked_reason,
        conflicts,
        updates,
    })
}
