use crate::model::{BellSchedule, PeriodKind, PeriodSlot, SchoolInfo};
use chrono::NaiveTime;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodInfo {
    pub period: u8,
    pub start: String,
    pub end: String,
    pub label: String,
    pub kind: PeriodKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
}

/// Every period defined by any schedule, not only the active one, so a
/// period present in just one of two variants is never dropped.
pub fn all_period_numbers(schedules: &[BellSchedule]) -> Vec<u8> {
    schedules
        .iter()
        .flat_map(|s| s.periods.keys().copied())
        .collect::<BTreeSet<u8>>()
        .into_iter()
        .collect()
}

pub fn period_info(schedules: &[BellSchedule], schedule_index: usize, period: u8) -> Option<PeriodInfo> {
    let slot = schedules.get(schedule_index)?.periods.get(&period)?;
    Some(PeriodInfo {
        period,
        start: slot.start.clone(),
        end: slot.end.clone(),
        label: slot
            .name
            .clone()
            .unwrap_or_else(|| format!("{period}교시")),
        kind: slot.kind(),
        duration_minutes: duration_minutes(slot),
    })
}

/// Minutes between `start` and `end`; `None` when either is not `HH:MM`.
pub fn duration_minutes(slot: &PeriodSlot) -> Option<i64> {
    let start = NaiveTime::parse_from_str(slot.start.trim(), "%H:%M").ok()?;
    let end = NaiveTime::parse_from_str(slot.end.trim(), "%H:%M").ok()?;
    Some((end - start).num_minutes())
}

/// Index of the schedule a grade follows. Schedule 0 applies unless the
/// school runs distinct schedules and another one targets the grade.
pub fn schedule_index_for_grade(school: &SchoolInfo, grade: Option<u32>) -> Option<usize> {
    if school.bell_schedules.is_empty() {
        return None;
    }
    if school.has_distinct_schedules {
        if let Some(g) = grade.filter(|g| *g > 0) {
            if let Some(idx) = school
                .bell_schedules
                .iter()
                .position(|s| s.target_grades.contains(&g))
            {
                return Some(idx);
            }
        }
    }
    Some(0)
}

pub fn schedule_for_grade(school: &SchoolInfo, grade: Option<u32>) -> Option<&BellSchedule> {
    schedule_index_for_grade(school, grade).and_then(|i| school.bell_schedules.get(i))
}

/// Whether `period` is a non-class block in the schedule the grade follows.
pub fn is_blocked_for_grade(school: &SchoolInfo, grade: Option<u32>, period: u8) -> bool {
    schedule_for_grade(school, grade)
        .and_then(|s| s.periods.get(&period))
        .map(|p| p.kind() == PeriodKind::Etc)
        .unwrap_or(false)
}

/// Name of the non-class block at `period` in the first schedule, or in the
/// second one when the school runs distinct schedules.
pub fn blocked_label(school: &SchoolInfo, period: u8) -> Option<String> {
    let considered = if school.has_distinct_schedules { 2 } else { 1 };
    school
        .bell_schedules
        .iter()
        .take(considered)
        .filter_map(|s| s.periods.get(&period))
        .find(|p| p.kind() == PeriodKind::Etc)
        .map(|p| p.name.clone().unwrap_or_else(|| "기타".to_string()))
}
