use crate::bell;
use crate::class_key::ClassId;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::params::{parse_field, required_period, required_u32};
use crate::ipc::types::{AppState, Request};
use crate::model::{SchoolInfo, TeacherLayoutConfig, MAX_PERIOD};
use serde_json::json;
use tracing::info;

fn school_get(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "schoolInfo": state.store.school() }))
}

fn school_update(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let info: SchoolInfo = parse_field(&req.params, "schoolInfo")?;
    if info.name.trim().is_empty() {
        return Err(HandlerErr::bad_params("school name must not be empty"));
    }
    for schedule in &info.bell_schedules {
        if let Some(bad) = schedule
            .periods
            .keys()
            .find(|p| **p == 0 || **p > MAX_PERIOD)
        {
            return Err(HandlerErr::bad_params(format!(
                "schedule {} defines period {bad}; periods run 1..={MAX_PERIOD}",
                schedule.id
            )));
        }
    }
    if let Some((grade, max)) = info.max_periods.iter().find(|(_, m)| **m > MAX_PERIOD) {
        return Err(HandlerErr::bad_params(format!(
            "grade {grade} max periods {max} exceeds {MAX_PERIOD}"
        )));
    }
    info!(name = %info.name, schedules = info.bell_schedules.len(), "school info updated");
    state.store.set_school(info);
    Ok(json!({ "schoolInfo": state.store.school() }))
}

fn layout_get(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "teacherConfig": state.store.layout() }))
}

fn layout_update(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let layout: TeacherLayoutConfig = parse_field(&req.params, "teacherConfig")?;
    state.store.set_layout(layout);
    Ok(json!({ "teacherConfig": state.store.layout() }))
}

fn classes_list(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let labels = &state.store.layout().custom_labels;
    let classes: Vec<serde_json::Value> = state
        .store
        .class_list()
        .into_iter()
        .map(|raw| {
            let class_id = ClassId::parse(&raw);
            json!({
                "classId": raw,
                "grade": class_id.grade(),
                "classNum": class_id.class_number(),
                "label": class_id.display_label(labels)
            })
        })
        .collect();
    Ok(json!({ "classes": classes }))
}

fn bell_periods(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let school = state.store.school();
    let periods: Vec<serde_json::Value> = bell::all_period_numbers(&school.bell_schedules)
        .into_iter()
        .map(|period| {
            json!({
                "period": period,
                "blockedLabel": bell::blocked_label(school, period)
            })
        })
        .collect();
    Ok(json!({ "periods": periods }))
}

fn bell_period_info(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let index = required_u32(&req.params, "scheduleIndex")? as usize;
    let period = required_period(&req.params, "period")?;
    let info = bell::period_info(&state.store.school().bell_schedules, index, period);
    Ok(json!({ "info": info }))
}

fn bell_schedule_for_grade(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let grade = required_u32(&req.params, "grade")?;
    let school = state.store.school();
    let index = bell::schedule_index_for_grade(school, Some(grade));
    Ok(json!({
        "scheduleIndex": index,
        "schedule": bell::schedule_for_grade(school, Some(grade))
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "school.get" => school_get(state),
        "school.update" => school_update(state, req),
        "layout.get" => layout_get(state),
        "layout.update" => layout_update(state, req),
        "classes.list" => classes_list(state),
        "bell.periods" => bell_periods(state),
        "bell.periodInfo" => bell_period_info(state, req),
        "bell.scheduleForGrade" => bell_schedule_for_grade(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
