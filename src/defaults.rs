use crate::model::{
    BellSchedule, PeriodKind, PeriodSlot, Room, SchoolInfo, Teacher, TeacherAssignment,
    TeacherLayoutConfig,
};
use std::collections::BTreeMap;

pub const SCHOOL_NAME: &str = "행복초등학교";

pub const SUBJECTS: [&str; 11] = [
    "국어", "수학", "사회", "과학", "영어", "체육", "음악", "미술", "도덕", "실과", "창체",
];

const SCHEDULE_A: [(u8, &str, &str); 6] = [
    (1, "09:00", "09:40"),
    (2, "09:50", "10:30"),
    (3, "10:40", "11:20"),
    (4, "11:30", "12:10"),
    (5, "13:00", "13:40"),
    (6, "13:50", "14:30"),
];

const SCHEDULE_B: [(u8, &str, &str); 6] = [
    (1, "09:00", "09:40"),
    (2, "09:50", "10:30"),
    (3, "10:40", "11:20"),
    (4, "11:30", "12:10"),
    (5, "13:10", "13:50"),
    (6, "14:00", "14:40"),
];

fn class_periods(rows: &[(u8, &str, &str)]) -> BTreeMap<u8, PeriodSlot> {
    rows.iter()
        .map(|(n, start, end)| {
            (
                *n,
                PeriodSlot {
                    start: start.to_string(),
                    end: end.to_string(),
                    name: Some(format!("{n}교시")),
                    kind: Some(PeriodKind::Class),
                },
            )
        })
        .collect()
}

pub fn bell_schedules() -> Vec<BellSchedule> {
    vec![
        BellSchedule {
            id: "schedule-a".to_string(),
            name: "기본 시정표".to_string(),
            target_grades: vec![1, 2, 3, 4, 5, 6],
            periods: class_periods(&SCHEDULE_A),
        },
        BellSchedule {
            id: "schedule-b".to_string(),
            name: "시정표 B".to_string(),
            target_grades: vec![3, 4, 5, 6],
            periods: class_periods(&SCHEDULE_B),
        },
    ]
}

pub fn school_info() -> SchoolInfo {
    SchoolInfo {
        name: SCHOOL_NAME.to_string(),
        classes_per_grade: (1..=6).map(|g| (g, 4)).collect(),
        max_periods: [(1, 5), (2, 5), (3, 6), (4, 6), (5, 6), (6, 6)]
            .into_iter()
            .collect(),
        bell_schedules: bell_schedules(),
        has_distinct_schedules: false,
    }
}

pub fn rooms() -> Vec<Room> {
    [
        ("gym", "강당", 2),
        ("sci1", "과학실1", 1),
        ("sci2", "과학실2", 1),
        ("eng1", "영어1실", 1),
        ("eng2", "영어2실", 1),
        ("com", "컴퓨터실", 1),
        ("playground", "운동장", 3),
    ]
    .into_iter()
    .map(|(id, name, capacity)| Room {
        id: id.to_string(),
        name: name.to_string(),
        capacity,
    })
    .collect()
}

pub fn teachers() -> Vec<Teacher> {
    [
        ("t1", "영어A", "pastel-purple", "영어", "eng1"),
        ("t2", "체육A", "pastel-green", "체육", "gym"),
        ("t3", "과학A", "pastel-blue", "과학", "sci1"),
    ]
    .into_iter()
    .map(|(id, name, color, subject, room)| Teacher {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
        assignments: vec![TeacherAssignment {
            subject: subject.to_string(),
            room_id: Some(room.to_string()),
            targets: None,
            hours: None,
        }],
        max_hours: None,
        memo: None,
    })
    .collect()
}

pub fn subjects() -> Vec<String> {
    SUBJECTS.iter().map(|s| s.to_string()).collect()
}

pub fn layout() -> TeacherLayoutConfig {
    TeacherLayoutConfig {
        grades: (1..=6).map(|g| g.to_string()).collect(),
        ..TeacherLayoutConfig::default()
    }
}
