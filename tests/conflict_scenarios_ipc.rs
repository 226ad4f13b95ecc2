use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_timetabled");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn timetabled");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(value["ok"], true, "{method} failed: {value}");
    value["result"].clone()
}

fn kinds(conflict: &serde_json::Value) -> Vec<String> {
    conflict["kinds"]
        .as_array()
        .expect("kinds")
        .iter()
        .filter_map(|k| k["kind"].as_str().map(str::to_string))
        .collect()
}

#[test]
fn co_teacher_double_booking_is_rejected_until_forced() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let first = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "placements.add",
        json!({ "placement": { "id": "a", "day": "월", "period": 1, "classId": "3-1", "subject": "영어", "teacherId": "t1" } }),
    );
    assert_eq!(first["applied"], true);
    assert_eq!(first["conflict"]["hasConflict"], false);

    let second = json!({ "id": "b", "day": "월", "period": 1, "classId": "3-2", "subject": "영어", "teacherId": "t1" });
    let rejected = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "placements.add",
        json!({ "placement": second }),
    );
    assert_eq!(rejected["applied"], false);
    assert_eq!(kinds(&rejected["conflict"]), vec!["teacherDoubleBooked"]);
    assert_eq!(rejected["conflict"]["conflictingPlacements"][0]["id"], "a");
    assert!(rejected["conflict"]["reason"]
        .as_str()
        .unwrap_or_default()
        .contains("teacher double-booked"));

    // A dry-run check reports the same collision without writing.
    let check = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "conflicts.check",
        json!({ "placement": second }),
    );
    assert_eq!(check["conflict"]["hasConflict"], true);

    let forced = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "placements.add",
        json!({ "placement": second, "force": true }),
    );
    assert_eq!(forced["applied"], true);
    assert_eq!(forced["conflict"]["hasConflict"], true);

    let scan = request_ok(&mut stdin, &mut reader, "5", "conflicts.scan", json!({}));
    assert_eq!(scan["placementIds"], json!(["a", "b"]));

    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "placements.list",
        json!({ "day": "월", "teacherId": "t1" }),
    );
    assert_eq!(listed["placements"].as_array().map(|a| a.len()), Some(2));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn room_capacity_counts_existing_occupants() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    for (i, class) in ["5-1", "5-2"].into_iter().enumerate() {
        let out = request_ok(
            &mut stdin,
            &mut reader,
            &format!("gym{i}"),
            "placements.add",
            json!({ "placement": { "day": "화", "period": 2, "classId": class, "subject": "체육", "roomId": "gym" } }),
        );
        assert_eq!(out["applied"], true, "{class} should fit in a room of two");
    }

    let third = request_ok(
        &mut stdin,
        &mut reader,
        "gym3",
        "placements.add",
        json!({ "placement": { "day": "화", "period": 2, "classId": "5-3", "subject": "체육", "roomId": "gym" } }),
    );
    assert_eq!(third["applied"], false);
    assert_eq!(third["conflict"]["kinds"][0]["kind"], "roomOverCapacity");
    assert_eq!(third["conflict"]["kinds"][0]["roomName"], "강당");
    assert_eq!(
        third["conflict"]["conflictingPlacements"].as_array().map(|a| a.len()),
        Some(2)
    );

    // A room of one rejects the second occupant.
    request_ok(
        &mut stdin,
        &mut reader,
        "sci1",
        "placements.add",
        json!({ "placement": { "day": "목", "period": 3, "classId": "6-1", "subject": "과학", "roomId": "sci1" } }),
    );
    let sci2 = request_ok(
        &mut stdin,
        &mut reader,
        "sci2",
        "conflicts.check",
        json!({ "placement": { "day": "목", "period": 3, "classId": "6-2", "subject": "과학", "roomId": "sci1" } }),
    );
    assert_eq!(sci2["conflict"]["hasConflict"], true);

    // Unknown rooms carry no constraint.
    let nowhere = request_ok(
        &mut stdin,
        &mut reader,
        "nowhere",
        "conflicts.check",
        json!({ "placement": { "day": "화", "period": 2, "classId": "5-4", "subject": "체육", "roomId": "attic" } }),
    );
    assert_eq!(nowhere["conflict"]["hasConflict"], false);

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn aggregate_overlap_grant_and_cross_subject_block() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "placements.add",
        json!({ "placement": { "id": "lvl", "day": "수", "period": 3, "classId": "4레벨", "subject": "영어", "roomId": "eng2" } }),
    );

    let same_subject = json!({ "day": "수", "period": 3, "classId": "4-2", "subject": "영어" });
    let before = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "conflicts.check",
        json!({ "placement": same_subject }),
    );
    assert_eq!(kinds(&before["conflict"]), vec!["classDoubleBooked"]);

    let allowed = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "overlap.check",
        json!({ "subject": "영어", "grade": 4 }),
    );
    assert_eq!(allowed["allowed"], false);

    let granted = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "overlap.grant",
        json!({ "subject": "영어", "grade": 4 }),
    );
    assert_eq!(granted["changed"], true);
    let again = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "overlap.grant",
        json!({ "subject": "영어", "grade": 4 }),
    );
    assert_eq!(again["changed"], false);

    let after = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "conflicts.check",
        json!({ "placement": same_subject }),
    );
    assert_eq!(after["conflict"]["hasConflict"], false);

    // Other grades are untouched by the grant.
    request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "placements.add",
        json!({ "placement": { "day": "수", "period": 4, "classId": "5통합", "subject": "영어" } }),
    );
    let grade5 = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "conflicts.check",
        json!({ "placement": { "day": "수", "period": 4, "classId": "5-1", "subject": "영어" } }),
    );
    assert_eq!(grade5["conflict"]["hasConflict"], true);

    // Different subjects never share a population, grant or not.
    let cross = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "conflicts.check",
        json!({ "placement": { "day": "수", "period": 3, "classId": "4-2", "subject": "국어" } }),
    );
    assert_eq!(kinds(&cross["conflict"]), vec!["classDoubleBookedOtherSubject"]);

    // Sentinel classes never take part in class checks.
    request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "placements.add",
        json!({ "placement": { "day": "금", "period": 1, "classId": "미배정", "subject": "국어" } }),
    );
    let sentinel = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "conflicts.check",
        json!({ "placement": { "day": "금", "period": 1, "classId": "미배정", "subject": "수학" } }),
    );
    assert_eq!(sentinel["conflict"]["hasConflict"], false);

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn batch_and_removal_semantics() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let batch = json!([
        { "day": "목", "period": 5, "classId": "6-1", "subject": "체육", "roomId": "gym" },
        { "day": "목", "period": 5, "classId": "6-2", "subject": "체육", "roomId": "gym" },
        { "day": "목", "period": 5, "classId": "6-3", "subject": "체육", "roomId": "gym" }
    ]);
    let rejected = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "placements.assignBatch",
        json!({ "placements": batch }),
    );
    assert_eq!(rejected["applied"], false);
    assert_eq!(rejected["reports"][2]["hasConflict"], true);
    let empty = request_ok(&mut stdin, &mut reader, "2", "placements.list", json!({}));
    assert_eq!(empty["placements"], json!([]));

    let forced = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "placements.assignBatch",
        json!({ "placements": batch, "force": true }),
    );
    assert_eq!(forced["applied"], true);
    let ids: Vec<String> = forced["placementIds"]
        .as_array()
        .expect("ids")
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();
    assert_eq!(ids.len(), 3);

    let removed = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "placements.remove",
        json!({ "id": ids[0] }),
    );
    assert_eq!(removed["removed"], true);
    let twice = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "placements.remove",
        json!({ "id": ids[0] }),
    );
    assert_eq!(twice["removed"], false);
    let left = request_ok(&mut stdin, &mut reader, "6", "placements.list", json!({}));
    assert_eq!(left["placements"].as_array().map(|a| a.len()), Some(2));

    let dup = request(
        &mut stdin,
        &mut reader,
        "7",
        "placements.add",
        json!({ "placement": { "id": ids[1], "day": "금", "period": 1, "classId": "1-1", "subject": "국어" } }),
    );
    assert_eq!(dup["error"]["code"], "duplicate_id");

    drop(stdin);
    let _ = child.wait();
}
