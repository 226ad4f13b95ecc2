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

fn science_teacher() -> serde_json::Value {
    json!({
        "teacher": {
            "id": "T1",
            "name": "과학B",
            "color": "pastel-blue",
            "assignments": [
                { "subject": "과학", "roomId": "sci2", "targets": ["3-1", "3-2"], "hours": 2 }
            ]
        }
    })
}

#[test]
fn unfulfilled_blocks_run_out_as_sessions_are_placed() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let created = request_ok(&mut stdin, &mut reader, "t", "teachers.create", science_teacher());
    assert_eq!(created["teacherId"], "T1");

    let blocks = request_ok(
        &mut stdin,
        &mut reader,
        "b0",
        "blocks.unfulfilled",
        json!({ "teacherId": "T1" }),
    );
    let list = blocks["blocks"].as_array().expect("blocks");
    assert_eq!(list.len(), 4);
    assert_eq!(list[0]["classId"], "3-1");
    assert_eq!(list[0]["roomId"], "sci2");
    assert_eq!(list[0]["requiredSessions"], 2);

    let cells = [("월", 1, "3-1"), ("화", 1, "3-1"), ("월", 2, "3-2"), ("화", 2, "3-2")];
    for (i, (day, period, class)) in cells.into_iter().enumerate() {
        let out = request_ok(
            &mut stdin,
            &mut reader,
            &format!("p{i}"),
            "placements.add",
            json!({ "placement": { "day": day, "period": period, "classId": class, "subject": "과학", "teacherId": "T1", "roomId": "sci2" } }),
        );
        assert_eq!(out["applied"], true);
    }

    let done = request_ok(
        &mut stdin,
        &mut reader,
        "b1",
        "blocks.unfulfilled",
        json!({ "teacherId": "T1" }),
    );
    assert_eq!(done["blocks"], json!([]));

    let unknown = request_ok(
        &mut stdin,
        &mut reader,
        "b2",
        "blocks.unfulfilled",
        json!({ "teacherId": "ghost" }),
    );
    assert_eq!(unknown["blocks"], json!([]));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn cell_candidates_carry_their_conflicts() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(&mut stdin, &mut reader, "t", "teachers.create", science_teacher());
    request_ok(
        &mut stdin,
        &mut reader,
        "busy",
        "placements.add",
        json!({ "placement": { "id": "busy", "day": "수", "period": 2, "classId": "3-2", "subject": "국어" } }),
    );

    let cands = request_ok(
        &mut stdin,
        &mut reader,
        "c",
        "blocks.forCell",
        json!({ "teacherId": "T1", "day": "수", "period": 2 }),
    );
    let list = cands["candidates"].as_array().expect("candidates");
    assert_eq!(list.len(), 4);
    for cand in list {
        let expected = cand["block"]["classId"] == "3-2";
        assert_eq!(cand["conflict"]["hasConflict"], expected, "{cand}");
    }

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn moving_onto_own_placement_swaps_cells() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(
        &mut stdin,
        &mut reader,
        "a",
        "placements.add",
        json!({ "placement": { "id": "a", "day": "월", "period": 1, "classId": "3-1", "subject": "영어", "teacherId": "t1" } }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "b",
        "placements.add",
        json!({ "placement": { "id": "b", "day": "화", "period": 3, "classId": "4-1", "subject": "영어", "teacherId": "t1" } }),
    );

    let moved = request_ok(
        &mut stdin,
        &mut reader,
        "m",
        "placements.move",
        json!({ "id": "a", "day": "화", "period": 3 }),
    );
    assert_eq!(moved["applied"], true);
    assert_eq!(moved["plan"]["swappedId"], "b");

    let a = request_ok(
        &mut stdin,
        &mut reader,
        "la",
        "placements.list",
        json!({ "classId": "3-1" }),
    );
    assert_eq!(a["placements"][0]["day"], "화");
    assert_eq!(a["placements"][0]["period"], 3);
    let b = request_ok(
        &mut stdin,
        &mut reader,
        "lb",
        "placements.list",
        json!({ "classId": "4-1" }),
    );
    assert_eq!(b["placements"][0]["day"], "월");
    assert_eq!(b["placements"][0]["period"], 1);

    let same = request(
        &mut stdin,
        &mut reader,
        "same",
        "placements.move",
        json!({ "id": "a", "day": "화", "period": 3 }),
    );
    assert_eq!(same["error"]["code"], "bad_params");
    let missing = request(
        &mut stdin,
        &mut reader,
        "missing",
        "placements.move",
        json!({ "id": "zzz", "day": "화", "period": 3 }),
    );
    assert_eq!(missing["error"]["code"], "not_found");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn moving_into_a_class_conflict_needs_force() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(
        &mut stdin,
        &mut reader,
        "a",
        "placements.add",
        json!({ "placement": { "id": "a", "day": "월", "period": 1, "classId": "3-1", "subject": "체육", "teacherId": "t2" } }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "h",
        "placements.add",
        json!({ "placement": { "id": "h", "day": "목", "period": 4, "classId": "3-1", "subject": "국어" } }),
    );

    let refused = request_ok(
        &mut stdin,
        &mut reader,
        "m1",
        "placements.move",
        json!({ "id": "a", "day": "목", "period": 4 }),
    );
    assert_eq!(refused["applied"], false);
    assert_eq!(refused["plan"]["conflicts"][0]["hasConflict"], true);

    let forced = request_ok(
        &mut stdin,
        &mut reader,
        "m2",
        "placements.move",
        json!({ "id": "a", "day": "목", "period": 4, "force": true }),
    );
    assert_eq!(forced["applied"], true);

    let scan = request_ok(&mut stdin, &mut reader, "s", "conflicts.scan", json!({}));
    assert_eq!(scan["placementIds"], json!(["a", "h"]));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn teacher_load_counts_placed_sessions_against_the_cap() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(&mut stdin, &mut reader, "t", "teachers.create", science_teacher());
    for (i, subject) in ["과학", "과학", "미배정"].into_iter().enumerate() {
        request_ok(
            &mut stdin,
            &mut reader,
            &format!("p{i}"),
            "placements.add",
            json!({ "placement": { "day": "금", "period": i + 1, "classId": "3-1", "subject": subject, "teacherId": "T1" } }),
        );
    }

    let load = request_ok(&mut stdin, &mut reader, "l", "teachers.load", json!({ "id": "T1" }));
    assert_eq!(load["load"], json!({ "assigned": 2, "max": 20, "over": false }));

    let mut capped = science_teacher();
    capped["teacher"]["maxHours"] = json!(1);
    request_ok(&mut stdin, &mut reader, "u", "teachers.update", capped);
    let over = request_ok(&mut stdin, &mut reader, "l2", "teachers.load", json!({ "id": "T1" }));
    assert_eq!(over["load"]["over"], true);

    let all = request_ok(&mut stdin, &mut reader, "all", "teachers.load", json!({}));
    let loads = all["loads"].as_array().expect("loads");
    assert!(loads.iter().any(|l| l["teacherId"] == "T1" && l["load"]["max"] == 1));

    let missing = request(&mut stdin, &mut reader, "m", "teachers.load", json!({ "id": "ghost" }));
    assert_eq!(missing["error"]["code"], "not_found");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn homeroom_assign_replaces_homeroom_and_respects_locked_cells() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let first = request_ok(
        &mut stdin,
        &mut reader,
        "h1",
        "placements.assignHomeroom",
        json!({ "classId": "2-1", "day": "월", "period": 3, "subject": "국어" }),
    );
    let second = request_ok(
        &mut stdin,
        &mut reader,
        "h2",
        "placements.assignHomeroom",
        json!({ "classId": "2-1", "day": "월", "period": 3, "subject": "수학" }),
    );
    assert_eq!(second["replacedId"], first["placementId"]);
    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "list",
        "placements.list",
        json!({ "classId": "2-1" }),
    );
    assert_eq!(listed["placements"].as_array().map(|a| a.len()), Some(1));
    assert_eq!(listed["placements"][0]["subject"], "수학");

    request_ok(
        &mut stdin,
        &mut reader,
        "eng",
        "placements.add",
        json!({ "placement": { "id": "eng", "day": "화", "period": 1, "classId": "2-1", "subject": "영어", "teacherId": "t1" } }),
    );
    let specialist = request(
        &mut stdin,
        &mut reader,
        "h3",
        "placements.assignHomeroom",
        json!({ "classId": "2-1", "day": "화", "period": 1, "subject": "국어" }),
    );
    assert_eq!(specialist["error"]["code"], "locked");
    assert_eq!(specialist["error"]["details"]["placementId"], "eng");

    request_ok(
        &mut stdin,
        &mut reader,
        "blk",
        "placements.add",
        json!({ "placement": { "id": "blk", "day": "수", "period": 2, "classId": "2통합", "subject": "체육" } }),
    );
    let grade_block = request(
        &mut stdin,
        &mut reader,
        "h4",
        "placements.assignHomeroom",
        json!({ "classId": "2-3", "day": "수", "period": 2, "subject": "국어" }),
    );
    assert_eq!(grade_block["error"]["code"], "locked");
    assert_eq!(grade_block["error"]["details"]["placementId"], "blk");

    drop(stdin);
    let _ = child.wait();
}
