use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_schooldeskd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn schooldeskd");
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
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn student_fields() -> serde_json::Value {
    json!({
        "firstName": "Mia",
        "lastName": "Nguyen",
        "email": "mia.nguyen@school.edu",
        "phone": "555-0199",
        "gradeLevel": "9",
        "dateOfBirth": "2011-04-18",
        "enrollmentDate": "2026-01-05",
        "status": "active"
    })
}

#[test]
fn create_get_update_delete_round_trip() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.openMemory",
        json!({}),
    );

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({ "fields": student_fields() }),
    );
    assert_eq!(created["id"], json!(1));
    assert_eq!(created["firstName"], json!("Mia"));

    // getById returns the input plus the assigned id.
    let fetched = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.get",
        json!({ "id": 1 }),
    );
    assert_eq!(fetched, created);

    // Partial update touches only the provided fields.
    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "students.update",
        json!({ "id": 1, "fields": { "phone": "555-0200", "status": "inactive" } }),
    );
    assert_eq!(updated["phone"], json!("555-0200"));
    assert_eq!(updated["status"], json!("inactive"));
    assert_eq!(updated["email"], json!("mia.nguyen@school.edu"));
    assert_eq!(updated["gradeLevel"], json!("9"));

    let deleted = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "students.delete",
        json!({ "id": 1 }),
    );
    assert_eq!(deleted["phone"], json!("555-0200"));

    let resp = request(
        &mut stdin,
        &mut reader,
        "6",
        "students.get",
        json!({ "id": 1 }),
    );
    assert_eq!(resp["error"]["code"], json!("not_found"));
}

#[test]
fn ids_continue_from_the_highest_assigned() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.openMemory",
        json!({}),
    );

    for id in ["2", "3"] {
        request_ok(
            &mut stdin,
            &mut reader,
            id,
            "students.create",
            json!({ "fields": student_fields() }),
        );
    }
    request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "students.delete",
        json!({ "id": 1 }),
    );
    let third = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "students.create",
        json!({ "fields": student_fields() }),
    );
    assert_eq!(third["id"], json!(3));
}

#[test]
fn malformed_fields_are_rejected_not_stored() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.openMemory",
        json!({}),
    );

    let resp = request(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({ "fields": { "firstName": "Only" } }),
    );
    assert_eq!(resp["error"]["code"], json!("invalid_record"));

    let resp = request(
        &mut stdin,
        &mut reader,
        "3",
        "students.create",
        json!({ "fields": { "gradeLevel": "13" } }),
    );
    assert_eq!(resp["error"]["code"], json!("invalid_record"));

    let students = request_ok(&mut stdin, &mut reader, "4", "students.list", json!({}));
    assert_eq!(students.as_array().map(|a| a.len()), Some(0));
}

#[test]
fn update_and_delete_of_missing_ids_are_not_found() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.openMemory",
        json!({}),
    );

    let resp = request(
        &mut stdin,
        &mut reader,
        "2",
        "students.update",
        json!({ "id": 42, "fields": { "phone": "555-0000" } }),
    );
    assert_eq!(resp["error"]["code"], json!("not_found"));

    let resp = request(
        &mut stdin,
        &mut reader,
        "3",
        "students.delete",
        json!({ "id": 42 }),
    );
    assert_eq!(resp["error"]["code"], json!("not_found"));
}

#[test]
fn enrollment_links_drive_membership_views() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.openMemory",
        json!({}),
    );

    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({ "fields": student_fields() }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "classes.create",
        json!({ "fields": {
            "name": "Chemistry",
            "subject": "Science",
            "period": "2",
            "room": "115"
        }}),
    );

    let empty = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "students.byClass",
        json!({ "classId": 1 }),
    );
    assert_eq!(empty.as_array().map(|a| a.len()), Some(0));

    let link = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "enrollment.enroll",
        json!({ "studentId": 1, "classId": 1 }),
    );
    assert_eq!(link["studentId"], json!(1));

    // Enrolling again returns the same link; no duplicate is created.
    let again = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "enrollment.enroll",
        json!({ "studentId": 1, "classId": 1 }),
    );
    assert_eq!(again["id"], link["id"]);
    let links = request_ok(&mut stdin, &mut reader, "7", "enrollment.list", json!({}));
    assert_eq!(links.as_array().map(|a| a.len()), Some(1));

    let members = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "students.byClass",
        json!({ "classId": 1 }),
    );
    assert_eq!(members.as_array().map(|a| a.len()), Some(1));

    let classes = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "enrollment.forStudent",
        json!({ "studentId": 1 }),
    );
    assert_eq!(classes[0]["name"], json!("Chemistry"));

    request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "enrollment.withdraw",
        json!({ "studentId": 1, "classId": 1 }),
    );
    let resp = request(
        &mut stdin,
        &mut reader,
        "11",
        "enrollment.withdraw",
        json!({ "studentId": 1, "classId": 1 }),
    );
    assert_eq!(resp["error"]["code"], json!("not_found"));
}
