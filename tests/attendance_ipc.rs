
use serde_json::json;
use test_support::{request_err, request_ok, spawn_sidecar, temp_dir};

#[test]
fn attendance_last_write_wins_per_date() {
    let workspace = temp_dir("parkourd-attendance");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "attendance.set",
        json!({ "date": "2024-06-03", "studentId": "stu-1", "status": "present" }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "attendance.set",
        json!({ "date": "2024-06-03", "studentId": "stu-1", "status": "late" }),
    );
    let got = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "attendance.get",
        json!({ "date": "2024-06-03" }),
    );
    assert_eq!(got["statuses"], json!({ "stu-1": "late" }));

    let other = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "attendance.get",
        json!({ "date": "2024-06-04" }),
    );
    assert_eq!(other["statuses"], json!({}));

    let code = request_err(
        &mut stdin,
        &mut reader,
        "6",
        "attendance.set",
        json!({ "date": "2024-06-03", "studentId": "stu-1", "status": "sick" }),
    );
    assert_eq!(code, "bad_params");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "daily.setAssignment",
        json!({ "date": "2024-06-03", "slotId": "segunda-0900", "studentIds": ["stu-1", "stu-2"] }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "attendance.set",
        json!({ "date": "2024-06-03", "studentId": "stu-2", "status": "absent" }),
    );
    let day = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "daily.get",
        json!({ "date": "2024-06-03" }),
    );
    assert_eq!(day["summary"]["totalStudents"], json!(2));
    assert_eq!(day["summary"]["checkedIn"], json!(1));
    assert_eq!(day["summary"]["absent"], json!(1));

    let _ = std::fs::remove_dir_all(workspace);
}
