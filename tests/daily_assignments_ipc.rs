
use serde_json::json;
use test_support::{request_err, request_ok, slot_ids, spawn_sidecar, temp_dir};

#[test]
fn daily_requires_workspace() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let code = request_err(
        &mut stdin,
        &mut reader,
        "1",
        "daily.get",
        json!({ "date": "2024-06-03" }),
    );
    assert_eq!(code, "no_workspace");
}

#[test]
fn template_fallback_override_and_move_scenario() {
    let workspace = temp_dir("parkourd-daily");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let sched = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "schedule.day",
        json!({ "date": "2024-06-03" }),
    );
    assert_eq!(sched["day"], json!("segunda"));
    assert_eq!(sched["slots"].as_array().map(|a| a.len()), Some(6));
    assert_eq!(sched["slots"][0]["id"], json!("segunda-0900"));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "schedule.weeklyRoster.set",
        json!({ "day": "segunda", "slotId": "segunda-0900", "studentIds": ["stu-1", "stu-2"] }),
    );

    // No override yet: every Monday is seeded from the weekly roster.
    let day = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "daily.get",
        json!({ "date": "2024-06-03" }),
    );
    assert_eq!(day["hasOverride"], json!(false));
    assert_eq!(day["slots"].as_array().map(|a| a.len()), Some(6));
    assert_eq!(slot_ids(&day, "segunda-0900"), vec!["stu-1", "stu-2"]);
    assert!(slot_ids(&day, "segunda-1000").is_empty());

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "daily.moveStudent",
        json!({
            "date": "2024-06-03",
            "studentId": "stu-1",
            "fromSlotId": "segunda-0900",
            "toSlotId": "segunda-1000"
        }),
    );
    let day = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "daily.get",
        json!({ "date": "2024-06-03" }),
    );
    assert_eq!(day["hasOverride"], json!(true));
    assert_eq!(slot_ids(&day, "segunda-0900"), vec!["stu-2"]);
    assert_eq!(slot_ids(&day, "segunda-1000"), vec!["stu-1"]);

    let next_week = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "daily.get",
        json!({ "date": "2024-06-10" }),
    );
    assert_eq!(slot_ids(&next_week, "segunda-0900"), vec!["stu-1", "stu-2"]);

    // Setting the same list twice is the same as setting it once.
    for id in ["8", "9"] {
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            id,
            "daily.setAssignment",
            json!({ "date": "2024-06-04", "slotId": "terca-1600", "studentIds": ["stu-9"] }),
        );
    }
    let tuesday = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "daily.get",
        json!({ "date": "2024-06-04" }),
    );
    assert_eq!(slot_ids(&tuesday, "terca-1600"), vec!["stu-9"]);
    assert_eq!(tuesday["slots"].as_array().map(|a| a.len()), Some(7));

    let code = request_err(
        &mut stdin,
        &mut reader,
        "11",
        "daily.setAssignment",
        json!({ "date": "2024-06-04", "slotId": "segunda-0900", "studentIds": [] }),
    );
    assert_eq!(code, "bad_params");
    let code = request_err(
        &mut stdin,
        &mut reader,
        "12",
        "daily.get",
        json!({ "date": "03/06/2024" }),
    );
    assert_eq!(code, "bad_params");

    let sunday = request_ok(
        &mut stdin,
        &mut reader,
        "13",
        "daily.get",
        json!({ "date": "2024-06-09" }),
    );
    assert_eq!(sunday["slots"], json!([]));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn assignments_survive_restart() {
    let workspace = temp_dir("parkourd-daily-restart");
    {
        let (mut child, mut stdin, mut reader) = spawn_sidecar();
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
            "daily.setAssignment",
            json!({ "date": "2024-06-05", "slotId": "quarta-1830", "studentIds": ["a", "b"] }),
        );
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            "3",
            "attendance.set",
            json!({ "date": "2024-06-05", "studentId": "a", "status": "present" }),
        );
        drop(stdin);
        let _ = child.wait();
    }

    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let day = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "daily.get",
        json!({ "date": "2024-06-05" }),
    );
    assert_eq!(slot_ids(&day, "quarta-1830"), vec!["a", "b"]);
    assert_eq!(day["attendance"]["a"], json!("present"));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn weekly_occupancy_counts_each_day() {
    let workspace = temp_dir("parkourd-weekly");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let full: Vec<String> = (0..12).map(|i| format!("s{i}")).collect();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "daily.setAssignment",
        json!({ "date": "2024-06-07", "slotId": "sexta-1930", "studentIds": full }),
    );
    let week = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "weekly.occupancy",
        json!({ "date": "2024-06-05" }),
    );
    let days = week["days"].as_array().expect("days");
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["date"], json!("2024-06-03"));
    let friday = &days[4];
    assert_eq!(friday["day"], json!("sexta"));
    assert_eq!(friday["total"], json!(12));
    let slot = friday["slots"]
        .as_array()
        .and_then(|s| s.iter().find(|x| x["slotId"] == json!("sexta-1930")))
        .expect("sexta-1930");
    assert_eq!(slot["isFull"], json!(true));
    assert_eq!(slot["nearFull"], json!(true));

    let _ = std::fs::remove_dir_all(workspace);
}
