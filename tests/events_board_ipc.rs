
use serde_json::json;
use test_support::{request_err, request_ok, spawn_sidecar, temp_dir};

fn column_titles(board: &serde_json::Value, column: &str) -> Vec<String> {
    board["columns"]
        .as_array()
        .and_then(|cols| cols.iter().find(|c| c["id"] == json!(column)))
        .and_then(|c| c["tasks"].as_array())
        .map(|tasks| {
            tasks
                .iter()
                .filter_map(|t| t["title"].as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn board_drag_and_calendar() {
    let workspace = temp_dir("parkourd-events");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let a = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "events.addTask",
        json!({ "columnId": "ideas", "title": " Jam de sábado ", "date": "2024-06-15" }),
    );
    let a_id = a["task"]["id"].as_str().expect("task id").to_string();
    assert_eq!(a["task"]["title"], json!("Jam de sábado"));
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "events.addTask",
        json!({ "columnId": "ideas", "title": "Workshop", "date": "2024-06-22" }),
    );
    let c = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "events.addTask",
        json!({ "columnId": "planning", "title": "Campeonato", "date": "2024-06-15" }),
    );
    let c_id = c["task"]["id"].as_str().expect("task id").to_string();

    let code = request_err(
        &mut stdin,
        &mut reader,
        "5",
        "events.addTask",
        json!({ "columnId": "backlog", "title": "x", "date": "2024-06-15" }),
    );
    assert_eq!(code, "bad_params");

    // Card dropped on another card lands before it.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "events.dragStart",
        json!({ "activeId": a_id }),
    );
    let res = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "events.dragEnd",
        json!({ "overId": c_id }),
    );
    assert_eq!(res["applied"], json!(true));
    let board = request_ok(&mut stdin, &mut reader, "8", "events.board", json!({}));
    assert_eq!(column_titles(&board, "ideas"), vec!["Workshop"]);
    assert_eq!(column_titles(&board, "planning"), vec!["Jam de sábado", "Campeonato"]);
    assert_eq!(board["columns"][3]["title"], json!("Concluído"));

    // Dropping on an empty column appends there.
    let res = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "events.dragEnd",
        json!({ "activeId": c_id, "overId": "done" }),
    );
    assert_eq!(res["plan"]["target"], json!("done"));
    let res = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "events.dragEnd",
        json!({ "activeId": c_id }),
    );
    assert_eq!(res["reason"], json!("no_target"));

    let cal = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "events.calendar",
        json!({ "month": "2024-06" }),
    );
    let cells = cal["cells"].as_array().expect("cells");
    // June 2024 starts on a Saturday.
    assert_eq!(cells.len(), 35);
    assert_eq!(cells[4]["iso"], json!(null));
    assert_eq!(cells[5]["iso"], json!("2024-06-01"));
    let fifteenth = &cells[5 + 14];
    assert_eq!(fifteenth["day"], json!(15));
    assert_eq!(fifteenth["events"].as_array().map(|e| e.len()), Some(2));

    let on_day = request_ok(
        &mut stdin,
        &mut reader,
        "12",
        "events.forDate",
        json!({ "date": "2024-06-22" }),
    );
    assert_eq!(on_day["events"][0]["title"], json!("Workshop"));
    assert_eq!(on_day["events"][0]["columnId"], json!("ideas"));

    let code = request_err(
        &mut stdin,
        &mut reader,
        "13",
        "events.calendar",
        json!({ "month": "2024-13" }),
    );
    assert_eq!(code, "bad_params");

    let _ = std::fs::remove_dir_all(workspace);
}
