use std::path::PathBuf;
use std::process::Command;

fn temp_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "homes-replay-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn write_temp(label: &str, contents: &str) -> PathBuf {
    let path = temp_path(label);
    std::fs::write(&path, contents).expect("write fixture");
    path
}

const EVENTS: &str = r#"
# Fill a sack holding 10 with 5 planks, then take a Varrock contract.
{"type":"inventory_changed","container_id":93,"items":[{"id":24882,"quantity":1},{"id":960,"quantity":5}]}
{"type":"menu_action","option":"Fill","target":"Plank sack","item_id":24882}
{"type":"inventory_changed","container_id":93,"items":[{"id":24882,"quantity":1}]}
{"type":"chat_line","channel":"dialog","text":"Please could you go see <col=ff0000>Jeff </col>in <col=ff0000>Varrock</col>, they need some work done."}
{"type":"tick"}
"#;

const MARKERS: &str = r#"{
  "markers": [
    {"id": 1, "name": "Varrock house", "visible": false},
    {"id": 2, "name": "Falador house", "visible": true}
  ]
}"#;

const CONFIG: &str = r#"{"varrock_marker": "markers|null|1", "falador_marker": "markers|null|2"}"#;

#[test]
fn cli_replays_events_into_json_report() {
    let exe = env!("CARGO_BIN_EXE_homes-replay");
    let events = write_temp("events", EVENTS);
    let markers = write_temp("markers", MARKERS);
    let config = write_temp("config", CONFIG);
    let output_path = temp_path("report");

    let status = Command::new(exe)
        .arg("--events")
        .arg(&events)
        .arg("--markers")
        .arg(&markers)
        .arg("--config")
        .arg(&config)
        .args(["--estimate", "10", "--report", "json", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());

    let content = std::fs::read_to_string(output_path).expect("read output");
    let report: serde_json::Value = serde_json::from_str(&content).expect("json report");
    assert_eq!(report["final_state"]["estimate"], 15);
    assert_eq!(report["stored_estimate"], 15);
    assert_eq!(report["final_state"]["contract"]["npc"], "Jeff");
    assert_eq!(report["steps"].as_array().map(Vec::len), Some(5));

    let markers = report["markers"].as_array().expect("marker list");
    let visible = |id: i64| {
        markers
            .iter()
            .find(|m| m["id"] == id)
            .map(|m| m["visible"].clone())
    };
    assert_eq!(visible(1), Some(serde_json::Value::Bool(true)));
    assert_eq!(visible(2), Some(serde_json::Value::Bool(false)));
}

#[test]
fn cli_writes_markdown_summary() {
    let exe = env!("CARGO_BIN_EXE_homes-replay");
    let events = write_temp("md-events", EVENTS);
    let output_path = temp_path("md-report");
    let status = Command::new(exe)
        .arg("--events")
        .arg(&events)
        .args(["--estimate", "-1", "--report", "markdown", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("# Mahogany Homes Replay"));
    assert!(content.contains("- **Sack estimate**: unknown"));
}

#[test]
fn cli_fails_on_malformed_events() {
    let exe = env!("CARGO_BIN_EXE_homes-replay");
    let events = write_temp("bad-events", "{\"type\":\"tick\"}\nnot json\n");
    let output = Command::new(exe)
        .arg("--events")
        .arg(&events)
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 2"));
}
