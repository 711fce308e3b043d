use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

fn vlist() -> Command {
    let mut cmd = Command::cargo_bin("vlist").unwrap();
    cmd.env_remove("VLIST_CONFIG").env_remove("VLIST_DEBUG_LOG");
    cmd
}

fn parse_json_output(output: &[u8]) -> Value {
    serde_json::from_str(&String::from_utf8_lossy(output)).expect("Failed to parse JSON output")
}

/// Config file in a fresh directory so the user's own config never leaks in.
fn config_file(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

fn scroll(config: &PathBuf, extra: &[&str]) -> Value {
    let output = vlist()
        .arg("--config")
        .arg(config)
        .arg("scroll")
        .args(extra)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    parse_json_output(&output)
}

fn row_texts(json: &Value) -> Vec<String> {
    json["data"]["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["text"].as_str().unwrap().to_string())
        .collect()
}

mod scroll_tests {
    use super::*;

    #[test]
    fn test_scroll_recycles_after_pool_fills() {
        let (_dir, config) = config_file("");
        let json = scroll(&config, &["--page-size", "2", "--moves", "ddd"]);

        assert!(json["success"].as_bool().unwrap());
        assert_eq!(row_texts(&json), vec!["item-2", "item-3", "item-4", "item-5"]);
        assert_eq!(json["data"]["start"], 1);
        assert_eq!(json["data"]["end"], 3);
        assert_eq!(json["data"]["pool_len"], 4);
        assert_eq!(json["data"]["pool_limit"], 4);
        assert_eq!(json["data"]["created"], 4);
    }

    #[test]
    fn test_scroll_down_then_up() {
        let (_dir, config) = config_file("");
        let json = scroll(
            &config,
            &[
                "--page-size",
                "2",
                "--element-height",
                "10",
                "--margin",
                "0",
                "--moves",
                "dddu",
            ],
        );

        assert_eq!(row_texts(&json), vec!["item-0", "item-1", "item-2", "item-3"]);
        let offsets: Vec<f64> = json["data"]["rows"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["offset"].as_f64().unwrap())
            .collect();
        assert_eq!(offsets, vec![0.0, 10.0, 20.0, 30.0]);
        assert_eq!(json["data"]["fetched"], serde_json::json!([0, 1, 2, 0]));
    }

    #[test]
    fn test_default_offsets_use_height_and_margin() {
        let (_dir, config) = config_file("");
        let json = scroll(&config, &["--page-size", "3"]);

        let offsets: Vec<f64> = json["data"]["rows"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["offset"].as_f64().unwrap())
            .collect();
        assert_eq!(offsets, vec![0.0, 112.0, 224.0]);
    }

    #[test]
    fn test_top_move_at_start_reports_at_top() {
        let (_dir, config) = config_file("");
        let json = scroll(&config, &["--page-size", "2", "--moves", "u"]);

        assert_eq!(json["data"]["events"], serde_json::json!(["at-top"]));
        assert!(row_texts(&json).is_empty());
    }

    #[test]
    fn test_bounded_source_reaches_end_of_data() {
        let (_dir, config) = config_file("");
        let json = scroll(
            &config,
            &["--page-size", "2", "--items", "3", "--moves", "ddd"],
        );

        assert_eq!(row_texts(&json), vec!["item-0", "item-1", "item-2"]);
        assert_eq!(json["data"]["events"][2], "end-of-data page=2");
        assert_eq!(json["data"]["fetched"], serde_json::json!([0, 1]));
    }

    #[test]
    fn test_short_page_while_recycling_releases_surplus_row() {
        let (_dir, config) = config_file("");
        let json = scroll(
            &config,
            &["--page-size", "2", "--items", "5", "--moves", "ddd"],
        );

        assert_eq!(row_texts(&json), vec!["item-2", "item-3", "item-4"]);
        assert_eq!(json["data"]["pool_len"], 3);
        let rows = json["data"]["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 3);
        let offsets: Vec<f64> = rows
            .iter()
            .map(|row| row["offset"].as_f64().unwrap())
            .collect();
        assert_eq!(offsets, vec![0.0, 112.0, 224.0]);
    }

    #[test]
    fn test_failed_page_leaves_window_unchanged() {
        let (_dir, config) = config_file("");
        let json = scroll(
            &config,
            &["--page-size", "2", "--fail-pages", "1", "--moves", "dd"],
        );

        assert_eq!(row_texts(&json), vec!["item-0", "item-1"]);
        assert_eq!(json["data"]["end"], 1);
        let last = json["data"]["events"][1].as_str().unwrap();
        assert!(last.starts_with("fetch-failed edge=bottom page=1"), "{last}");
    }

    #[test]
    fn test_config_file_sets_page_size() {
        let (_dir, config) = config_file("page_size = 3\npool_pages = 3\n");
        let json = scroll(&config, &["--moves", "dddd"]);

        assert_eq!(json["data"]["pool_limit"], 9);
        assert_eq!(json["data"]["pool_len"], 9);
        assert_eq!(json["data"]["start"], 1);
        assert_eq!(row_texts(&json).first().map(String::as_str), Some("item-3"));
    }

    #[test]
    fn test_flags_override_config_file() {
        let (_dir, config) = config_file("page_size = 3\n");
        let json = scroll(&config, &["--page-size", "1", "--moves", "dd"]);

        assert_eq!(row_texts(&json), vec!["item-0", "item-1"]);
    }
}

mod error_tests {
    use super::*;

    #[test]
    fn test_invalid_move_fails() {
        let (_dir, config) = config_file("");
        vlist()
            .arg("--config")
            .arg(&config)
            .args(["scroll", "--moves", "dxd"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid move 'x'"));
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let (_dir, config) = config_file("");
        let output = vlist()
            .arg("--config")
            .arg(&config)
            .args(["scroll", "--page-size", "0"])
            .assert()
            .failure()
            .get_output()
            .stderr
            .clone();

        let json = parse_json_output(&output);
        assert!(!json["success"].as_bool().unwrap());
        assert!(json["error"].as_str().unwrap().contains("page_size"));
    }

    #[test]
    fn test_single_page_pool_is_rejected() {
        let (_dir, config) = config_file("");
        vlist()
            .arg("--config")
            .arg(&config)
            .args(["scroll", "--pool-pages", "1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("pool_pages"));
    }

    #[test]
    fn test_malformed_config_file_fails() {
        let (_dir, config) = config_file("page_size = \"ten\"\n");
        vlist()
            .arg("--config")
            .arg(&config)
            .arg("scroll")
            .assert()
            .failure()
            .stderr(predicate::str::contains("\"success\":false"));
    }
}

mod markup_tests {
    use super::*;

    #[test]
    fn test_default_markup() {
        let output = vlist()
            .arg("markup")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let json = parse_json_output(&output);
        assert_eq!(json["data"]["top_sentinel_id"], "top-observer");
        assert_eq!(json["data"]["bottom_sentinel_id"], "bottom-observer");
        let html = json["data"]["html"].as_str().unwrap();
        let top = html.find("top-observer").unwrap();
        let content = html.find("virtual-list").unwrap();
        let bottom = html.find("bottom-observer").unwrap();
        assert!(top < content && content < bottom);
    }

    #[test]
    fn test_prefixed_markup() {
        vlist()
            .args(["markup", "--prefix", "feed"])
            .assert()
            .success()
            .stdout(predicate::str::contains("feed-top-observer"));
    }
}
