//! CLI and basic command tests

mod common;

use common::{json_output, setup_data_dir, setup_milk, stockpile, stockpile_in};
use predicates::prelude::*;
use std::fs;

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    stockpile()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("forecast runout"));
}

#[test]
fn test_version_displays() {
    stockpile()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stockpile"));
}

#[test]
fn test_unknown_command_fails() {
    stockpile()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_completions_bash() {
    stockpile()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stockpile"));
}

// ============================================================================
// Run Command Tests
// ============================================================================

#[test]
fn test_run_writes_all_outputs() {
    let tmp = setup_milk();

    stockpile_in(tmp.path(), "2025-01-02")
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("complete"));

    for name in [
        "daily_consumption.csv",
        "forecast_results.csv",
        "recommendations.csv",
        "audit_results.csv",
        "pipeline_manifest.json",
    ] {
        assert!(tmp.path().join(name).exists(), "{name} not written");
    }
    assert!(!tmp.path().join(".stockpile.lock").exists());

    let recs = fs::read_to_string(tmp.path().join("recommendations.csv")).unwrap();
    assert!(recs.contains("Milk,Critical,7.0"));
}

#[test]
fn test_run_twice_is_byte_identical() {
    let tmp = setup_milk();
    let names = [
        "daily_consumption.csv",
        "forecast_results.csv",
        "recommendations.csv",
        "audit_results.csv",
        "pipeline_manifest.json",
    ];

    stockpile_in(tmp.path(), "2025-01-02").arg("run").assert().success();
    let first: Vec<Vec<u8>> = names
        .iter()
        .map(|n| fs::read(tmp.path().join(n)).unwrap())
        .collect();

    stockpile_in(tmp.path(), "2025-01-02").arg("run").assert().success();
    let second: Vec<Vec<u8>> = names
        .iter()
        .map(|n| fs::read(tmp.path().join(n)).unwrap())
        .collect();

    assert_eq!(first, second);
}

#[test]
fn test_run_refuses_when_lock_held() {
    let tmp = setup_milk();
    fs::write(tmp.path().join(".stockpile.lock"), "12345\n").unwrap();

    stockpile_in(tmp.path(), "2025-01-02")
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("lock"));

    assert!(!tmp.path().join("daily_consumption.csv").exists());
}

#[test]
fn test_read_only_commands_write_nothing() {
    let tmp = setup_milk();

    for cmd in ["consumption", "forecast", "recommend", "status"] {
        stockpile_in(tmp.path(), "2025-01-02")
            .arg(cmd)
            .assert()
            .success();
    }

    let mut names: Vec<String> = fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec!["daily_stock_levels.csv", "deliveries.csv", "item_info.csv"]
    );
}

// ============================================================================
// Derived Data Tests
// ============================================================================

#[test]
fn test_consumption_reasoning() {
    let tmp = setup_milk();
    let records = json_output(stockpile_in(tmp.path(), "2025-01-02").arg("consumption"));

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["consumption"], 8.0);
    assert_eq!(
        records[0]["reasoning"],
        "Started with 10, received 5 in deliveries, ended with 7"
    );
}

#[test]
fn test_milk_recommendation() {
    let tmp = setup_milk();
    let recs = json_output(stockpile_in(tmp.path(), "2025-01-02").arg("recommend"));

    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0]["item_name"], "Milk");
    assert_eq!(recs[0]["urgency"], "Critical");
    assert_eq!(recs[0]["projected_runout_date"], "2025-01-02");
    assert_eq!(recs[0]["suggested_quantity"], 23.0);
    assert_eq!(recs[0]["supplier"], "Dairy Co");

    let reasoning = recs[0]["reasoning_text"].as_str().unwrap();
    insta::assert_snapshot!(reasoning, @"Current stock: 7 L. Average daily usage: 8 L/day. Projected runout: 2025-01-02. Lead time: 1 day(s). Rule: projected runout 2025-01-02 is on or before today + 1 x lead time (2025-01-03), so Critical. Suggested order fills to capacity 30 L.");
}

#[test]
fn test_never_counted_item_forecast_unknown() {
    let tmp = setup_data_dir(
        "Milk,L,3,30,1,1.2,\nSugar,kg,1,10,3,2.0,\n",
        "2025-01-01,Milk,10\n2025-01-02,Milk,7\n",
        "",
    );

    let forecasts = json_output(stockpile_in(tmp.path(), "2025-01-02").arg("forecast"));
    let names: Vec<&str> = forecasts
        .iter()
        .map(|f| f["item_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Milk", "Sugar"]);
    assert!(forecasts[1]["projected_runout_date"].is_null());
    assert_eq!(forecasts[1]["confidence_level"], "Low");

    let recs = json_output(stockpile_in(tmp.path(), "2025-01-02").arg("recommend"));
    assert!(recs.iter().all(|r| r["item_name"] != "Sugar"));

    stockpile_in(tmp.path(), "2025-01-02")
        .args(["audit", "-o", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Info,Sugar,,"))
        .stdout(predicate::str::contains("item.no_readings"));
}

#[test]
fn test_forecast_averages_records_across_counting_gap() {
    let tmp = setup_data_dir(
        "Milk,L,3,30,1,1.2,\n",
        "2025-01-01,Milk,30\n2025-01-04,Milk,21\n2025-01-05,Milk,18\n",
        "",
    );

    let forecasts = json_output(stockpile_in(tmp.path(), "2025-01-05").arg("forecast"));
    assert_eq!(forecasts[0]["avg_daily_consumption"], 6.0);
    assert_eq!(forecasts[0]["qualifying_days"], 2);
    assert_eq!(forecasts[0]["confidence_level"], "Low");
    assert_eq!(forecasts[0]["projected_runout_date"], "2025-01-08");
}

#[test]
fn test_budget_flag_caps_spend() {
    let tmp = setup_milk();
    let recs = json_output(
        stockpile_in(tmp.path(), "2025-01-02").args(["--budget", "12", "recommend"]),
    );
    assert_eq!(recs[0]["suggested_quantity"], 10.0);
    assert!(recs[0]["reasoning_text"]
        .as_str()
        .unwrap()
        .contains("capped from 23 to 10 L"));
}

#[test]
fn test_status_summary_json() {
    let tmp = setup_milk();
    let output = stockpile_in(tmp.path(), "2025-01-02")
        .args(["status", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["total_items"], 1);
    assert_eq!(summary["recommendations"]["critical"], 1);
    assert_eq!(summary["low_stock_items"], serde_json::json!([]));
}

// ============================================================================
// Audit Command Tests
// ============================================================================

#[test]
fn test_audit_negative_stock_is_critical() {
    let tmp = setup_data_dir(
        "Milk,L,3,30,1,1.2,\n",
        "2025-01-01,Milk,10\n2025-01-02,Milk,-1\n",
        "",
    );

    stockpile_in(tmp.path(), "2025-01-02")
        .args(["audit", "-o", "csv"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Critical,Milk,2025-01-02"))
        .stdout(predicate::str::contains("stock.negative"));
}

#[test]
fn test_audit_strict_fails_on_warnings() {
    let tmp = setup_data_dir(
        "Milk,L,3,30,1,1.2,\n",
        "2025-01-01,Milk,10\n2025-01-02,Milk,7\n",
        "2025-01-02,Oat Milk,4,\n",
    );

    stockpile_in(tmp.path(), "2025-01-02")
        .arg("audit")
        .assert()
        .success();

    stockpile_in(tmp.path(), "2025-01-02")
        .args(["audit", "--strict", "--report"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("delivery.unknown_item"))
        .stderr(predicate::str::contains("strict"));
}

#[test]
fn test_audit_detects_edited_consumption() {
    let tmp = setup_milk();
    stockpile_in(tmp.path(), "2025-01-02").arg("run").assert().success();

    let path = tmp.path().join("daily_consumption.csv");
    let edited = fs::read_to_string(&path)
        .unwrap()
        .replacen(",8.0,", ",9.0,", 1);
    fs::write(&path, edited).unwrap();

    stockpile_in(tmp.path(), "2025-01-02")
        .args(["audit", "-o", "csv"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("consumption.mismatch"));
}

// ============================================================================
// Ingest and Config Tests
// ============================================================================

#[test]
fn test_ingest_stock_replaces_and_reruns() {
    let tmp = setup_milk();
    let upload = tmp.path().join("upload.csv");
    fs::write(
        &upload,
        "Date,Item_Name,Current_Stock\n2025-01-02,Milk,6\n2025-01-03,Milk,2\n",
    )
    .unwrap();

    stockpile_in(tmp.path(), "2025-01-03")
        .args(["ingest", "--kind", "stock"])
        .arg(&upload)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 added, 1 replaced, 0 rejected"));

    let master = fs::read_to_string(tmp.path().join("daily_stock_levels.csv")).unwrap();
    assert!(master.contains("2025-01-02,Milk,6\n"));
    assert!(!master.contains("2025-01-02,Milk,7\n"));
    assert!(tmp.path().join("daily_consumption.csv").exists());
}

#[test]
fn test_ingested_negative_count_is_audited() {
    let tmp = setup_milk();
    let upload = tmp.path().join("upload.csv");
    fs::write(&upload, "Date,Item_Name,Current_Stock\n2025-01-03,Milk,-4\n").unwrap();

    stockpile_in(tmp.path(), "2025-01-03")
        .args(["ingest", "--kind", "stock"])
        .arg(&upload)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 added, 0 replaced, 1 rejected"));

    let findings = fs::read_to_string(tmp.path().join("audit_results.csv")).unwrap();
    assert!(findings.contains("Critical,Milk,2025-01-03"));
    assert!(findings.contains("stock.negative"));

    stockpile_in(tmp.path(), "2025-01-03")
        .args(["audit", "-o", "csv"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Critical,Milk,2025-01-03"))
        .stdout(predicate::str::contains("stock.negative"));
}

#[test]
fn test_invalid_data_dir_config_is_reported() {
    let tmp = setup_milk();
    fs::write(tmp.path().join("stockpile.yaml"), "window_days: [1, 2\n").unwrap();

    stockpile_in(tmp.path(), "2025-01-02")
        .arg("forecast")
        .assert()
        .failure()
        .stderr(predicate::str::contains("stockpile.yaml"));
}

#[test]
fn test_data_dir_config_sets_budget() {
    let tmp = setup_milk();
    fs::write(tmp.path().join("stockpile.yaml"), "budget_ceiling: 12\n").unwrap();

    let recs = json_output(stockpile_in(tmp.path(), "2025-01-02").arg("recommend"));
    assert_eq!(recs[0]["suggested_quantity"], 10.0);
    assert_eq!(recs[0]["estimated_cost"], 12.0);
}
