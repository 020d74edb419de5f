//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const ITEMS_HEADER: &str =
    "Item_Name,Unit,Min_Threshold,Max_Capacity,Lead_Time_Days,Cost_Per_Unit,Supplier\n";
pub const STOCK_HEADER: &str = "Date,Item_Name,Current_Stock\n";
pub const DELIVERIES_HEADER: &str = "Date,Item_Name,Delivery_Amount,Notes\n";

/// Helper to get a stockpile command isolated from the caller's config
pub fn stockpile() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("stockpile"));
    for var in [
        "STOCKPILE_DATA_DIR",
        "STOCKPILE_AS_OF",
        "STOCKPILE_WINDOW_DAYS",
        "STOCKPILE_STALENESS_DAYS",
        "STOCKPILE_GAP_DAYS",
        "STOCKPILE_BUDGET",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Helper to run stockpile against a data directory on a fixed date
pub fn stockpile_in(dir: &Path, as_of: &str) -> Command {
    let mut cmd = stockpile();
    cmd.env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("HOME", dir)
        .arg("--data-dir")
        .arg(dir)
        .arg("--as-of")
        .arg(as_of);
    cmd
}

/// Write the three input files into a fresh temp directory
pub fn setup_data_dir(items: &str, stock: &str, deliveries: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("item_info.csv"), format!("{ITEMS_HEADER}{items}")).unwrap();
    fs::write(
        tmp.path().join("daily_stock_levels.csv"),
        format!("{STOCK_HEADER}{stock}"),
    )
    .unwrap();
    fs::write(
        tmp.path().join("deliveries.csv"),
        format!("{DELIVERIES_HEADER}{deliveries}"),
    )
    .unwrap();
    tmp
}

/// Milk counted on two days with a delivery in between
pub fn setup_milk() -> TempDir {
    setup_data_dir(
        "Milk,L,3,30,1,1.2,Dairy Co\n",
        "2025-01-01,Milk,10\n2025-01-02,Milk,7\n",
        "2025-01-02,Milk,5,morning drop\n",
    )
}

/// Parse a JSON array printed with `-o json`
pub fn json_output(cmd: &mut Command) -> Vec<serde_json::Value> {
    let output = cmd.arg("-o").arg("json").output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}
