//! Integration tests for the fmea CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get an fmea command isolated from the caller's environment
fn fmea(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("fmea").unwrap();
    cmd.current_dir(tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join("xdg"))
        .env("FMEA_CODE_STYLE", "sequential")
        .env_remove("FMEA_DOCUMENT")
        .env_remove("FMEA_DATABASE")
        .env_remove("FMEA_AUTHOR");
    cmd
}

/// Helper to create a project holding one document with root STR-1/Vehicle
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fmea(&tmp).arg("init").assert().success();
    fmea(&tmp)
        .args(["doc", "new", "DOC-1", "Brake FMEA", "--root", "Vehicle"])
        .assert()
        .success();
    tmp
}

/// Run a command with `-f id` and return the printed code
fn create(tmp: &TempDir, args: &[&str]) -> String {
    let output = fmea(tmp).args(args).args(["-f", "id"]).output().unwrap();
    assert!(
        output.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn codes(tmp: &TempDir, args: &[&str]) -> Vec<String> {
    let output = fmea(tmp).args(args).args(["-f", "id"]).output().unwrap();
    assert!(output.status.success());
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

const EXCHANGE: &str = r#"
document:
  code: DOC-9
  name: Pump FMEA
structures:
  - code: S1
    long_name: Pump
  - code: S1.1
    long_name: Motor
    parent: S1
  - code: S1.1.1
    long_name: Bearing
    parent: S1.1
functions:
  - code: F1
    long_name: Deliver flow
    structure: S1.1
  - code: F1.1
    long_name: Rotate shaft
    structure: S1.1.1
    parent: F1
faults:
  - code: E1
    long_name: No flow
    function: F1
    risk_priority_factor: 7
  - code: M1
    long_name: Bearing seized
    function: F1.1
    parent: E1
"#;

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    fmea(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("structure"))
        .stdout(predicate::str::contains("fault"));
}

#[test]
fn test_completions_generate() {
    let tmp = TempDir::new().unwrap();
    fmea(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fmea"));
}

#[test]
fn test_command_outside_project_fails() {
    let tmp = TempDir::new().unwrap();
    fmea(&tmp)
        .args(["doc", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not an FMEA project"));
}

// ============================================================================
// Init and Document Tests
// ============================================================================

#[test]
fn test_init_creates_project() {
    let tmp = TempDir::new().unwrap();
    fmea(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized FMEA project"));

    assert!(tmp.path().join(".fmea/config.yaml").exists());
    assert!(tmp.path().join(".fmea/fmea.db").exists());
}

#[test]
fn test_init_twice_warns() {
    let tmp = setup_test_project();
    fmea(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_doc_new_and_list() {
    let tmp = setup_test_project();
    assert_eq!(codes(&tmp, &["doc", "list"]), vec!["DOC-1"]);

    fmea(&tmp)
        .args(["doc", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("STR-1/Vehicle"))
        .stdout(predicate::str::contains("1 structures"));
}

#[test]
fn test_doc_new_rejects_existing_code() {
    let tmp = setup_test_project();
    fmea(&tmp)
        .args(["doc", "new", "DOC-1", "Again"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_two_documents_need_selection() {
    let tmp = setup_test_project();
    fmea(&tmp)
        .args(["doc", "new", "DOC-2", "Steering FMEA"])
        .assert()
        .success();

    fmea(&tmp)
        .args(["structure", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("2 documents"));

    fmea(&tmp)
        .args(["structure", "list", "-d", "DOC-2"])
        .assert()
        .success();
}

#[test]
fn test_doc_rm() {
    let tmp = setup_test_project();
    fmea(&tmp).args(["doc", "rm", "DOC-1"]).assert().success();
    assert!(codes(&tmp, &["doc", "list"]).is_empty());
    fmea(&tmp).args(["doc", "rm", "DOC-1"]).assert().failure();
}

// ============================================================================
// Structure Tests
// ============================================================================

#[test]
fn test_structure_add_and_tree() {
    let tmp = setup_test_project();
    assert_eq!(create(&tmp, &["structure", "add", "Brake"]), "STR-2");
    assert_eq!(
        create(&tmp, &["structure", "add", "Caliper", "--parent", "STR-2"]),
        "STR-3"
    );

    fmea(&tmp)
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("STR-1/Vehicle"))
        .stdout(predicate::str::contains("└─ STR-2/Brake"))
        .stdout(predicate::str::contains("   └─ STR-3/Caliper"));
}

#[test]
fn test_structure_move_reorders_siblings() {
    let tmp = setup_test_project();
    create(&tmp, &["structure", "add", "Brake"]);
    create(&tmp, &["structure", "add", "Steering"]);

    fmea(&tmp)
        .args(["structure", "move", "STR-3", "up"])
        .assert()
        .success();
    assert_eq!(
        codes(&tmp, &["structure", "list"]),
        vec!["STR-1", "STR-3", "STR-2"]
    );

    fmea(&tmp)
        .args(["structure", "move", "STR-3", "up"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already at the edge"));
}

#[test]
fn test_structure_rm_guards() {
    let tmp = setup_test_project();
    create(&tmp, &["structure", "add", "Brake"]);
    create(&tmp, &["structure", "add", "Caliper", "--parent", "STR-2"]);

    fmea(&tmp)
        .args(["structure", "rm", "STR-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("root"));
    fmea(&tmp)
        .args(["structure", "rm", "STR-2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has children"));

    fmea(&tmp).args(["structure", "rm", "STR-3"]).assert().success();
    fmea(&tmp).args(["structure", "rm", "STR-2"]).assert().success();
    assert_eq!(codes(&tmp, &["structure", "list"]), vec!["STR-1"]);
}

#[test]
fn test_structure_edit() {
    let tmp = setup_test_project();
    create(&tmp, &["structure", "add", "Brake"]);
    fmea(&tmp)
        .args(["structure", "edit", "STR-2", "--name", "Brake system"])
        .assert()
        .success();
    fmea(&tmp)
        .arg("tree")
        .assert()
        .stdout(predicate::str::contains("STR-2/Brake system"));
}

// ============================================================================
// Function and Fault Tests
// ============================================================================

#[test]
fn test_function_and_fault_chain() {
    let tmp = setup_test_project();
    create(&tmp, &["structure", "add", "Brake"]);
    create(&tmp, &["structure", "add", "Caliper", "--parent", "STR-2"]);

    let stop = create(&tmp, &["function", "add", "Decelerate", "--structure", "STR-2"]);
    let clamp = create(
        &tmp,
        &["function", "add", "Clamp disc", "--structure", "STR-3", "--parent", &stop],
    );
    assert_eq!((stop.as_str(), clamp.as_str()), ("FUN-1", "FUN-2"));

    let effect = create(&tmp, &["fault", "add", "No deceleration", "--function", &stop, "--rpf", "8"]);
    create(
        &tmp,
        &["fault", "add", "Piston stuck", "--function", &clamp, "--parent", &effect],
    );

    fmea(&tmp)
        .args(["tree", "--faults"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FUN-2/Clamp disc"))
        .stdout(predicate::str::contains("FLT-2/Piston stuck"));

    assert_eq!(codes(&tmp, &["fault", "list", "--ranked"]), vec!["FLT-1", "FLT-2"]);
    fmea(&tmp).arg("validate").assert().success();
}

#[test]
fn test_function_parent_level_mismatch() {
    let tmp = setup_test_project();
    create(&tmp, &["structure", "add", "Brake"]);
    create(&tmp, &["function", "add", "Decelerate", "--structure", "STR-2"]);

    // same structure level as the parent function
    fmea(&tmp)
        .args(["function", "add", "Hold", "--structure", "STR-2", "--parent", "FUN-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("level"));
    assert_eq!(codes(&tmp, &["function", "list"]), vec!["FUN-1"]);
}

#[test]
fn test_function_link_cycle_rejected() {
    let tmp = setup_test_project();
    create(&tmp, &["structure", "add", "Brake"]);
    create(&tmp, &["structure", "add", "Caliper", "--parent", "STR-2"]);
    create(&tmp, &["function", "add", "Decelerate", "--structure", "STR-2"]);
    create(
        &tmp,
        &["function", "add", "Clamp", "--structure", "STR-3", "--parent", "FUN-1"],
    );

    fmea(&tmp)
        .args(["function", "link", "FUN-2", "FUN-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Circular reference"));
}

#[test]
fn test_fault_rm_with_causes_fails() {
    let tmp = setup_test_project();
    create(&tmp, &["structure", "add", "Brake"]);
    create(&tmp, &["structure", "add", "Caliper", "--parent", "STR-2"]);
    create(&tmp, &["function", "add", "Decelerate", "--structure", "STR-2"]);
    create(
        &tmp,
        &["function", "add", "Clamp", "--structure", "STR-3", "--parent", "FUN-1"],
    );
    create(&tmp, &["fault", "add", "No deceleration", "--function", "FUN-1"]);
    create(
        &tmp,
        &["fault", "add", "Stuck", "--function", "FUN-2", "--parent", "FLT-1"],
    );

    fmea(&tmp)
        .args(["fault", "rm", "FLT-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has children"));
    fmea(&tmp)
        .args(["function", "rm", "FUN-2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("attached faults"));
}

#[test]
fn test_fault_rejects_zero_rpf() {
    let tmp = setup_test_project();
    create(&tmp, &["structure", "add", "Brake"]);
    create(&tmp, &["function", "add", "Decelerate", "--structure", "STR-2"]);
    fmea(&tmp)
        .args(["fault", "add", "Leak", "--function", "FUN-1", "--rpf", "0"])
        .assert()
        .failure();
}

// ============================================================================
// Team Tests
// ============================================================================

#[test]
fn test_team_rejects_member_on_both_lists() {
    let tmp = setup_test_project();
    fmea(&tmp)
        .args(["team", "add", "E1", "Ada Lovelace"])
        .assert()
        .success();
    fmea(&tmp)
        .args(["team", "add", "E1", "Ada Lovelace", "--team", "extended"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("both a core and an extended"));

    fmea(&tmp)
        .args(["team", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada Lovelace"));

    fmea(&tmp).args(["team", "rm", "E1"]).assert().success();
    assert!(codes(&tmp, &["team", "list"]).is_empty());
}

// ============================================================================
// Import / Export Tests
// ============================================================================

#[test]
fn test_import_then_export() {
    let tmp = setup_test_project();
    let file = tmp.path().join("pump.yaml");
    fs::write(&file, EXCHANGE).unwrap();

    fmea(&tmp)
        .args(["import", "pump.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported document DOC-9"));

    fmea(&tmp)
        .args(["validate", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All documents passed"));

    fmea(&tmp)
        .args(["export", "-d", "DOC-9", "--to", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("structure,structure_name"))
        .stdout(predicate::str::contains("S1.1,Motor,1,F1,Deliver flow,1,E1,No flow,FE,7,M1"));

    fmea(&tmp)
        .args(["export", "-d", "DOC-9", "--to", "json", "-o", "pump.json"])
        .assert()
        .success();
    let json = fs::read_to_string(tmp.path().join("pump.json")).unwrap();
    assert!(json.contains("\"code\": \"DOC-9\""));

    // the same code again needs --replace
    fmea(&tmp).args(["import", "pump.json"]).assert().failure();
    fmea(&tmp)
        .args(["import", "pump.json", "--replace"])
        .assert()
        .success();
}

/// EXCHANGE with E1 listed on both the core and the extended team
fn duplicate_member_exchange() -> String {
    EXCHANGE.replace(
        "  name: Pump FMEA\n",
        "  name: Pump FMEA\n  team:\n    core:\n      - employee_no: E1\n    extended:\n      - employee_no: E1\n",
    )
}

#[test]
fn test_import_replace_keeps_document_on_failure() {
    let tmp = setup_test_project();
    fs::write(tmp.path().join("pump.yaml"), EXCHANGE).unwrap();
    fs::write(tmp.path().join("dup.yaml"), duplicate_member_exchange()).unwrap();
    fmea(&tmp).args(["import", "pump.yaml"]).assert().success();

    fmea(&tmp)
        .args(["import", "dup.yaml", "--replace"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("both a core and an extended"));

    assert_eq!(codes(&tmp, &["doc", "list"]), vec!["DOC-1", "DOC-9"]);
    assert_eq!(
        codes(&tmp, &["structure", "list", "-d", "DOC-9"]),
        vec!["S1", "S1.1", "S1.1.1"]
    );
}

#[test]
fn test_import_dry_run_reports_duplicate_member() {
    let tmp = setup_test_project();
    fs::write(tmp.path().join("dup.yaml"), duplicate_member_exchange()).unwrap();

    fmea(&tmp)
        .args(["import", "dup.yaml", "--dry-run"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("is a valid document").not())
        .stderr(predicate::str::contains("both a core and an extended"));
}

#[test]
fn test_import_replace_drops_missing_entities() {
    let tmp = setup_test_project();
    fs::write(tmp.path().join("pump.yaml"), EXCHANGE).unwrap();
    fmea(&tmp).args(["import", "pump.yaml"]).assert().success();

    // drop the bearing branch: S1.1.1, F1.1 and M1
    let trimmed = EXCHANGE
        .split("  - code: S1.1.1")
        .next()
        .unwrap()
        .to_string()
        + "functions:\n  - code: F1\n    long_name: Deliver flow\n    structure: S1.1\n"
        + "faults:\n  - code: E1\n    long_name: No flow\n    function: F1\n";
    fs::write(tmp.path().join("trimmed.yaml"), trimmed).unwrap();

    fmea(&tmp)
        .args(["import", "trimmed.yaml", "--replace"])
        .assert()
        .success();
    assert_eq!(
        codes(&tmp, &["structure", "list", "-d", "DOC-9"]),
        vec!["S1", "S1.1"]
    );
    assert_eq!(codes(&tmp, &["fault", "list", "-d", "DOC-9"]), vec!["E1"]);
    fmea(&tmp).args(["validate", "-d", "DOC-9"]).assert().success();
}

#[test]
fn test_import_cycle_stores_nothing() {
    let tmp = setup_test_project();
    let cyclic = EXCHANGE.replace(
        "    long_name: Motor\n    parent: S1\n",
        "    long_name: Motor\n    parent: S1.1.1\n",
    );
    fs::write(tmp.path().join("cyclic.yaml"), cyclic).unwrap();

    fmea(&tmp)
        .args(["import", "cyclic.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Circular reference"));
    assert_eq!(codes(&tmp, &["doc", "list"]), vec!["DOC-1"]);
}

#[test]
fn test_graph_lists_prerequisites() {
    let tmp = setup_test_project();
    fs::write(tmp.path().join("pump.yaml"), EXCHANGE).unwrap();
    fmea(&tmp).args(["import", "pump.yaml"]).assert().success();

    assert_eq!(codes(&tmp, &["graph", "-d", "DOC-9"]), vec!["F1", "F1.1"]);
    fmea(&tmp)
        .args(["graph", "-d", "DOC-9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("→ F1.1"));
}
