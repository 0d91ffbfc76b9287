mod test_support;

use serde_json::json;
use test_support::{request_err, request_ok, spawn_sidecar, temp_dir};

#[test]
fn bundle_round_trip_restores_marks_and_snapshot() {
    let workspace = temp_dir("timetabled-backup-src");
    let restored = temp_dir("timetabled-backup-dst");
    let bundle = workspace.join("export.ttbundle");
    let snapshot = json!({
        "classes": [{ "id": "C1", "majorId": "M1" }],
        "sessions": [],
    });

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
        "progress.manualComplete.set",
        json!({ "subjectId": "MATH", "classId": "C1", "completed": true }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "payments.setPaid",
        json!({ "subjectId": "MATH", "classId": "C1", "paid": true }),
    );

    let exported = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "backup.export",
        json!({ "outPath": bundle.to_string_lossy(), "snapshot": snapshot }),
    );
    assert_eq!(exported["bundleFormat"], json!("timetable-workspace-v1"));
    assert_eq!(exported["entryCount"], json!(3));
    assert_eq!(exported["dbSha256"].as_str().map(|s| s.len()), Some(64));
    assert!(bundle.is_file());

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "workspace.select",
        json!({ "path": restored.to_string_lossy() }),
    );
    let empty = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "progress.manualComplete.list",
        json!({}),
    );
    assert_eq!(empty["marks"], json!([]));

    let imported = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "backup.import",
        json!({ "inPath": bundle.to_string_lossy() }),
    );
    assert_eq!(imported["bundleFormatDetected"], json!("timetable-workspace-v1"));
    assert_eq!(imported["snapshot"], snapshot);

    let marks = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "progress.manualComplete.list",
        json!({}),
    );
    assert_eq!(
        marks["marks"],
        json!([{ "subjectId": "MATH", "classId": "C1", "group": null }])
    );
}

#[test]
fn import_rejects_missing_and_foreign_files() {
    let workspace = temp_dir("timetabled-backup-bad");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let code = request_err(
        &mut stdin,
        &mut reader,
        "1",
        "backup.export",
        json!({ "outPath": workspace.join("x.zip").to_string_lossy() }),
    );
    assert_eq!(code, "no_workspace");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let code = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "backup.import",
        json!({ "inPath": workspace.join("missing.zip").to_string_lossy() }),
    );
    assert_eq!(code, "not_found");

    let junk = workspace.join("junk.zip");
    std::fs::write(&junk, b"not a bundle").expect("write junk");
    let code = request_err(
        &mut stdin,
        &mut reader,
        "4",
        "backup.import",
        json!({ "inPath": junk.to_string_lossy() }),
    );
    assert_eq!(code, "io_failed");

    // Workspace stays usable after a failed import.
    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "progress.manualComplete.list",
        json!({}),
    );
    assert_eq!(listed["marks"], json!([]));
}
