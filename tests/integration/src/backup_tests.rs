//! Backup creation and retention across reconciliation passes

use std::fs;
use std::path::Path;

use schedext_core::{BackupManager, ReconcileState, Reconciler, Settings};

const MANIFEST: &str = r#"
apiVersion: v1
kind: Pod
metadata:
  name: kube-scheduler
spec:
  containers:
    - name: kube-scheduler
      command:
        - kube-scheduler
"#;

fn settings(root: &Path) -> Settings {
    Settings {
        kube_dir: root.to_path_buf(),
        node_ip: "192.168.1.10".to_string(),
        ..Settings::default()
    }
}

fn backup_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[test]
fn rewrites_snapshot_prior_versions() {
    let dir = tempfile::tempdir().unwrap();
    let manifest_path = dir.path().join("manifests").join("kube-scheduler.yaml");
    fs::create_dir_all(manifest_path.parent().unwrap()).unwrap();
    fs::write(&manifest_path, MANIFEST).unwrap();

    let reconciler = Reconciler::new(settings(dir.path()));
    let mut state = ReconcileState::new();
    reconciler.run_pass(&mut state).unwrap();

    let names = backup_names(&dir.path().join("manifests_backup"));
    // First pass: only the manifest pre-existed, so only it is snapshotted.
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("kube-scheduler."));
    assert!(names[0].ends_with(".yaml"));

    // Touch the manifest so the next pass rewrites; now the policy file
    // exists too and both families gain a snapshot.
    fs::write(&manifest_path, MANIFEST).unwrap();
    reconciler.run_pass(&mut state).unwrap();

    let names = backup_names(&dir.path().join("manifests_backup"));
    assert!(names.iter().any(|n| n.starts_with("scheduler-policy-config.")));
}

#[test]
fn retention_keeps_three_per_family_across_many_passes() {
    let dir = tempfile::tempdir().unwrap();
    let backup_dir = dir.path().join("manifests_backup");
    fs::create_dir_all(&backup_dir).unwrap();

    // Five pre-existing manifest backups with distinct mtimes, then one new
    // snapshot and a prune.
    for i in 0..5 {
        let path = backup_dir.join(format!("kube-scheduler.2024-01-01_00:00:0{i}.yaml"));
        fs::write(&path, format!("v{i}")).unwrap();
        let mtime =
            std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000 + i);
        fs::File::open(&path).unwrap().set_modified(mtime).unwrap();
    }

    let source = dir.path().join("kube-scheduler.yaml");
    fs::write(&source, "current").unwrap();

    let manager = BackupManager::new(&backup_dir, 3);
    manager.snapshot(&source).unwrap();
    manager.prune(&["kube-scheduler"]);

    let names = backup_names(&backup_dir);
    assert_eq!(names.len(), 3);
    // The three most recent survive: the fresh snapshot plus the two newest
    // of the old set.
    assert!(names.iter().any(|n| n.contains("2024-01-01_00:00:03")));
    assert!(names.iter().any(|n| n.contains("2024-01-01_00:00:04")));
    assert!(!names.iter().any(|n| n.contains("2024-01-01_00:00:00.yaml")));
}
