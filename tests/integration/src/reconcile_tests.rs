//! End-to-end reconciliation passes over a temp kube tree

use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};

use schedext_core::{ReconcileState, Reconciler, Settings};
use schedext_manifest::{PodManifest, REVISION_ANNOTATION};

const SCHEDULER_MANIFEST: &str = r#"
apiVersion: v1
kind: Pod
metadata:
  name: kube-scheduler
  namespace: kube-system
  labels:
    component: kube-scheduler
spec:
  hostNetwork: true
  priorityClassName: system-node-critical
  containers:
    - name: kube-scheduler
      image: registry.k8s.io/kube-scheduler:v1.18.0
      command:
        - kube-scheduler
        - --authentication-kubeconfig=/etc/kubernetes/scheduler.conf
        - --v=2
      volumeMounts:
        - name: kubeconfig
          mountPath: /etc/kubernetes/scheduler.conf
          readOnly: true
  volumes:
    - name: kubeconfig
      hostPath:
        path: /etc/kubernetes/scheduler.conf
        type: FileOrCreate
"#;

fn settings(root: &Path) -> Settings {
    Settings {
        kube_dir: root.to_path_buf(),
        node_ip: "192.168.1.10".to_string(),
        ..Settings::default()
    }
}

fn seed_manifest(root: &Path) -> PathBuf {
    let path = root.join("manifests").join("kube-scheduler.yaml");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, SCHEDULER_MANIFEST).unwrap();
    path
}

fn read_manifest(path: &Path) -> PodManifest {
    PodManifest::from_yaml(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn bootstrap_pass_converges_both_files() {
    let dir = tempfile::tempdir().unwrap();
    let manifest_path = seed_manifest(dir.path());
    let reconciler = Reconciler::new(settings(dir.path()));
    let mut state = ReconcileState::new();

    let report = reconciler.run_pass(&mut state).unwrap();
    assert!(report.policy_written);
    assert!(report.manifest_written);

    // Policy document bootstrapped with the node's extender entry.
    let policy: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("scheduler-policy-config.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(policy["apiVersion"], "v1");
    assert_eq!(policy["kind"], "Policy");
    assert_eq!(
        policy["extenders"][0]["urlPrefix"],
        "http://192.168.1.10:32766/gpushare-scheduler"
    );
    assert_eq!(policy["extenders"][0]["filterVerb"], "filter");
    assert_eq!(
        policy["extenders"][0]["managedResources"][0]["name"],
        "aliyun.com/gpu-mem"
    );

    // Manifest carries all four edits, pre-existing entries untouched.
    let manifest = read_manifest(&manifest_path);
    let container = &manifest.spec.containers[0];
    assert_eq!(
        container.command.last().map(String::as_str),
        Some("--policy-config-file=/etc/kubernetes/scheduler-policy-config.json")
    );
    assert_eq!(container.command[1], "--authentication-kubeconfig=/etc/kubernetes/scheduler.conf");
    assert_eq!(container.volume_mounts.len(), 2);
    assert_eq!(container.volume_mounts[0].name, "kubeconfig");
    assert_eq!(manifest.spec.volumes.len(), 2);
    assert_eq!(manifest.spec.volumes[1].name, "scheduler-policy-config");
    assert!(manifest.metadata.annotations.contains_key(REVISION_ANNOTATION));
}

#[test]
fn steady_state_never_rewrites() {
    let dir = tempfile::tempdir().unwrap();
    let manifest_path = seed_manifest(dir.path());
    let reconciler = Reconciler::new(settings(dir.path()));
    let mut state = ReconcileState::new();

    reconciler.run_pass(&mut state).unwrap();
    let manifest_bytes = fs::read(&manifest_path).unwrap();
    let policy_bytes = fs::read(dir.path().join("scheduler-policy-config.json")).unwrap();
    let backups: Vec<_> = fs::read_dir(dir.path().join("manifests_backup"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();

    // Several quiet ticks.
    for _ in 0..3 {
        let report = reconciler.run_pass(&mut state).unwrap();
        assert!(report.skipped());
    }

    assert_eq!(fs::read(&manifest_path).unwrap(), manifest_bytes);
    assert_eq!(
        fs::read(dir.path().join("scheduler-policy-config.json")).unwrap(),
        policy_bytes
    );
    let backups_after: Vec<_> = fs::read_dir(dir.path().join("manifests_backup"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(backups_after.len(), backups.len());
}

#[test]
fn external_manifest_edit_is_reconciled_and_stays_stable() {
    let dir = tempfile::tempdir().unwrap();
    let manifest_path = seed_manifest(dir.path());
    let reconciler = Reconciler::new(settings(dir.path()));
    let mut state = ReconcileState::new();
    reconciler.run_pass(&mut state).unwrap();

    // kubeadm upgrade rewrites the manifest, dropping our edits.
    fs::write(&manifest_path, SCHEDULER_MANIFEST).unwrap();

    let report = reconciler.run_pass(&mut state).unwrap();
    assert!(report.manifest_written);
    // Policy file did not change, so it is not rewritten.
    assert!(!report.policy_written);

    let manifest = read_manifest(&manifest_path);
    let flags = manifest.spec.containers[0]
        .command
        .iter()
        .filter(|t| t.starts_with("--policy-config-file="))
        .count();
    assert_eq!(flags, 1);

    // And the pass after that is quiet again.
    assert!(reconciler.run_pass(&mut state).unwrap().skipped());
}

#[test]
fn deleted_manifest_is_regenerated_without_crashing() {
    let dir = tempfile::tempdir().unwrap();
    let manifest_path = seed_manifest(dir.path());
    let reconciler = Reconciler::new(settings(dir.path()));
    let mut state = ReconcileState::new();
    reconciler.run_pass(&mut state).unwrap();
    let patched = read_manifest(&manifest_path);

    fs::remove_file(&manifest_path).unwrap();
    let report = reconciler.run_pass(&mut state).unwrap();
    assert!(report.manifest_written);

    let regenerated = read_manifest(&manifest_path);
    // Identical except for the revision timestamp, which may have moved.
    assert_eq!(regenerated.spec, patched.spec);
    assert_eq!(
        regenerated.metadata.extra.get("name"),
        patched.metadata.extra.get("name")
    );
}

#[test]
fn reconciler_converges_under_repeated_stale_entries() {
    let dir = tempfile::tempdir().unwrap();
    let manifest_path = seed_manifest(dir.path());
    let reconciler = Reconciler::new(settings(dir.path()));
    let mut state = ReconcileState::new();
    reconciler.run_pass(&mut state).unwrap();

    // Inject duplicates of the managed volume under a stale path.
    let mut manifest = read_manifest(&manifest_path);
    let mut stale = manifest.spec.volumes[1].clone();
    stale.host_path.as_mut().unwrap().path = "/stale/policy.json".to_string();
    manifest.spec.volumes.push(stale.clone());
    manifest.spec.volumes.push(stale);
    fs::write(&manifest_path, manifest.to_yaml().unwrap()).unwrap();

    reconciler.run_pass(&mut state).unwrap();

    let converged = read_manifest(&manifest_path);
    let managed: Vec<_> = converged
        .spec
        .volumes
        .iter()
        .filter(|v| v.name == "scheduler-policy-config")
        .collect();
    assert_eq!(managed.len(), 1);
    assert_eq!(
        managed[0].host_path.as_ref().unwrap().path,
        "/etc/kubernetes/scheduler-policy-config.json"
    );
}

#[test]
fn restart_reconverges_from_empty_state() {
    let dir = tempfile::tempdir().unwrap();
    let manifest_path = seed_manifest(dir.path());
    let reconciler = Reconciler::new(settings(dir.path()));

    let mut state = ReconcileState::new();
    reconciler.run_pass(&mut state).unwrap();
    let first = fs::read_to_string(&manifest_path).unwrap();

    // Process restart: watch state is lost, files are treated as new.
    let mut fresh_state = ReconcileState::new();
    let report = reconciler.run_pass(&mut fresh_state).unwrap();
    assert!(report.manifest_written);

    // Convergent: same structure, only the revision annotation may differ.
    let before = PodManifest::from_yaml(&first).unwrap();
    let after = read_manifest(&manifest_path);
    assert_eq!(before.spec, after.spec);
}
