//! End-to-end resolution against a real directory tree

use reqctx::config::ResolverConfig;
use reqctx::{
    strip_synthetic_path, ContextCriteria, ContextFilter, ContextMode, ContextResolutionService,
    DeltaHint, GraphDelta, PassthroughTransformer, ScanPolicy, ScanStrategy, WalkdirMatcher,
};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use crate::integration::write_files;

fn fixture() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = dunce::canonicalize(temp_dir.path()).unwrap().join("icons");
    std::fs::create_dir_all(&root).unwrap();
    write_files(&root, &["a.png", "sub/b.png", "notes.txt"]);
    (temp_dir, root)
}

fn service(config: &ResolverConfig) -> ContextResolutionService {
    ContextResolutionService::new(
        Arc::new(WalkdirMatcher::new(config.scan.clone())),
        Arc::new(PassthroughTransformer),
        config,
    )
}

fn png_criteria(root: &PathBuf, mode: ContextMode) -> ContextCriteria {
    ContextCriteria::new(root.clone(), true, ContextFilter::new("\\.png$", ""), mode).unwrap()
}

#[tokio::test]
async fn test_icons_scenario_with_delta() {
    let (_temp_dir, root) = fixture();
    let service = service(&ResolverConfig::default());
    let criteria = png_criteria(&root, ContextMode::Sync);

    let first = service.resolve(&root, &criteria, None).await.unwrap();
    assert_eq!(first.strategy, ScanStrategy::FullScan);
    assert_eq!(first.module.keys(), vec!["./a.png", "./sub/b.png"]);
    assert_eq!(
        strip_synthetic_path(&first.module.synthetic_path),
        root.to_string_lossy()
    );

    std::fs::write(root.join("c.png"), b"").unwrap();
    std::fs::remove_file(root.join("a.png")).unwrap();
    let delta = DeltaHint::new(vec![root.join("c.png")], vec![root.join("a.png")]);

    let second = service.resolve(&root, &criteria, Some(&delta)).await.unwrap();
    assert_eq!(
        second.strategy,
        ScanStrategy::Patch {
            added: 1,
            removed: 1
        }
    );
    assert_eq!(second.module.keys(), vec!["./sub/b.png", "./c.png"]);
    assert_eq!(second.module.synthetic_path, first.module.synthetic_path);

    // a fresh scan agrees on membership
    let fresh = service.resolve(&root, &criteria, None).await.unwrap();
    let mut patched = second.module.files.clone();
    let mut scanned = fresh.module.files.clone();
    patched.sort();
    scanned.sort();
    assert_eq!(patched, scanned);
}

#[tokio::test]
async fn test_graph_delta_through_transform_slot() {
    let (_temp_dir, root) = fixture();
    let service = service(&ResolverConfig::default());
    let criteria = png_criteria(&root, ContextMode::Lazy);

    let initial = service
        .transform_context_module(&root, &criteria)
        .await
        .unwrap();
    assert!(initial.code.contains("import("));

    write_files(&root, &["deep/d.png"]);
    let affected = service.record_graph_delta(&GraphDelta {
        added_files: vec![root.join("deep/d.png")],
        deleted_files: vec![],
    });
    assert_eq!(affected, 1);

    let updated = service
        .transform_context_module(&root, &criteria)
        .await
        .unwrap();
    assert!(updated.code.contains("\"./deep/d.png\""));
    assert_ne!(initial.code, updated.code);
}

#[tokio::test]
async fn test_always_full_policy_rescans() {
    let (_temp_dir, root) = fixture();
    let config = ResolverConfig {
        scan_policy: ScanPolicy::AlwaysFull,
        ..ResolverConfig::default()
    };
    let service = service(&config);
    let criteria = png_criteria(&root, ContextMode::Eager);

    service.resolve(&root, &criteria, None).await.unwrap();
    write_files(&root, &["e.png"]);
    // the hint omits e.png; a full rescan still finds it
    let resolution = service
        .resolve(&root, &criteria, Some(&DeltaHint::default()))
        .await
        .unwrap();
    assert_eq!(resolution.strategy, ScanStrategy::FullScan);
    assert!(resolution.module.keys().contains(&"./e.png"));
}

#[tokio::test]
async fn test_non_recursive_context_sees_only_direct_children() {
    let (_temp_dir, root) = fixture();
    let service = service(&ResolverConfig::default());
    let criteria =
        ContextCriteria::new(root.clone(), false, ContextFilter::match_all(), ContextMode::Sync)
            .unwrap();

    let resolution = service.resolve(&root, &criteria, None).await.unwrap();
    let mut keys = resolution.module.keys();
    keys.sort();
    assert_eq!(keys, vec!["./a.png", "./notes.txt"]);
}

#[tokio::test]
async fn test_missing_root_yields_empty_module() {
    let temp_dir = TempDir::new().unwrap();
    let root = dunce::canonicalize(temp_dir.path()).unwrap().join("absent");
    let service = service(&ResolverConfig::default());

    for mode in [
        ContextMode::Sync,
        ContextMode::Eager,
        ContextMode::Lazy,
        ContextMode::LazyOnce,
    ] {
        let criteria = ContextCriteria::new(root.clone(), true, ContextFilter::match_all(), mode)
            .unwrap();
        let resolution = service.resolve(&root, &criteria, None).await.unwrap();
        assert!(resolution.module.ir.is_empty());
        assert!(resolution.compiled.code.contains("MODULE_NOT_FOUND"));
    }
}

#[tokio::test]
async fn test_patch_agrees_with_scan_on_ignored_directories() {
    let (_temp_dir, root) = fixture();
    let service = service(&ResolverConfig::default());
    let criteria = png_criteria(&root, ContextMode::Sync);

    service.resolve(&root, &criteria, None).await.unwrap();
    let added = write_files(&root, &["node_modules/x.png", "target/y.png", "z.png"]);
    let patched = service
        .resolve(&root, &criteria, Some(&DeltaHint::new(added, vec![])))
        .await
        .unwrap();
    assert_eq!(patched.module.keys(), vec!["./a.png", "./sub/b.png", "./z.png"]);

    let fresh = service.resolve(&root, &criteria, None).await.unwrap();
    let mut patched_files = patched.module.files.clone();
    let mut scanned_files = fresh.module.files.clone();
    patched_files.sort();
    scanned_files.sort();
    assert_eq!(patched_files, scanned_files);
}
