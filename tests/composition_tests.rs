// tests/composition_tests.rs

use pretty_assertions::assert_eq;
use std::fs;
use std::sync::Arc;
use yamlexpr::convert::parse_yaml;
use yamlexpr::{Config, DirFs, Engine, Error, MemoryFs, MergeMap, Value, deduplicate_with_stats};

fn yaml(text: &str) -> Value {
    parse_yaml(text).unwrap()
}

fn engine(files: &[(&str, &str)]) -> Engine {
    let fs = MemoryFs::new();
    for (name, contents) in files {
        fs.insert(*name, *contents);
    }
    Engine::new(Config::new().with_fs(Arc::new(fs)))
}

fn keys(value: &Value) -> Vec<&str> {
    value.as_mapping().unwrap().keys().map(String::as_str).collect()
}

// ============================================================================
// Include and Embed
// ============================================================================

#[test]
fn test_include_merges_file_with_siblings() {
    let engine = engine(&[("base.yaml", "env: prod\n")]);
    let out = engine
        .process(&yaml("include: base.yaml\ndebug: true\n"), None)
        .unwrap();
    assert_eq!(out, Some(yaml("{env: prod, debug: true}")));
}

#[test]
fn test_siblings_override_included_values() {
    let engine = engine(&[("base.yaml", "env: prod\nreplicas: 3\n")]);
    let out = engine
        .process(&yaml("service:\n  include: base.yaml\n  env: staging\n"), None)
        .unwrap()
        .unwrap();
    let service = &out.as_mapping().unwrap()["service"];
    assert_eq!(*service, yaml("{env: staging, replicas: 3}"));
    assert_eq!(keys(service), ["env", "replicas"]);
}

#[test]
fn test_include_list_deep_merges_in_order() {
    let engine = engine(&[
        ("a.yaml", "tags: [a]\nserver: {host: example.com}\nmode: first\n"),
        ("b.yaml", "tags: [b]\nserver: {port: 8080}\nmode: second\n"),
    ]);
    let out = engine
        .process(&yaml("include: [a.yaml, b.yaml]\n"), None)
        .unwrap();
    assert_eq!(
        out,
        Some(yaml(
            "{tags: [a, b], server: {host: example.com, port: 8080}, mode: second}"
        ))
    );
}

#[test]
fn test_included_file_sees_includer_variables() {
    let engine = engine(&[("svc.yaml", "name: svc-${env}\nport: ${port}\n")]);
    let out = engine
        .process(&yaml("env: dev\nport: 8080\nservice:\n  include: svc.yaml\n"), None)
        .unwrap()
        .unwrap();
    assert_eq!(
        out.as_mapping().unwrap()["service"],
        yaml("{name: svc-dev, port: 8080}")
    );
}

#[test]
fn test_included_file_inside_loop() {
    let engine = engine(&[("worker.yaml", "image: worker:${item}\n")]);
    let out = engine
        .process(
            &yaml("workers:\n  - for: [1, 2]\n    include: worker.yaml\n"),
            None,
        )
        .unwrap()
        .unwrap();
    assert_eq!(
        out.as_mapping().unwrap()["workers"],
        yaml("[{image: 'worker:1'}, {image: 'worker:2'}]")
    );
}

#[test]
fn test_omitted_file_contributes_nothing() {
    let engine = engine(&[("off.yaml", "if: false\nx: 1\n")]);
    let out = engine
        .process(&yaml("include: off.yaml\ny: 2\n"), None)
        .unwrap();
    assert_eq!(out, Some(yaml("{y: 2}")));
}

#[test]
fn test_embed_behaves_like_include() {
    let engine = engine(&[("labels.yaml", "labels: {team: core}\n")]);
    let out = engine
        .process(&yaml("meta:\n  embed: labels.yaml\n  name: api\n"), None)
        .unwrap()
        .unwrap();
    assert_eq!(
        out.as_mapping().unwrap()["meta"],
        yaml("{labels: {team: core}, name: api}")
    );
}

// ============================================================================
// Composition Errors
// ============================================================================

#[test]
fn test_missing_filesystem() {
    let err = Engine::default()
        .process(&yaml("svc:\n  include: base.yaml\n"), None)
        .unwrap_err();
    assert!(matches!(err, Error::NoFilesystem { .. }));
    assert_eq!(
        err.to_string(),
        "cannot load base.yaml: no filesystem configured at svc"
    );
    assert!(err.is_composition());
}

#[test]
fn test_nested_include_failure_reports_chain() {
    let engine = engine(&[
        ("a.yaml", "include: b.yaml\n"),
        ("b.yaml", "include: c.yaml\n"),
    ]);
    let err = engine.process(&yaml("include: a.yaml\n"), None).unwrap_err();

    let message = err.to_string();
    assert!(message.contains("a.yaml -> b.yaml -> c.yaml"), "{}", message);
    assert!(message.starts_with("error processing file a.yaml"), "{}", message);
    assert!(matches!(err.root_cause(), Error::FileRead { file, .. } if file == "c.yaml"));
}

#[test]
fn test_include_cycle_is_detected() {
    let engine = engine(&[
        ("a.yaml", "include: b.yaml\n"),
        ("b.yaml", "include: a.yaml\n"),
    ]);
    let err = engine.process(&yaml("include: a.yaml\n"), None).unwrap_err();
    match err.root_cause() {
        Error::IncludeCycle { file, chain } => {
            assert_eq!(file, "a.yaml");
            assert_eq!(chain, "a.yaml -> b.yaml -> a.yaml");
        }
        other => panic!("expected include cycle, got {:?}", other),
    }
}

#[test]
fn test_error_inside_included_file_is_wrapped() {
    let engine = engine(&[("bad.yaml", "name: ${missing}\n")]);
    let err = engine.process(&yaml("include: bad.yaml\n"), None).unwrap_err();
    assert_eq!(
        err.to_string(),
        "error processing file bad.yaml (bad.yaml): undefined variable 'missing' at name"
    );
}

#[test]
fn test_included_file_must_be_mapping() {
    let engine = engine(&[("list.yaml", "- 1\n- 2\n")]);
    let err = engine.process(&yaml("include: list.yaml\n"), None).unwrap_err();
    assert_eq!(
        err.to_string(),
        "included file list.yaml must produce a mapping, got sequence"
    );
}

#[test]
fn test_unparsable_included_file() {
    let engine = engine(&[("broken.yaml", "a: [1, 2\n")]);
    let err = engine.process(&yaml("include: broken.yaml\n"), None).unwrap_err();
    assert!(matches!(err, Error::FileParse { .. }));
}

#[test]
fn test_include_value_types() {
    let engine = engine(&[]);
    let err = engine.process(&yaml("include: 5\n"), None).unwrap_err();
    assert_eq!(
        err.to_string(),
        "include must be a string or list of strings, got integer at include"
    );

    let err = engine.process(&yaml("include: [3]\n"), None).unwrap_err();
    assert_eq!(err.to_string(), "include[0] must be a file name, got integer at include");
}

// ============================================================================
// Directory Filesystem
// ============================================================================

#[test]
fn test_load_multi_document_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("common.yaml"), "team: core\n").unwrap();
    fs::write(
        dir.path().join("main.yaml"),
        "include: common.yaml\nname: api\n---\nfor: [1, 2]\nid: ${item}\n",
    )
    .unwrap();

    let engine = Engine::new(Config::new().with_fs(Arc::new(DirFs::new(dir.path()))));
    let docs = engine.load("main.yaml").unwrap();

    assert_eq!(
        docs,
        vec![yaml("{team: core, name: api}"), yaml("{id: 1}"), yaml("{id: 2}")]
    );
    assert_eq!(keys(&docs[0]), ["team", "name"]);
}

#[test]
fn test_dir_fs_rejects_escaping_paths() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Engine::new(Config::new().with_fs(Arc::new(DirFs::new(dir.path()))));
    let err = engine
        .process(&yaml("include: ../secret.yaml\n"), None)
        .unwrap_err();
    match err {
        Error::FileRead { source, .. } => {
            assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied)
        }
        other => panic!("expected read error, got {:?}", other),
    }
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Engine::new(Config::new().with_fs(Arc::new(DirFs::new(dir.path()))));
    assert!(matches!(
        engine.load("absent.yaml"),
        Err(Error::FileRead { .. })
    ));
}

// ============================================================================
// Merging
// ============================================================================

#[test]
fn test_merge_map_tracks_writes() {
    let mut merged = MergeMap::new();
    merged.merge(yaml("{server: {host: a}}").as_mapping().unwrap());
    merged.merge(yaml("{server: {port: 1}, tags: [x]}").as_mapping().unwrap());

    assert_eq!(
        Value::Mapping(merged.data().clone()),
        yaml("{server: {host: a, port: 1}, tags: [x]}")
    );
    assert_eq!(merged.stats()["server"], 2);
    assert_eq!(merged.stats()["server.host"], 1);
    assert_eq!(merged.stats()["server.port"], 1);
    assert_eq!(merged.distinct()["server"].len(), 2);
}

#[test]
fn test_merge_map_round_trip_counts_once() {
    let doc = yaml("{name: api, server: {host: a, limits: {cpu: 2}}, tags: [x, y]}");
    let mut merged = MergeMap::new();
    merged.merge(doc.as_mapping().unwrap());

    assert_eq!(Value::Mapping(merged.data().clone()), doc);
    assert_eq!(
        merged.stats().keys().map(String::as_str).collect::<Vec<_>>(),
        ["name", "server", "server.host", "server.limits", "server.limits.cpu", "tags"]
    );
    assert!(merged.stats().values().all(|count| *count == 1));
}

#[test]
fn test_deduplicate_keeps_first_occurrence() {
    let (value, stats) = deduplicate_with_stats(&yaml("{items: [a, b, a, {k: 1}, {k: 1}]}"));
    assert_eq!(value, yaml("{items: [a, b, {k: 1}]}"));
    assert_eq!(stats["items"]["a"], 1);
    assert_eq!(stats["items"]["k=1"], 1);
}
