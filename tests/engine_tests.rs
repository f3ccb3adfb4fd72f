// tests/engine_tests.rs

use pretty_assertions::assert_eq;
use rstest::rstest;
use std::sync::Arc;
use yamlexpr::convert::parse_yaml;
use yamlexpr::{Context, Engine, Error, Mapping, MatrixSpec, Processor, SerdeObject, Stack, Value};

fn yaml(text: &str) -> Value {
    parse_yaml(text).unwrap()
}

fn vars(text: &str) -> Mapping {
    match yaml(text) {
        Value::Mapping(map) => map,
        other => panic!("expected mapping, got {:?}", other),
    }
}

fn process(doc: &str) -> Option<Value> {
    Engine::default().process(&yaml(doc), None).unwrap()
}

fn process_err(doc: &str) -> Error {
    Engine::default().process(&yaml(doc), None).unwrap_err()
}

fn keys(value: &Value) -> Vec<&str> {
    value.as_mapping().unwrap().keys().map(String::as_str).collect()
}

// ============================================================================
// Loops
// ============================================================================

#[test]
fn test_loop_over_root_variable() {
    let doc = yaml("for: item in items\nname: ${item}\n");
    let out = Engine::default()
        .process(&doc, Some(vars("items: [alice, bob]")))
        .unwrap();
    assert_eq!(out, Some(yaml("[{name: alice}, {name: bob}]")));
}

#[test]
fn test_loop_with_index_and_nested_source() {
    let out = process(
        r#"
app:
  services: [web, worker]
units:
  - for: (i, svc) in app.services
    name: ${svc}-${i}
    position: ${i}
"#,
    )
    .unwrap();
    assert_eq!(
        out.as_mapping().unwrap()["units"],
        yaml("[{name: web-0, position: 0}, {name: worker-1, position: 1}]")
    );
}

#[test]
fn test_loop_over_literal_sequence() {
    let out = process("ports:\n  - for: [80, 443]\n    port: ${item}\n").unwrap();
    assert_eq!(out.as_mapping().unwrap()["ports"], yaml("[{port: 80}, {port: 443}]"));
}

#[test]
fn test_loop_results_splice_into_sequence() {
    let out = process(
        r#"
extra: [build, test]
steps:
  - name: checkout
  - for: s in extra
    name: ${s}
  - name: done
"#,
    )
    .unwrap();
    assert_eq!(
        out.as_mapping().unwrap()["steps"],
        yaml("[{name: checkout}, {name: build}, {name: test}, {name: done}]")
    );
}

#[test]
fn test_nested_loops_see_outer_variables() {
    let out = process(
        r#"
envs: [dev, prod]
regions: [eu, us]
targets:
  - for: env in envs
    hosts:
      - for: region in regions
        host: ${env}.${region}.example.com
"#,
    )
    .unwrap();
    assert_eq!(
        out.as_mapping().unwrap()["targets"],
        yaml(
            r#"
- hosts: [{host: dev.eu.example.com}, {host: dev.us.example.com}]
- hosts: [{host: prod.eu.example.com}, {host: prod.us.example.com}]
"#
        )
    );
}

#[test]
fn test_empty_source_yields_empty_sequence() {
    let out = process("none: []\nlist:\n  for: x in none\n  v: ${x}\n").unwrap();
    assert_eq!(out.as_mapping().unwrap()["list"], Value::Sequence(vec![]));
}

#[test]
fn test_loop_items_filtered_by_condition() {
    let out = process(
        r#"
users:
  - {name: ann, admin: true}
  - {name: bob, admin: false}
admins:
  - for: u in users
    if: u.admin
    name: ${u.name}
"#,
    )
    .unwrap();
    assert_eq!(out.as_mapping().unwrap()["admins"], yaml("[{name: ann}]"));
}

#[test]
fn test_loop_with_three_variables() {
    let out = process("xs: [p, q]\nout:\n  - for: (i, v, w) in xs\n    pair: ${v}${w}\n").unwrap();
    assert_eq!(out.as_mapping().unwrap()["out"], yaml("[{pair: pp}, {pair: qq}]"));
}

#[rstest]
#[case("for: x in missing\nv: 1\n", "undefined variable 'missing' at for")]
#[case("name: str\nlist:\n  for: x in name\n", "for: variable 'name' must be a sequence, got string at list.for")]
#[case("for: x of xs\n", "invalid for expression 'x of xs': no ' in ' found in for expression at for")]
#[case("for: (a, b in xs\n", "invalid for expression '(a, b in xs': no ' in ' found in for expression at for")]
#[case("for: 5\n", "for: expected a sequence or loop expression, got integer at for")]
fn test_loop_errors(#[case] doc: &str, #[case] message: &str) {
    assert_eq!(process_err(doc).to_string(), message);
}

#[test]
fn test_stack_depth_restored_after_failure() {
    let engine = Engine::default();
    let stack = Stack::with_cache(vars("items: [{name: a}, 5]"), Arc::clone(engine.stack().path_cache()));
    let ctx = Context::new(stack);
    let doc = yaml("for: item in items\nname: ${item.name}\n");

    let err = engine.process_with_context(&ctx, &doc).unwrap_err();
    assert!(matches!(err, Error::Expression { .. }));
    assert_eq!(ctx.stack().depth(), 1);
    assert_eq!(ctx.stack().lookup("item"), None);
}

// ============================================================================
// Conditionals and discard
// ============================================================================

#[test]
fn test_false_condition_omits_block() {
    assert_eq!(process("if: false\nenabled: true\n"), None);
}

#[test]
fn test_condition_removes_whole_block() {
    let out = process(
        r#"
env: prod
debug:
  if: env != 'prod'
  level: trace
logging:
  if: env == 'prod'
  level: warn
"#,
    )
    .unwrap();
    assert_eq!(keys(&out), ["env", "logging"]);
    assert_eq!(out.as_mapping().unwrap()["logging"], yaml("{level: warn}"));
}

#[test]
fn test_interpolated_condition() {
    let out = process(
        r#"
kinds: [service, job]
items:
  - for: k in kinds
    if: "${k} == service"
    kind: ${k}
"#,
    )
    .unwrap();
    assert_eq!(out.as_mapping().unwrap()["items"], yaml("[{kind: service}]"));
}

#[test]
fn test_discard() {
    let out = process("a:\n  discard: true\n  x: 1\nb:\n  discard: false\n  y: 2\n").unwrap();
    assert_eq!(out, yaml("{b: {y: 2}}"));
}

#[test]
fn test_condition_error_location() {
    let err = process_err("jobs:\n  - if: nope > 1\n    x: 1\n");
    assert!(
        err.to_string().starts_with("error compiling expression 'nope > 1' at jobs[0].if"),
        "{}",
        err
    );
}

// ============================================================================
// Matrix
// ============================================================================

#[test]
fn test_matrix_excludes_partial_match() {
    let spec = MatrixSpec::parse(
        &yaml("{os: [linux, windows], arch: [x86_64], exclude: [{os: windows}]}"),
        "matrix",
    )
    .unwrap();
    let jobs = spec.expand();
    assert_eq!(jobs, vec![vars("{arch: x86_64, os: linux}")]);
}

#[test]
fn test_matrix_size_and_order() {
    let out = process(
        r#"
jobs:
  matrix:
    os: [linux, windows]
    arch: [amd64, arm64, riscv]
  name: ${os}-${arch}
"#,
    )
    .unwrap();
    let names: Vec<String> = out.as_mapping().unwrap()["jobs"]
        .as_sequence()
        .unwrap()
        .iter()
        .map(|job| job.as_mapping().unwrap()["name"].as_string())
        .collect();
    assert_eq!(
        names,
        [
            "linux-amd64",
            "windows-amd64",
            "linux-arm64",
            "windows-arm64",
            "linux-riscv",
            "windows-riscv",
        ]
    );
}

#[test]
fn test_matrix_include_appends_unmatched_job() {
    let out = process(
        r#"
jobs:
  matrix:
    os: [linux, mac]
    region: eu
    include:
      - {os: linux, experimental: true}
  os: ${os}
  region: ${region}
  experimental: ${experimental}
"#,
    )
    .unwrap();
    assert_eq!(
        out.as_mapping().unwrap()["jobs"],
        yaml(
            r#"
- {os: linux, region: eu, experimental: null}
- {os: mac, region: eu, experimental: null}
- {os: linux, region: eu, experimental: true}
"#
        )
    );
}

#[test]
fn test_matrix_include_rewrites_every_matching_job() {
    let out = process(
        r#"
jobs:
  matrix:
    version: [1, 2]
    os: [a, b]
    include:
      - {version: 1.0}
  id: ${os}-${version}
  version: ${version}
"#,
    )
    .unwrap();
    assert_eq!(
        out.as_mapping().unwrap()["jobs"],
        yaml(
            r#"
- {id: a-1, version: 1.0}
- {id: a-2, version: 2}
- {id: b-1, version: 1.0}
- {id: b-2, version: 2}
"#
        )
    );
}

#[test]
fn test_matrix_rejects_nested_mapping() {
    let err = process_err("jobs:\n  matrix:\n    os: {name: linux}\n");
    assert!(matches!(err, Error::TypeMismatch { .. }));
    assert!(err.to_string().ends_with("at jobs.matrix"));
}

// ============================================================================
// Interpolation
// ============================================================================

#[test]
fn test_whole_string_keeps_native_type() {
    let out = process(
        r#"
count: 3
ratio: 0.25
tags: [a, b]
flag: true
out:
  replicas: ${count}
  doubled: ${count * 2}
  ratio: ${ratio}
  tags: ${tags}
  flag: ${flag}
  label: "n=${count}"
  list: "tags=${tags}"
"#,
    )
    .unwrap();
    assert_eq!(
        out.as_mapping().unwrap()["out"],
        yaml(
            r#"
replicas: 3
doubled: 6
ratio: 0.25
tags: [a, b]
flag: true
label: n=3
list: 'tags=["a","b"]'
"#
        )
    );
}

#[test]
fn test_non_identifier_keys_resolve_by_path() {
    let out = process(
        r#"
labels:
  app.kubernetes.io/name: api
build-id: b42
out:
  id: ${build-id}
  app: ${labels['app.kubernetes.io/name']}
"#,
    )
    .unwrap();
    assert_eq!(out.as_mapping().unwrap()["out"], yaml("{id: b42, app: api}"));
}

#[test]
fn test_undefined_variable_location() {
    let err = process_err("services:\n  - name: ok\n  - name: ${missing}\n");
    assert_eq!(err.to_string(), "undefined variable 'missing' at services[1].name");
}

#[test]
fn test_explicit_null_preserved() {
    let out = process("a: null\nb: ~\nc: [1, null]\n").unwrap();
    assert_eq!(out, yaml("{a: null, b: null, c: [1, null]}"));
}

// ============================================================================
// Entry points
// ============================================================================

#[test]
fn test_root_variables_overridden_by_document() {
    let doc = yaml("env: prod\nname: ${env}-${team}\n");
    let out = Engine::default()
        .process(&doc, Some(vars("{env: dev, team: core}")))
        .unwrap();
    assert_eq!(out, Some(yaml("{env: prod, name: prod-core}")));
}

#[test]
fn test_parse_splits_root_expansion_into_documents() {
    let engine = Engine::default();
    let docs = engine
        .parse(&yaml("matrix: {env: [dev, prod]}\nname: app-${env}\n"))
        .unwrap();
    assert_eq!(docs, vec![yaml("{name: app-dev}"), yaml("{name: app-prod}")]);

    let docs = engine.parse(&yaml("[1, 2]")).unwrap();
    assert_eq!(docs, vec![yaml("[1, 2]")]);
}

#[test]
fn test_typed_root_object() {
    #[derive(serde::Serialize)]
    struct Release {
        version: String,
        #[serde(rename = "build-number")]
        build_number: u32,
    }

    let engine = Engine::default();
    let release = Release {
        version: "1.2.0".into(),
        build_number: 42,
    };
    let stack = engine
        .stack()
        .with_root_object(Arc::new(SerdeObject::new(&release).unwrap()));
    let doc = yaml("tag: v${version}\nbuild: ${build-number}\nalias: ${buildNumber}\n");

    let out = engine.process_with_stack(&doc, stack).unwrap();
    assert_eq!(out, Some(yaml("{tag: v1.2.0, build: 42, alias: 42}")));
}
