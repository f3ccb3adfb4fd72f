//! Documentation content for the yamlexpr CLI

use super::CliError;

/// Available documentation topics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocTopic {
    Interpolation,
    Conditionals,
    Loops,
    Composition,
    Matrix,
    Discard,
    Expressions,
    Functions,
}

impl DocTopic {
    pub const ALL: [DocTopic; 8] = [
        DocTopic::Interpolation,
        DocTopic::Conditionals,
        DocTopic::Loops,
        DocTopic::Composition,
        DocTopic::Matrix,
        DocTopic::Discard,
        DocTopic::Expressions,
        DocTopic::Functions,
    ];

    /// Parse a topic name, accepting a few aliases
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "interpolation" | "interpolate" | "variables" => Some(Self::Interpolation),
            "conditionals" | "conditional" | "if" => Some(Self::Conditionals),
            "loops" | "loop" | "for" => Some(Self::Loops),
            "composition" | "include" | "embed" => Some(Self::Composition),
            "matrix" => Some(Self::Matrix),
            "discard" => Some(Self::Discard),
            "expressions" | "expression" | "expr" | "operators" => Some(Self::Expressions),
            "functions" | "function" | "builtins" => Some(Self::Functions),
            _ => None,
        }
    }

    pub fn content(self) -> &'static str {
        match self {
            Self::Interpolation => INTERPOLATION_DOC,
            Self::Conditionals => CONDITIONALS_DOC,
            Self::Loops => LOOPS_DOC,
            Self::Composition => COMPOSITION_DOC,
            Self::Matrix => MATRIX_DOC,
            Self::Discard => DISCARD_DOC,
            Self::Expressions => EXPRESSIONS_DOC,
            Self::Functions => FUNCTIONS_DOC,
        }
    }
}

/// Get the docs overview (topic listing)
pub fn get_docs_overview() -> &'static str {
    r#"YAMLEXPR DOCUMENTATION

yamlexpr expands YAML documents that carry directive keys and ${...}
interpolation into plain YAML. Top-level keys of the document are visible as
variables everywhere in it.

DOCUMENTATION TOPICS

  interpolation     ${...} substitution and type preservation
  conditionals      if: keep or drop a block
  loops             for: repeat a block per element
  composition       include / embed: merge other files in
  matrix            matrix: expand a block per combination
  discard           discard: drop a block unconditionally
  expressions       Operators and literals of the expression language
  functions         Builtin functions

QUICK REFERENCE

  ${name}               Variable, keeps its type when it is the whole string
  if: env == 'prod'     Conditional block
  for: (i, x) in xs     Loop with index
  include: base.yaml    Merge a file, sibling keys win
  matrix: {os: [a, b]}  One block per combination

Run 'yamlexpr doc <topic>' for detailed documentation.
"#
}

/// Get documentation for a specific topic
pub fn get_doc_topic(name: &str) -> Result<&'static str, CliError> {
    DocTopic::parse(name)
        .map(DocTopic::content)
        .ok_or_else(|| CliError::UnknownTopic(name.to_string()))
}

const INTERPOLATION_DOC: &str = r#"INTERPOLATION - ${...} Substitution

SYNTAX
  ${expression}
    Any string scalar may contain ${...} spans. Each span is evaluated as an
    expression against the variables in scope.

    Example:
      Input:   greeting: "hello ${user.name}"
      Vars:    user: {name: alice}
      Output:  greeting: hello alice

TYPE PRESERVATION
  A string that is exactly one span keeps the type of its value.

    replicas: ${count}          integer stays integer
    tags: ${defaults.tags}      sequence stays sequence
    label: "n=${count}"         mixed text becomes a string

PATH LOOKUP
  Keys that are not valid identifiers are resolved as plain paths:

    id: ${build-id}
    first: ${items[0].name}
    quoted: ${labels['app.kubernetes.io/name']}

ERRORS
  An undefined or null reference fails with its location:
    undefined variable 'region' at services[1].env
"#;

const CONDITIONALS_DOC: &str = r#"CONDITIONALS - if

USAGE
  if: <condition>
    Placed inside a mapping. When the condition is false the whole mapping
    is dropped; otherwise the key is removed and the rest is kept.

    Example:
      debug:
        if: env != 'prod'
        level: trace

CONDITION VALUES
  true / false            booleans
  null                    false
  0, 0.0                  false, other numbers true
  "yes" "1" "true"        true
  "no" "0" "false" ""     false
  anything else           an expression, judged by truthiness

INTERPOLATED CONDITIONS
  if: "${item.kind} == service"
    Spans are substituted first. Bare words around the comparison are
    quoted, so this compares the strings 'service' and 'service'.
"#;

const LOOPS_DOC: &str = r#"LOOPS - for

USAGE
  for: <variable> in <path>
  for: (<index>, <variable>) in <path>
  for: [literal, sequence]

    The mapping is repeated once per element, with the directive key
    removed. Inside a sequence the copies are spliced into the parent.

    Example:
      users:
        - for: user in people
          name: ${user.name}

VARIABLES
  (i, x) in xs      i is the zero-based index, x the element
  (_, x) in xs      _ binds nothing
  (a, b, c) in xs   three or more names each bind the element
  [a, b, c]         a literal sequence binds each element to 'item'

CONSTRAINTS
  - The source must resolve to a sequence
  - Variable names are identifiers or _
"#;

const COMPOSITION_DOC: &str = r#"COMPOSITION - include / embed

USAGE
  include: base.yaml
  include: [base.yaml, overrides.yaml]
    Each file is read, processed and deep-merged into the current mapping
    in order. Keys next to the directive override included keys.

MERGE RULES
  mapping + mapping     merged key by key
  sequence + sequence   concatenated
  anything else         later value wins

FILES
  Names are relative to the directory of the rendered file. Included files
  see the variables of the including document. Errors report the include
  chain:
    error processing file b.yaml (a.yaml -> b.yaml): ...
"#;

const MATRIX_DOC: &str = r#"MATRIX - Combination Expansion

USAGE
  matrix:
    os: [linux, windows]
    arch: [amd64, arm64]
    exclude:
      - {os: windows, arch: arm64}
    include:
      - {os: linux, arch: riscv}
  name: build-${os}-${arch}

RULES
  - Sequence keys are dimensions, scalar keys are set on every job
  - Dimensions combine in name order, the last one varying fastest
  - exclude drops every job containing all of the listed pairs
  - include merges into every matching job, or adds a new job
  - Every job carries the same keys; missing ones are null
  - The block is repeated once per job with the job's keys in scope
"#;

const DISCARD_DOC: &str = r#"DISCARD - Drop a Block

USAGE
  discard: true
    The containing mapping is removed from the output.

VALUES
  true, "yes", "1", non-zero integers      drop
  false, "no", "0", "", null, 0            keep
"#;

const EXPRESSIONS_DOC: &str = r#"EXPRESSIONS - Operators and Literals

LITERALS
  42  3.5  "text"  'text'  true  false  null  [1, 2]  {a: 1}

ACCESS
  a.b   a[0]   a[-1]   a["key-with-dash"]

OPERATORS (lowest to highest precedence)
  c ? a : b             ternary
  a ?? b                null coalescing
  or  ||                logical or
  and &&                logical and
  == != < > <= >=       comparison
  in  not in            membership (sequence, mapping key, substring)
  + -                   addition, string concatenation
  * / %                 multiplication
  ! not -               unary

NUMBERS
  Integer arithmetic stays integer. Mixed arithmetic is exact and whole
  results collapse to integers. 1 == 1.0 holds.
"#;

const FUNCTIONS_DOC: &str = r#"FUNCTIONS - Builtins

Functions may be called directly or as methods: upper(name), name.upper().

STRINGS
  upper(s)  lower(s)  trim(s)
  split(s, sep)  join(xs, sep)
  hasPrefix(s, p)  hasSuffix(s, p)  contains(s, sub)

COLLECTIONS
  len(x)  keys(m)  values(m)  first(xs)  last(xs)
  min(xs...)  max(xs...)  sum(xs)

CONVERSION
  int(x)  float(x)  string(x)  abs(n)
"#;
