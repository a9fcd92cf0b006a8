//! Sanitizer functions for Python code generation
//!
//! This module provides utilities to turn arbitrary strings found in OpenAPI
//! documents into valid Python identifiers and safe docstring text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static UNICODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{2018}\u{2019}\u{201C}\u{201D}\u{2013}\u{2014}]").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static NON_IDENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").unwrap());

/// Reserved words that cannot be used as Python identifiers
pub const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// `BaseModel` attributes a pydantic v1 field may not shadow
pub const PYDANTIC_RESERVED: &[&str] = &[
    "Config", "construct", "copy", "dict", "fields", "from_orm", "json", "parse_file",
    "parse_obj", "parse_raw", "schema", "schema_json", "update_forward_refs", "validate",
];

/// Names the models artifact imports or annotates with. A class attribute with
/// one of these names replaces the type for every later annotation.
pub const MODEL_SYMBOLS: &[&str] = &[
    "Any", "BaseModel", "Enum", "Field", "List", "Optional", "bool", "bytes", "confloat",
    "conint", "constr", "date", "datetime", "float", "int", "list", "str", "validator",
];

/// Argument and local names of every generated client function
pub const CLIENT_FUNCTION_NAMES: &[&str] = &[
    "aiohttp", "headers", "headers_", "json", "kwargs", "params", "proxies", "proxies_",
    "proxy", "req_data", "requests", "response_obj", "session", "url",
];

/// Maps any string onto a valid Python identifier
///
/// This function:
/// - Replaces every character outside `[A-Za-z0-9_]` with an underscore
/// - Prefixes identifiers starting with a digit with an underscore
/// - Appends an underscore to Python keywords
/// - Maps the empty string to `_`
///
/// # Examples
/// ```
/// use pyclientgen::generation::sanitizers::sanitize_identifier;
///
/// assert_eq!(sanitize_identifier("api-key"), "api_key");
/// assert_eq!(sanitize_identifier("from"), "from_");
/// assert_eq!(sanitize_identifier("2fa"), "_2fa");
/// ```
pub fn sanitize_identifier(raw: &str) -> String {
    let mut ident = NON_IDENT_RE.replace_all(raw, "_").into_owned();
    if ident.is_empty() {
        return "_".to_string();
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if is_python_keyword(&ident) {
        ident.push('_');
    }
    ident
}

pub fn is_python_keyword(ident: &str) -> bool {
    PYTHON_KEYWORDS.contains(&ident)
}

/// Maps a property name onto an identifier pydantic v1 accepts as a field
///
/// Leading underscores would make the attribute private, so such names get a
/// `field` prefix. Names that shadow `BaseModel` attributes or imported types
/// get a trailing underscore.
///
/// # Examples
/// ```
/// use pyclientgen::generation::sanitizers::sanitize_field_identifier;
///
/// assert_eq!(sanitize_field_identifier("_links"), "field_links");
/// assert_eq!(sanitize_field_identifier("schema"), "schema_");
/// assert_eq!(sanitize_field_identifier("date"), "date_");
/// ```
pub fn sanitize_field_identifier(raw: &str) -> String {
    let ident = sanitize_identifier(raw);
    if ident.starts_with('_') {
        format!("field{ident}")
    } else if PYDANTIC_RESERVED.contains(&ident.as_str()) || MODEL_SYMBOLS.contains(&ident.as_str())
    {
        format!("{ident}_")
    } else {
        ident
    }
}

/// Maps a path parameter onto an argument name that does not clash with the
/// fixed arguments and locals of a client function
pub fn sanitize_parameter_identifier(raw: &str) -> String {
    let ident = sanitize_identifier(raw);
    if CLIENT_FUNCTION_NAMES.contains(&ident.as_str()) {
        format!("{ident}_param")
    } else {
        ident
    }
}

/// Returns `base`, or `base_2`, `base_3`, ... when already taken, and records
/// the result
pub fn unique_identifier(base: &str, taken: &mut HashSet<String>) -> String {
    let mut candidate = base.to_string();
    let mut suffix = 2;
    while taken.contains(&candidate) {
        candidate = format!("{base}_{suffix}");
        suffix += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

/// Whether the string is already a valid Python identifier
pub fn is_valid_identifier(ident: &str) -> bool {
    !ident.is_empty()
        && !ident.starts_with(|c: char| c.is_ascii_digit())
        && !NON_IDENT_RE.is_match(ident)
        && !is_python_keyword(ident)
}

/// Sanitizes an OpenAPI summary for use inside a triple-quoted docstring
///
/// Smart quotes and dashes are replaced with ASCII, whitespace runs collapse to
/// a single space, blank lines are dropped, and backslashes and triple quotes
/// are escaped.
pub fn sanitize_docstring(input: &str) -> String {
    input
        .lines()
        .map(|line| {
            let line = UNICODE_RE.replace_all(line, |caps: &regex::Captures| match &caps[0] {
                "\u{2018}" | "\u{2019}" => "'",
                "\u{201C}" | "\u{201D}" => "\"",
                _ => "-",
            });
            WHITESPACE_RE.replace_all(line.trim(), " ").into_owned()
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .replace('\\', "\\\\")
        .replace("\"\"\"", "\\\"\\\"\\\"")
}
