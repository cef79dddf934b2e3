// ABOUTME: Tier-2 decoder that repairs near-JSON model output with an ordered chain of named rules
// ABOUTME: Each rule has its own trigger predicate and is skipped when the trigger is absent
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # JSON Repair
//!
//! [`REPAIR_RULES`] runs in order over the fence-stripped text. A rule only
//! rewrites the text when its `applies` predicate matches, so well-formed JSON
//! passes through untouched. The repaired text is parsed and its fields are
//! mapped explicitly onto [`RecipeFields`].

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::recipes::{first_number, RecipeFields, ServingsShape};

/// A named text transformation with its trigger
pub struct RepairRule {
    /// Identifier used in logs and tests
    pub name: &'static str,
    /// Whether the rule should run on this text
    pub applies: fn(&str) -> bool,
    /// The rewrite
    pub apply: fn(&str) -> String,
}

/// Repair rules in application order
pub const REPAIR_RULES: &[RepairRule] = &[
    RepairRule {
        name: "extract_object",
        applies: needs_object_extraction,
        apply: extract_object,
    },
    RepairRule {
        name: "close_trailing_brace",
        applies: lacks_trailing_brace,
        apply: close_trailing_brace,
    },
    RepairRule {
        name: "single_to_double_quotes",
        applies: has_single_quoted_keys,
        apply: single_to_double_quotes,
    },
    RepairRule {
        name: "collapse_doubled_quotes",
        applies: has_doubled_quotes,
        apply: collapse_doubled_quotes,
    },
    RepairRule {
        name: "strip_empty_array_entries",
        applies: has_empty_array_entries,
        apply: strip_empty_array_entries,
    },
    RepairRule {
        name: "quote_difficulty_values",
        applies: has_bare_difficulty,
        apply: quote_difficulty_values,
    },
    RepairRule {
        name: "quote_step_lines",
        applies: has_bare_step_lines,
        apply: quote_step_lines,
    },
    RepairRule {
        name: "quote_bare_property_names",
        applies: has_bare_property_names,
        apply: quote_bare_property_names,
    },
    RepairRule {
        name: "escape_interior_quotes",
        applies: has_interior_quotes,
        apply: escape_interior_quotes,
    },
    RepairRule {
        name: "join_broken_values",
        applies: has_broken_values,
        apply: join_broken_values,
    },
    RepairRule {
        name: "restore_opening_key_quote",
        applies: has_half_quoted_keys,
        apply: restore_opening_key_quote,
    },
];

/// Run every applicable rule in order
#[must_use]
pub fn repair(text: &str) -> String {
    REPAIR_RULES
        .iter()
        .fold(text.trim().to_owned(), |current, rule| {
            if (rule.applies)(&current) {
                debug!(rule = rule.name, "Applying JSON repair rule");
                (rule.apply)(&current)
            } else {
                current
            }
        })
}

/// Repair, parse and map a recipe object
///
/// # Errors
///
/// Returns a decode error if the repaired text is not a JSON object or a
/// field has an unusable shape
pub fn decode(text: &str) -> AppResult<RecipeFields> {
    if !text.contains('{') {
        return Err(AppError::decode_failed("response contains no JSON object"));
    }
    let repaired = repair(text);
    // Only the first value is read; trailing prose after the object is ignored.
    let value = serde_json::Deserializer::from_str(&repaired)
        .into_iter::<Value>()
        .next()
        .ok_or_else(|| AppError::decode_failed("response contains no JSON value"))?
        .map_err(|e| AppError::decode_failed(format!("repaired JSON does not parse: {e}")))?;

    match value {
        Value::Object(object) => map_fields(&object),
        other => Err(AppError::decode_failed(format!(
            "expected a JSON object, found {}",
            type_name(&other)
        ))),
    }
}

// ============================================================================
// Field mapping
// ============================================================================

fn map_fields(object: &Map<String, Value>) -> AppResult<RecipeFields> {
    let nutrition = lookup(object, &["nutrition", "macros"]).and_then(Value::as_object);
    let macro_value = |keys: &[&str]| -> AppResult<f64> {
        lookup(object, keys)
            .or_else(|| nutrition.and_then(|n| lookup(n, keys)))
            .map_or(Ok(0.0), number)
    };

    let mut fields = RecipeFields {
        name: text(object, &["name", "title"])?,
        description: text(object, &["description"])?,
        category: text(object, &["category"])?,
        cuisine: text(object, &["cuisine"])?,
        ingredients: list(object, &["ingredients"])?,
        instructions: list(object, &["instructions", "steps"])?,
        prep_time: text(object, &["prep_time", "preptime", "prep time"])?,
        cook_time: text(object, &["cook_time", "cooktime", "cook time"])?,
        servings: ServingsShape::classify(lookup(object, &["servings", "serves", "yield"]))?
            .into_text(),
        difficulty: text(object, &["difficulty"])?,
        ..RecipeFields::default()
    };
    fields.macros.calories = macro_value(&["calories", "kcal"])?;
    fields.macros.protein = macro_value(&["protein"])?;
    fields.macros.carbs = macro_value(&["carbs", "carbohydrates"])?;
    fields.macros.fat = macro_value(&["fat"])?;
    Ok(fields)
}

/// Case-insensitive lookup over a set of accepted key spellings
fn lookup<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    object
        .iter()
        .find(|(key, _)| keys.iter().any(|k| key.eq_ignore_ascii_case(k)))
        .map(|(_, value)| value)
}

fn text(object: &Map<String, Value>, keys: &[&str]) -> AppResult<String> {
    match lookup(object, keys) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.trim().to_owned()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(AppError::decode_failed(format!(
            "field '{}' must be text, found {}",
            keys[0],
            type_name(other)
        ))),
    }
}

fn list(object: &Map<String, Value>, keys: &[&str]) -> AppResult<Vec<String>> {
    match lookup(object, keys) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.iter().filter_map(list_item).collect()),
        Some(Value::String(s)) => Ok(s
            .split(['|', '\n'])
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_owned)
            .collect()),
        Some(other) => Err(AppError::decode_failed(format!(
            "field '{}' must be a list, found {}",
            keys[0],
            type_name(other)
        ))),
    }
}

/// Strings are trimmed, numbers stringified, objects flattened to their scalar values
fn list_item(item: &Value) -> Option<String> {
    let rendered = match item {
        Value::String(s) => s.trim().to_owned(),
        Value::Number(n) => n.to_string(),
        Value::Object(map) => map
            .values()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.trim().to_owned()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Value::Null | Value::Bool(_) | Value::Array(_) => return None,
    };
    (!rendered.is_empty()).then_some(rendered)
}

fn number(value: &Value) -> AppResult<f64> {
    match value {
        Value::Null => Ok(0.0),
        Value::Number(n) => Ok(n.as_f64().unwrap_or(0.0)),
        Value::String(s) => Ok(first_number(s).unwrap_or(0.0)),
        other => Err(AppError::decode_failed(format!(
            "expected a number, found {}",
            type_name(other)
        ))),
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(pattern).ok()
}

fn matches(re: &LazyLock<Option<Regex>>, text: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(text))
}

/// Apply a replacement until the text stops changing
fn replace_to_fixed_point(re: &LazyLock<Option<Regex>>, text: &str, replacement: &str) -> String {
    let Some(re) = re.as_ref() else {
        return text.to_owned();
    };
    let mut current = text.to_owned();
    loop {
        let next = re.replace_all(&current, replacement).into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Count `"` characters not preceded by a backslash escape
fn unescaped_quotes(text: &str) -> usize {
    let mut count = 0;
    let mut escaped = false;
    for c in text.chars() {
        match c {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => count += 1,
            _ => escaped = false,
        }
    }
    count
}

/// Whether byte offset `pos` lies outside any string literal
fn outside_string(text: &str, pos: usize) -> bool {
    unescaped_quotes(&text[..pos]) % 2 == 0
}

/// Rewrite regex matches that start outside string literals
fn replace_outside_strings(re: &Regex, text: &str, render: impl Fn(&Captures<'_>) -> String) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if !outside_string(text, whole.start()) {
            continue;
        }
        out.push_str(&text[last..whole.start()]);
        out.push_str(&render(&caps));
        last = whole.end();
    }
    out.push_str(&text[last..]);
    out
}

fn any_outside_strings(re: &LazyLock<Option<Regex>>, text: &str) -> bool {
    re.as_ref().is_some_and(|re| {
        re.find_iter(text)
            .any(|m| outside_string(text, m.start()))
    })
}

/// Escape every unescaped `"` in `text`
fn escape_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut escaped = false;
    for c in text.chars() {
        match c {
            '\\' if !escaped => {
                escaped = true;
                out.push(c);
            }
            '"' if !escaped => out.push_str("\\\""),
            _ => {
                escaped = false;
                out.push(c);
            }
        }
    }
    out
}

// ============================================================================
// Rules
// ============================================================================

fn needs_object_extraction(text: &str) -> bool {
    text.find('{').is_some_and(|start| start > 0)
}

/// Drop any preamble before the first `{`
fn extract_object(text: &str) -> String {
    text.find('{')
        .map_or_else(|| text.to_owned(), |start| text[start..].to_owned())
}

fn lacks_trailing_brace(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.starts_with('{') && !trimmed.ends_with('}')
}

/// (a) Close a truncated object, dropping a dangling comma first
fn close_trailing_brace(text: &str) -> String {
    let trimmed = text.trim().trim_end_matches(',').trim_end();
    format!("{trimmed}\n}}")
}

static SINGLE_QUOTED_KEY: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"[{,]\s*'[A-Za-z_][A-Za-z0-9_ ]*'\s*:"));
static SINGLE_QUOTE_OPEN: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"([{\[,:]\s*)'"));
static SINGLE_QUOTE_CLOSE: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"'(\s*[:,\]}])"));

fn has_single_quoted_keys(text: &str) -> bool {
    matches(&SINGLE_QUOTED_KEY, text)
}

/// (b) Python-style `{'key': 'value'}` to JSON; apostrophes inside words survive
fn single_to_double_quotes(text: &str) -> String {
    let opened = replace_to_fixed_point(&SINGLE_QUOTE_OPEN, text, "${1}\"");
    replace_to_fixed_point(&SINGLE_QUOTE_CLOSE, &opened, "\"${1}")
}

static DOUBLED_BEFORE_WORD: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r#"""(\w)"#));
static DOUBLED_AFTER_WORD: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r#"(\w)"""#));

fn has_doubled_quotes(text: &str) -> bool {
    matches(&DOUBLED_BEFORE_WORD, text) || matches(&DOUBLED_AFTER_WORD, text)
}

/// (c) `""Easy""` to `"Easy"`; empty strings (`""` next to punctuation) are kept
fn collapse_doubled_quotes(text: &str) -> String {
    let leading = replace_to_fixed_point(&DOUBLED_BEFORE_WORD, text, "\"${1}");
    replace_to_fixed_point(&DOUBLED_AFTER_WORD, &leading, "${1}\"")
}

static EMPTY_ENTRY_MIDDLE: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r#",\s*""\s*,"#));
static EMPTY_ENTRY_FIRST: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r#"\[\s*""\s*,\s*"#));
static EMPTY_ENTRY_LAST: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r#"\s*,\s*""\s*\]"#));
static EMPTY_ENTRY_ONLY: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r#"\[\s*""\s*\]"#));

fn has_empty_array_entries(text: &str) -> bool {
    [
        &EMPTY_ENTRY_MIDDLE,
        &EMPTY_ENTRY_FIRST,
        &EMPTY_ENTRY_LAST,
        &EMPTY_ENTRY_ONLY,
    ]
    .into_iter()
    .any(|re| matches(re, text))
}

/// (d) Remove `""` entries from arrays
fn strip_empty_array_entries(text: &str) -> String {
    let text = replace_to_fixed_point(&EMPTY_ENTRY_MIDDLE, text, ",");
    let text = replace_to_fixed_point(&EMPTY_ENTRY_FIRST, &text, "[");
    let text = replace_to_fixed_point(&EMPTY_ENTRY_LAST, &text, "]");
    replace_to_fixed_point(&EMPTY_ENTRY_ONLY, &text, "[]")
}

static BARE_DIFFICULTY: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(:\s*)(Easy|Medium|Hard)(\s*[,}\n])"));

fn has_bare_difficulty(text: &str) -> bool {
    any_outside_strings(&BARE_DIFFICULTY, text)
}

/// (e) `"difficulty": Easy` to `"difficulty": "Easy"`
fn quote_difficulty_values(text: &str) -> String {
    let Some(re) = BARE_DIFFICULTY.as_ref() else {
        return text.to_owned();
    };
    replace_outside_strings(re, text, |caps| {
        format!("{}\"{}\"{}", &caps[1], &caps[2], &caps[3])
    })
}

static BARE_STEP_LINE: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?m)^([ \t]*)(Step \d+:[^\n]*?)(,?)[ \t]*$"));

fn has_bare_step_lines(text: &str) -> bool {
    matches(&BARE_STEP_LINE, text)
}

/// (f) Quote unquoted `Step N: ...` array lines, escaping quotes inside them
fn quote_step_lines(text: &str) -> String {
    let Some(re) = BARE_STEP_LINE.as_ref() else {
        return text.to_owned();
    };
    re.replace_all(text, |caps: &Captures<'_>| {
        format!("{}\"{}\"{}", &caps[1], escape_quotes(caps[2].trim_end()), &caps[3])
    })
    .into_owned()
}

static BARE_PROPERTY: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(r"(?m)(^[ \t]*|[{,][ \t\r\n]*)([A-Za-z_][A-Za-z0-9_]*)([ \t]*:)")
});

fn has_bare_property_names(text: &str) -> bool {
    any_outside_strings(&BARE_PROPERTY, text)
}

/// (g) `name: "x"` to `"name": "x"`
fn quote_bare_property_names(text: &str) -> String {
    let Some(re) = BARE_PROPERTY.as_ref() else {
        return text.to_owned();
    };
    replace_outside_strings(re, text, |caps| {
        format!("{}\"{}\"{}", &caps[1], &caps[2], &caps[3])
    })
}

static QUOTED_VALUE_LINE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(r#"^(\s*(?:"[^"\n]+"\s*:\s*)?")(.*)("\s*,?\s*)$"#)
});
static STRUCTURE_INSIDE: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r#""\s*[,:]\s*""#));

/// Inner text of a single-value line that still holds unescaped quotes
fn interior_of(line: &str) -> Option<Captures<'_>> {
    let caps = QUOTED_VALUE_LINE.as_ref()?.captures(line)?;
    let inner = caps.get(2)?.as_str();
    (unescaped_quotes(inner) > 0 && !matches(&STRUCTURE_INSIDE, inner)).then_some(caps)
}

fn has_interior_quotes(text: &str) -> bool {
    text.lines().any(|line| interior_of(line).is_some())
}

/// (h) `"description": "A "quick" curry",` to `"description": "A \"quick\" curry",`
fn escape_interior_quotes(text: &str) -> String {
    text.lines()
        .map(|line| {
            interior_of(line).map_or_else(
                || line.to_owned(),
                |caps| format!("{}{}{}", &caps[1], escape_quotes(&caps[2]), &caps[3]),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn has_broken_values(text: &str) -> bool {
    text.lines().any(|line| unescaped_quotes(line) % 2 == 1)
}

/// (i) Join a line that opens a string with the lines that close it
fn join_broken_values(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut pending: Option<String> = None;

    for line in text.lines() {
        match pending.take() {
            Some(mut open) => {
                open.push(' ');
                open.push_str(line.trim());
                if unescaped_quotes(&open) % 2 == 1 {
                    pending = Some(open);
                } else {
                    out.push(open);
                }
            }
            None if unescaped_quotes(line) % 2 == 1 => pending = Some(line.to_owned()),
            None => out.push(line.to_owned()),
        }
    }
    out.extend(pending);
    out.join("\n")
}

static HALF_QUOTED_KEY: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(r#"(?m)(^[ \t]*|[{,][ \t\r\n]*)([A-Za-z_][A-Za-z0-9_]*)"([ \t]*:)"#)
});

fn has_half_quoted_keys(text: &str) -> bool {
    any_outside_strings(&HALF_QUOTED_KEY, text)
}

/// (j) `name": "x"` to `"name": "x"`
fn restore_opening_key_quote(text: &str) -> String {
    let Some(re) = HALF_QUOTED_KEY.as_ref() else {
        return text.to_owned();
    };
    replace_outside_strings(re, text, |caps| {
        format!("{}\"{}\"{}", &caps[1], &caps[2], &caps[3])
    })
}
