// ABOUTME: Tier-1 decoder for the line-oriented KEY: value recipe grammar
// ABOUTME: Classifies each line, then folds field, continuation and commentary lines into a record
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Grammar accepted:
//!
//! ```text
//! NAME: Chickpea Curry
//! INGREDIENTS: 1 can chickpeas | 1 can coconut milk
//! INSTRUCTIONS: Simmer everything | Serve
//! SERVINGS: 4
//! CALORIES: 1200
//! ```
//!
//! Keys are case-insensitive, may be wrapped in Markdown emphasis (`**NAME:**`)
//! and may use spaces for underscores (`PREP TIME`). Lists are pipe-delimited;
//! without pipes, following `-`/`*` bullet lines extend ingredients and `1.`
//! numbered lines extend instructions. Parsing starts at the first `NAME:` line
//! and stops at a line of trailing commentary. Unrecognised `Key:` lines, such as
//! ingredient sub-headings or extra fields, are skipped like other stray lines.

use crate::recipes::{first_number, RecipeFields};

/// Longest key the grammar recognises, in characters
const MAX_KEY_LEN: usize = 24;

/// Lines starting with these (case-insensitive) are trailing commentary
const COMMENTARY_MARKERS: [&str; 7] = [
    "note",
    "tip",
    "enjoy",
    "i hope",
    "let me know",
    "feel free",
    "---",
];

/// Fields of the structured grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKey {
    Name,
    Description,
    Category,
    Cuisine,
    Ingredients,
    Instructions,
    PrepTime,
    CookTime,
    Servings,
    Difficulty,
    Calories,
    Protein,
    Carbs,
    Fat,
}

impl FieldKey {
    fn parse(key: &str) -> Option<Self> {
        Some(match key {
            "NAME" => Self::Name,
            "DESCRIPTION" => Self::Description,
            "CATEGORY" => Self::Category,
            "CUISINE" => Self::Cuisine,
            "INGREDIENTS" => Self::Ingredients,
            "INSTRUCTIONS" => Self::Instructions,
            "PREP_TIME" => Self::PrepTime,
            "COOK_TIME" => Self::CookTime,
            "SERVINGS" => Self::Servings,
            "DIFFICULTY" => Self::Difficulty,
            "CALORIES" => Self::Calories,
            "PROTEIN" => Self::Protein,
            "CARBS" => Self::Carbs,
            "FAT" => Self::Fat,
            _ => return None,
        })
    }

    const fn is_list(self) -> bool {
        matches!(self, Self::Ingredients | Self::Instructions)
    }
}

/// One classified input line
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Field(FieldKey, &'a str),
    Bullet(&'a str),
    Numbered(&'a str),
    Commentary,
    Other,
}

fn classify(raw: &str) -> Line<'_> {
    let line = raw.trim();
    if line.is_empty() {
        return Line::Blank;
    }
    if line.starts_with("---") {
        return Line::Commentary;
    }
    if let Some(item) = strip_bullet(line) {
        return Line::Bullet(item);
    }
    if let Some(item) = strip_numbering(line) {
        return Line::Numbered(item);
    }
    if let Some((field, value)) =
        split_key(line).and_then(|(key, value)| FieldKey::parse(&key).map(|field| (field, value)))
    {
        return Line::Field(field, value);
    }
    let lowered = line
        .trim_start_matches(['*', '_', '#', ' '])
        .to_ascii_lowercase();
    if COMMENTARY_MARKERS
        .iter()
        .any(|marker| lowered.starts_with(marker))
    {
        return Line::Commentary;
    }
    Line::Other
}

/// `- item`, `* item`, `• item`; a leading `**` is emphasis, not a bullet
fn strip_bullet(line: &str) -> Option<&str> {
    if line.starts_with("**") {
        return None;
    }
    line.strip_prefix(['-', '*', '•'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

/// `1. step` or `1) step`
fn strip_numbering(line: &str) -> Option<&str> {
    let digits = line.find(|c: char| !c.is_ascii_digit())?;
    if digits == 0 {
        return None;
    }
    line[digits..]
        .strip_prefix(['.', ')'])
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

/// Split `KEY: value`, normalising the key to upper snake case
fn split_key(line: &str) -> Option<(String, &str)> {
    let unwrapped = line.trim_start_matches(['*', '#', ' ']);
    let colon = unwrapped.find(':')?;
    let key = unwrapped[..colon].trim().trim_end_matches(['*', '_']).trim();
    if key.is_empty()
        || key.len() > MAX_KEY_LEN
        || !key
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c == '_' || c == ' ')
    {
        return None;
    }
    let value = unwrapped[colon + 1..].trim().trim_start_matches('*').trim();
    Some((key.to_ascii_uppercase().replace(' ', "_"), value))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split('|')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

fn number(value: &str) -> f64 {
    first_number(value).unwrap_or(0.0)
}

fn assign(fields: &mut RecipeFields, key: FieldKey, value: &str) {
    let text = value.to_owned();
    match key {
        FieldKey::Name => fields.name = text,
        FieldKey::Description => fields.description = text,
        FieldKey::Category => fields.category = text,
        FieldKey::Cuisine => fields.cuisine = text,
        FieldKey::Ingredients => fields.ingredients = split_list(value),
        FieldKey::Instructions => fields.instructions = split_list(value),
        FieldKey::PrepTime => fields.prep_time = text,
        FieldKey::CookTime => fields.cook_time = text,
        FieldKey::Servings => fields.servings = text,
        FieldKey::Difficulty => fields.difficulty = text,
        FieldKey::Calories => fields.macros.calories = number(value),
        FieldKey::Protein => fields.macros.protein = number(value),
        FieldKey::Carbs => fields.macros.carbs = number(value),
        FieldKey::Fat => fields.macros.fat = number(value),
    }
}

/// Parse structured text; `None` when NAME or INGREDIENTS is missing
///
/// Text that opens a JSON object before its first `NAME:` line is left to
/// the JSON repair tier, since bare-keyed JSON would otherwise match here.
#[must_use]
pub fn parse(text: &str) -> Option<RecipeFields> {
    let opens_object = text
        .lines()
        .take_while(|line| !matches!(classify(line), Line::Field(FieldKey::Name, _)))
        .any(|line| line.trim_start().starts_with('{'));
    if opens_object {
        return None;
    }

    let mut lines = text
        .lines()
        .map(classify)
        .skip_while(|line| !matches!(line, Line::Field(FieldKey::Name, _)));

    let mut fields = RecipeFields::default();
    let mut current: Option<FieldKey> = None;

    for line in lines.by_ref() {
        match line {
            Line::Field(key, value) => {
                assign(&mut fields, key, value);
                current = Some(key);
            }
            Line::Bullet(item) if current == Some(FieldKey::Ingredients) => {
                fields.ingredients.push(item.to_owned());
            }
            Line::Numbered(item) if current == Some(FieldKey::Instructions) => {
                fields.instructions.push(item.to_owned());
            }
            Line::Commentary => break,
            Line::Blank | Line::Bullet(_) | Line::Numbered(_) | Line::Other => {
                if current.is_some_and(|key| !key.is_list()) {
                    current = None;
                }
            }
        }
    }

    fields.is_minimally_valid().then_some(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipe_lists_keep_order() {
        let fields = parse(
            "NAME: Curry\nINGREDIENTS: a | b | c\nINSTRUCTIONS: first | second\nSERVINGS: 4",
        )
        .unwrap();
        assert_eq!(fields.ingredients, vec!["a", "b", "c"]);
        assert_eq!(fields.instructions, vec!["first", "second"]);
        assert_eq!(fields.servings, "4");
    }

    #[test]
    fn test_preamble_is_discarded() {
        let fields =
            parse("Sure! Here's a recipe.\nCATEGORY: ignored\nNAME: Soup\nINGREDIENTS: water")
                .unwrap();
        assert_eq!(fields.name, "Soup");
        assert!(fields.category.is_empty());
    }

    #[test]
    fn test_continuation_lines() {
        let fields = parse(
            "NAME: Salad\nINGREDIENTS:\n- lettuce\n* tomato\n\nINSTRUCTIONS:\n1. Chop\n2) Toss\n",
        )
        .unwrap();
        assert_eq!(fields.ingredients, vec!["lettuce", "tomato"]);
        assert_eq!(fields.instructions, vec!["Chop", "Toss"]);
    }

    #[test]
    fn test_markdown_keys_and_spaced_names() {
        let fields = parse(
            "**NAME:** Pancakes\n**Ingredients:** flour | milk\nPrep Time: 10 minutes\nCalories: 450 kcal",
        )
        .unwrap();
        assert_eq!(fields.name, "Pancakes");
        assert_eq!(fields.prep_time, "10 minutes");
        assert!((fields.macros.calories - 450.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_commentary_stops_parsing() {
        let fields = parse(
            "NAME: Toast\nINGREDIENTS: bread\nEnjoy your meal!\nDIFFICULTY: Hard",
        )
        .unwrap();
        assert!(fields.difficulty.is_empty());
    }

    #[test]
    fn test_unknown_key_is_skipped() {
        let fields = parse("NAME: Toast\nINGREDIENTS: bread\nWINE PAIRING: red\nFAT: 9").unwrap();
        assert!((fields.macros.fat - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ingredient_sub_heading_keeps_list_open() {
        let fields = parse(
            "NAME: Chickpea Curry\nINGREDIENTS:\nFor the curry:\n- 1 can chickpeas\n- 1 can coconut milk\nFor the rice:\n- 1 cup basmati\nINSTRUCTIONS:\n1. Simmer",
        )
        .unwrap();
        assert_eq!(
            fields.ingredients,
            vec!["1 can chickpeas", "1 can coconut milk", "1 cup basmati"]
        );
        assert_eq!(fields.instructions, vec!["Simmer"]);
    }

    #[test]
    fn test_extra_field_before_ingredients() {
        let fields = parse(
            "NAME: Chickpea Curry\nTOTAL_TIME: 40 minutes\nINGREDIENTS: chickpeas | coconut milk\nSERVINGS: 4",
        )
        .unwrap();
        assert_eq!(fields.ingredients, vec!["chickpeas", "coconut milk"]);
        assert_eq!(fields.servings, "4");
    }

    #[test]
    fn test_commentary_key_still_stops_parsing() {
        let fields =
            parse("NAME: Toast\nINGREDIENTS: bread\nNote: best served warm\nFAT: 9").unwrap();
        assert!(fields.macros.fat.abs() < f64::EPSILON);
    }

    #[test]
    fn test_calories_with_thousands_separator() {
        let fields =
            parse("NAME: Curry\nINGREDIENTS: chickpeas | coconut milk\nSERVINGS: 4\nCALORIES: 1,640")
                .unwrap();
        assert!((fields.macros.calories - 1640.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bullets_after_scalar_field_are_ignored() {
        let fields = parse("NAME: Toast\nINGREDIENTS: bread\nSERVINGS: 2\n- stray").unwrap();
        assert_eq!(fields.ingredients, vec!["bread"]);
    }

    #[test]
    fn test_bare_keyed_json_is_left_to_repair() {
        assert!(parse("{\n  name: \"Dal\",\n  ingredients: [\"lentils\"]\n}").is_none());
    }

    #[test]
    fn test_missing_name_or_ingredients_falls_through() {
        assert!(parse("INGREDIENTS: a | b\nINSTRUCTIONS: c").is_none());
        assert!(parse("NAME: Air\nINSTRUCTIONS: breathe").is_none());
        assert!(parse("NAME: \nINGREDIENTS: a").is_none());
    }
}
