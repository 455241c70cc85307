//! Naming inflection
//!
//! Every derived name (relation fields, table names, singular/plural code
//! identifiers) goes through an [`Inflector`] handed to the caller, never
//! through ambient free functions, so a test can swap in a stub.

use heck::ToLowerCamelCase;

/// Singular/plural/camel-case transformations of identifiers
pub trait Inflector: Send + Sync {
    /// Singular form of a word ("posts" → "post")
    fn singularize(&self, word: &str) -> String;

    /// Plural form of a word ("post" → "posts")
    fn pluralize(&self, word: &str) -> String;

    /// Lower camel case identifier ("Blog Post" → "blogPost")
    fn camelize(&self, word: &str) -> String;
}

// ============================================================================
// EnglishInflector
// ============================================================================

/// Rule-based English inflector.
///
/// Only the last word of a compound identifier is inflected, so
/// `blogPost` becomes `blogPosts` and `user_address` becomes
/// `user_addresses`. Pluralizing an already plural word is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishInflector;

const IRREGULAR: &[(&str, &str)] = &[
    ("child", "children"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("man", "men"),
    ("mouse", "mice"),
    ("movie", "movies"),
    ("person", "people"),
    ("tooth", "teeth"),
    ("woman", "women"),
];

const UNCOUNTABLE: &[&str] = &[
    "data",
    "equipment",
    "fish",
    "information",
    "metadata",
    "news",
    "series",
    "sheep",
    "species",
];

/// Singular nouns ending in `s` that the suffix rules would otherwise strip
const SINGULAR_S: &[&str] = &[
    "alias", "atlas", "bias", "bonus", "bus", "cactus", "campus", "canvas", "census", "chorus",
    "circus", "focus", "gas", "genus", "lens", "minus", "nexus", "octopus", "plus", "radius",
    "status", "stimulus", "syllabus", "virus",
];

impl EnglishInflector {
    pub fn new() -> Self {
        Self
    }
}

impl Inflector for EnglishInflector {
    fn singularize(&self, word: &str) -> String {
        inflect_last_word(word, singular_of)
    }

    fn pluralize(&self, word: &str) -> String {
        inflect_last_word(word, |w| plural_of(&singular_of(w)))
    }

    fn camelize(&self, word: &str) -> String {
        word.to_lower_camel_case()
    }
}

/// Split `word` before its last word and apply `rule` to that tail only,
/// keeping the tail's leading capital if it had one.
fn inflect_last_word(word: &str, rule: impl Fn(&str) -> String) -> String {
    if word.is_empty() {
        return String::new();
    }

    let split = last_word_start(word);
    let (head, tail) = word.split_at(split);
    let capitalized = tail.chars().next().is_some_and(|c| c.is_uppercase());
    let inflected = rule(&lowercase_first(tail));

    let mut out = String::with_capacity(word.len() + 3);
    out.push_str(head);
    if capitalized {
        let mut chars = inflected.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    } else {
        out.push_str(&inflected);
    }
    out
}

fn lowercase_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Byte index where the last word of a camelCase / snake_case / spaced
/// identifier begins.
fn last_word_start(word: &str) -> usize {
    let mut start = 0;
    let mut prev: Option<char> = None;
    for (i, c) in word.char_indices() {
        match prev {
            Some('_' | '-' | ' ') if c.is_alphanumeric() => start = i,
            Some(p) if c.is_uppercase() && p.is_lowercase() => start = i,
            _ => {}
        }
        prev = Some(c);
    }
    start
}

fn singular_of(word: &str) -> String {
    if UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((singular, _)) = IRREGULAR.iter().find(|(_, plural)| *plural == word) {
        return singular.to_string();
    }
    if IRREGULAR.iter().any(|(singular, _)| *singular == word) || SINGULAR_S.contains(&word) {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("es")
        && SINGULAR_S.contains(&stem)
    {
        return stem.to_string();
    }

    if let Some(stem) = word.strip_suffix("ies")
        && !stem.is_empty()
    {
        return format!("{}y", stem);
    }
    for suffix in ["sses", "shes", "ches", "xes", "zzes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    match word.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => word.to_string(),
    }
}

fn plural_of(word: &str) -> String {
    if UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == word) {
        return plural.to_string();
    }

    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        format!("{}es", word)
    } else if word.ends_with('y')
        && !word.ends_with("ey")
        && !word.ends_with("ay")
        && !word.ends_with("oy")
        && !word.ends_with("uy")
    {
        format!("{}ies", &word[..word.len() - 1])
    } else {
        format!("{}s", word)
    }
}

// ============================================================================
// Tests
// ============================================================================
