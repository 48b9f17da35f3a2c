use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

fn identifier_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier regex must compile")
    })
}

/// Whether `name` can be used bare as a property name or member access.
pub fn is_identifier(name: &str) -> bool {
    identifier_regex().is_match(name)
}

/// Quoted string literal, escaped the way JSON escapes it (a subset of TypeScript's rules).
pub fn quote(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

/// Property key as it appears inside an object type: bare when possible, quoted otherwise.
pub fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        quote(name)
    }
}

/// `base.segment` or `base["seg-ment"]` for each segment in turn.
pub fn member_access(base: &str, segments: &[String]) -> String {
    let mut access = base.to_string();
    for segment in segments {
        if is_identifier(segment) {
            access.push('.');
            access.push_str(segment);
        } else {
            access.push('[');
            access.push_str(&quote(segment));
            access.push(']');
        }
    }
    access
}

/// `payment_intent.succeeded` → `PaymentIntentSucceededEvent`.
///
/// Runs of ASCII alphanumerics are capitalized and joined; everything else is
/// dropped. A leading digit gets an underscore prefix.
pub fn type_name_for(discriminant: &str) -> String {
    let mut name = String::new();
    for run in discriminant
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|run| !run.is_empty())
    {
        let mut chars = run.chars();
        if let Some(first) = chars.next() {
            name.push(first.to_ascii_uppercase());
            name.push_str(chars.as_str());
        }
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name.push_str("Event");
    name
}

/// Hands out unique names, suffixing `2`, `3`, ... on collision.
#[derive(Debug, Default)]
pub struct NameAllocator {
    used: HashSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reserve(&mut self, name: impl Into<String>) {
        self.used.insert(name.into());
    }

    pub fn allocate(&mut self, base: &str) -> String {
        if self.used.insert(base.to_string()) {
            return base.to_string();
        }

        let mut suffix = 2usize;
        loop {
            let candidate = format!("{base}{suffix}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}
