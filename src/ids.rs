//! Instance id generation and identifier normalization.
//!
//! Instance ids are embedded in markup element ids and, after
//! [`to_identifier`], in behaviour function names. The id alphabet is
//! `[a-zA-Z0-9_-]`; the identifier alphabet drops `-`.

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::collections::HashSet;

pub const INSTANCE_ID_LEN: usize = 10;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

static SAFE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid regex"));

pub fn new_instance_id() -> String {
    let mut rng = rand::rng();
    (0..INSTANCE_ID_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect()
}

pub fn new_template_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn is_identifier_safe(id: &str) -> bool {
    SAFE_ID.is_match(id)
}

/// Maps an instance id onto `[A-Za-z0-9_]`, replacing every other
/// character with `_`. Never returns an empty string.
pub fn to_identifier(id: &str) -> String {
    let normalized: String = id
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '_' { ch } else { '_' })
        .collect();
    if normalized.is_empty() {
        "_".to_string()
    } else {
        normalized
    }
}

/// Hands out instance ids disjoint from a set of reserved ids and from
/// each other.
#[derive(Debug, Default)]
pub struct IdAllocator {
    taken: HashSet<String>,
}

impl IdAllocator {
    pub fn new<I, S>(reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            taken: reserved.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allocate(&mut self) -> String {
        loop {
            let candidate = new_instance_id();
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    pub fn is_taken(&self, id: &str) -> bool {
        self.taken.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::{is_identifier_safe, new_instance_id, to_identifier, IdAllocator, INSTANCE_ID_LEN};

    #[test]
    fn generated_ids_are_identifier_safe() {
        for _ in 0..200 {
            let id = new_instance_id();
            assert_eq!(id.len(), INSTANCE_ID_LEN);
            assert!(is_identifier_safe(&id), "unsafe id {}", id);
            assert!(id.chars().all(|ch| ch.is_ascii_digit() || ch.is_ascii_lowercase()));
        }
    }

    #[test]
    fn rejects_unsafe_ids() {
        assert!(is_identifier_safe("widget-1_a"));
        assert!(!is_identifier_safe(""));
        assert!(!is_identifier_safe("a b"));
        assert!(!is_identifier_safe("x');alert(1);//"));
    }

    #[test]
    fn identifier_normalization_replaces_disallowed_characters() {
        assert_eq!(to_identifier("widget-12ab"), "widget_12ab");
        assert_eq!(to_identifier("a.b c"), "a_b_c");
        assert_eq!(to_identifier("ok_Name9"), "ok_Name9");
        assert_eq!(to_identifier(""), "_");
    }

    #[test]
    fn allocator_avoids_reserved_ids() {
        let mut allocator = IdAllocator::new(["abc", "def"]);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            let id = allocator.allocate();
            assert_ne!(id, "abc");
            assert_ne!(id, "def");
            assert!(seen.insert(id));
        }
        assert!(allocator.is_taken("abc"));
    }
}
