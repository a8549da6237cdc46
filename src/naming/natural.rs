//! Natural (numeric-aware) filename ordering
//!
//! `IMG2.jpg` sorts before `IMG10.jpg`: digit runs compare by value and
//! everything else compares as lowercase text.

use std::cmp::Ordering;

/// A run of ASCII digits, compared by numeric value
///
/// Leading zeros are dropped on construction, so comparison by length and
/// then lexicographically is numeric comparison of arbitrary size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digits(String);

impl Digits {
    fn new(run: &str) -> Self {
        Self(run.trim_start_matches('0').to_string())
    }

    /// Digits without leading zeros ("" for zero)
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for Digits {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Digits {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One segment of a natural sort key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Segment {
    Number(Digits),
    Text(String),
}

/// Sort key alternating text and number segments
///
/// Always starts and ends with a (possibly empty) text segment, so two keys
/// only ever compare text against text and numbers against numbers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NaturalKey(Vec<Segment>);

impl NaturalKey {
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }
}

/// Build the natural sort key for a filename
pub fn natural_key(s: &str) -> NaturalKey {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut digits = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            if digits.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut text).to_lowercase()));
            }
            digits.push(c);
        } else {
            if !digits.is_empty() {
                segments.push(Segment::Number(Digits::new(&std::mem::take(&mut digits))));
            }
            text.push(c);
        }
    }

    if !digits.is_empty() {
        segments.push(Segment::Number(Digits::new(&digits)));
    }
    segments.push(Segment::Text(text.to_lowercase()));

    NaturalKey(segments)
}

/// Sort items by a name in natural order
///
/// Names with equal keys (`IMG1.jpg` / `img01.jpg`) fall back to the raw
/// name so the result never depends on directory listing order.
pub fn sort_naturally<T, F>(items: &mut [T], name: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by_cached_key(|item| {
        let name = name(item);
        (natural_key(name), name.to_string())
    });
}
