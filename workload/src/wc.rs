//! Word count: emit `(word, "1")` per word occurrence, sum per word.

use common::KeyValue;

/// Words are maximal runs of alphabetic characters; everything else is a
/// separator.
pub fn map(_filename: &str, contents: &str) -> Vec<KeyValue> {
    contents
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .map(|w| KeyValue::new(w, "1"))
        .collect()
}

pub fn reduce(_key: &str, values: &[String]) -> String {
    let count: u64 = values.iter().filter_map(|v| v.parse::<u64>().ok()).sum();
    count.to_string()
}
