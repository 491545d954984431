//! A MapReduce-compatible application that computes the
//! degree of each vertex in a graph, given a list of edges.

use common::KeyValue;

fn parse_line(line: &str) -> Option<(u64, u64)> {
    let mut iter = line.split_whitespace().take(2);
    let a = iter.next()?.parse().ok()?;
    let b = iter.next()?.parse().ok()?;
    Some((a, b))
}

/// Each `a b` edge line contributes one degree to both endpoints. Lines
/// that do not parse as an edge are ignored.
pub fn map(_filename: &str, contents: &str) -> Vec<KeyValue> {
    contents
        .lines()
        .filter_map(parse_line)
        .flat_map(|(a, b)| {
            [
                KeyValue::new(a.to_string(), "1"),
                KeyValue::new(b.to_string(), "1"),
            ]
        })
        .collect()
}

pub fn reduce(_key: &str, values: &[String]) -> String {
    let degree: u64 = values.iter().filter_map(|v| v.parse::<u64>().ok()).sum();
    format!("deg={}", degree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_emits_both_endpoints() {
        let pairs = map("edges.txt", "1 2\n2 3\nnot an edge\n");
        let keys: Vec<&str> = pairs.iter().map(|kv| kv.key.as_str()).collect();
        assert_eq!(keys, vec!["1", "2", "2", "3"]);
    }

    #[test]
    fn reduce_sums_degrees() {
        let values = vec!["1".to_string(), "1".to_string()];
        assert_eq!(reduce("2", &values), "deg=2");
    }
}
