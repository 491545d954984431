//! Built-in map reduce applications, selectable by name on the worker
//! command line. The coordination core treats these as opaque: it never
//! inspects what a map or reduce function emits.

pub mod vertex_degree;
pub mod wc;

use common::Workload;

/// Look up a workload by its registered name.
pub fn try_named(name: &str) -> Option<Workload> {
    match name {
        "wc" => Some(Workload {
            map_fn: wc::map,
            reduce_fn: wc::reduce,
        }),
        "vertex-degree" => Some(Workload {
            map_fn: vertex_degree::map,
            reduce_fn: vertex_degree::reduce,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_resolve() {
        assert!(try_named("wc").is_some());
        assert!(try_named("vertex-degree").is_some());
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(try_named("no-such-workload").is_none());
    }
}
