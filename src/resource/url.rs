//! Resource-relative URL parsing.
//!
//! # Responsibilities
//! - Split a path into segments (one leading and one trailing empty dropped)
//! - Take id filters from the first segment
//! - Take the route name from the next segment (or the first, if no filter)
//!
//! # Design Decisions
//! - The route classifier is the identity: any segment is a route candidate
//! - Segments past the route are kept only to descend into child resources

use crate::resource::filter::{classify_filters, FilterSpec};

/// Filters and route extracted from one path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedUrl {
    pub filters: Vec<FilterSpec>,
    /// Route name, empty when the path names none.
    pub route: String,
    /// Segments after the route, re-joined with `/`.
    pub remainder: String,
}

/// Parse a lowercase path relative to a resource's mount point.
pub fn parse_url(path: &str) -> ParsedUrl {
    let mut segments: Vec<&str> = path.split('/').collect();
    if segments.first() == Some(&"") {
        segments.remove(0);
    }
    if segments.last() == Some(&"") {
        segments.pop();
    }

    let filters = classify_filters(segments.first().copied());
    let route_index = if filters.is_empty() { 0 } else { 1 };
    let route = segments
        .get(route_index)
        .map(|s| classify_route(s))
        .unwrap_or_default();
    let remainder = segments
        .get(route_index + 1..)
        .map(|rest| rest.join("/"))
        .unwrap_or_default();

    ParsedUrl {
        filters,
        route,
        remainder,
    }
}

/// Route name of a segment. Identity for now.
pub fn classify_route(segment: &str) -> String {
    segment.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "507f191e810c19729de860ea";

    #[test]
    fn test_empty_paths() {
        for path in ["", "/", "//"] {
            let parsed = parse_url(path);
            assert!(parsed.filters.is_empty(), "path {:?}", path);
            assert_eq!(parsed.route, "", "path {:?}", path);
        }
    }

    #[test]
    fn test_single_hex_segment() {
        for path in [ID.to_string(), format!("/{}", ID), format!("/{}/", ID)] {
            let parsed = parse_url(&path);
            assert_eq!(parsed.filters, vec![FilterSpec::id(ID)]);
            assert_eq!(parsed.route, "");
        }
    }

    #[test]
    fn test_single_name_segment() {
        let parsed = parse_url("/schema/");
        assert!(parsed.filters.is_empty());
        assert_eq!(parsed.route, "schema");
        assert_eq!(parsed.remainder, "");

        assert_eq!(parse_url("anything").route, "anything");
    }

    #[test]
    fn test_hex_then_name() {
        let parsed = parse_url(&format!("/{}/schema", ID));
        assert_eq!(parsed.filters, vec![FilterSpec::id(ID)]);
        assert_eq!(parsed.route, "schema");
    }

    #[test]
    fn test_remainder_after_route() {
        let child = "5f1d7f3e2c8b4a0012345678";
        let parsed = parse_url(&format!("/{}/gadget/{}/schema/", ID, child));
        assert_eq!(parsed.route, "gadget");
        assert_eq!(parsed.remainder, format!("{}/schema", child));
    }

    #[test]
    fn test_name_first_ignores_later_hex() {
        let parsed = parse_url(&format!("/gadget/{}", ID));
        assert!(parsed.filters.is_empty());
        assert_eq!(parsed.route, "gadget");
        assert_eq!(parsed.remainder, ID);
    }

    #[test]
    fn test_only_one_empty_segment_dropped_each_side() {
        let parsed = parse_url("//schema");
        assert!(parsed.filters.is_empty());
        assert_eq!(parsed.route, "");
        assert_eq!(parsed.remainder, "schema");
    }
}
