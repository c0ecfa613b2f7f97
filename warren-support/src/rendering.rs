//! Text rendering utilities for human-friendly error messages.
//!
//! Helpers to format lists of service names, shorten type names
//! and suggest registered names close to a misspelled one.

/// Renders a list of service names, each quoted, separated by commas.
///
/// # Examples
/// ```
/// use warren_support::rendering::render_names;
///
/// assert_eq!(render_names(&["db", "cache"]), "\"db\", \"cache\"");
/// assert_eq!(render_names(&[] as &[&str]), "");
/// ```
pub fn render_names(names: &[impl AsRef<str>]) -> String {
    names
        .iter()
        .map(|name| format!("{:?}", name.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Shortens a fully qualified type name for display.
///
/// ```
/// use warren_support::rendering::shorten_type_name;
///
/// let short = shorten_type_name("my_app::services::user::UserService");
/// assert_eq!(short, "UserService");
///
/// let short = shorten_type_name("alloc::sync::Arc<dyn my_app::traits::Logger>");
/// assert_eq!(short, "Arc<dyn Logger>");
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut result = String::with_capacity(full_name.len());
    let mut chars = full_name.chars().peekable();
    let mut segment = String::new();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                segment.clear();
            }
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&' => {
                result.push_str(&segment);
                result.push(ch);
                segment.clear();
            }
            _ => segment.push(ch),
        }
    }

    result.push_str(&segment);
    result
}

/// Suggests registered names that look like `requested`.
///
/// Candidates are ranked: case-insensitive equality first, then
/// substring containment, then small edit distance. Empty names are
/// never suggested. At most
/// `max_suggestions` names are returned, best first.
///
/// ```
/// use warren_support::rendering::suggest_similar;
///
/// let available = ["user_service", "user_repo", "logger"];
/// let found = suggest_similar("user_servise", &available, 3);
/// assert_eq!(found[0], "user_service");
/// ```
pub fn suggest_similar(
    requested: &str,
    available: &[impl AsRef<str>],
    max_suggestions: usize,
) -> Vec<String> {
    let requested_lower = requested.to_lowercase();

    let mut scored: Vec<(&str, usize)> = available
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| !name.is_empty() && *name != requested)
        .filter_map(|name| {
            let lower = name.to_lowercase();

            if lower == requested_lower {
                return Some((name, 0));
            }

            if !requested_lower.is_empty()
                && (lower.contains(&requested_lower) || requested_lower.contains(&lower))
            {
                return Some((name, 1));
            }

            // Allow roughly one typo per four characters.
            let distance = edit_distance(&lower, &requested_lower);
            let budget = (requested_lower.chars().count() / 4).max(1);
            (distance <= budget).then_some((name, 1 + distance))
        })
        .collect();

    scored.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Levenshtein distance over chars, single-row table.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            let cost = usize::from(ca != *cb);
            row[j + 1] = (above + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = above;
        }
    }

    row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_single_name() {
        assert_eq!(render_names(&["db"]), "\"db\"");
    }

    #[test]
    fn render_owned_names() {
        let names = vec![String::from("a"), String::from("b")];
        assert_eq!(render_names(&names), "\"a\", \"b\"");
    }

    #[test]
    fn shorten_no_path() {
        assert_eq!(shorten_type_name("String"), "String");
    }

    #[test]
    fn shorten_nested_generics() {
        assert_eq!(
            shorten_type_name("std::collections::hash::map::HashMap<alloc::string::String, u32>"),
            "HashMap<String, u32>"
        );
    }

    #[test]
    fn shorten_reference_and_tuple() {
        assert_eq!(shorten_type_name("(&core::primitive::str, u8)"), "(&str, u8)");
    }

    #[test]
    fn edit_distance_basics() {
        assert_eq!(edit_distance("", ""), 0);
        assert_eq!(edit_distance("abc", ""), 3);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("counter", "counter"), 0);
    }

    #[test]
    fn suggest_typo() {
        let available = ["counter", "id_gen", "random"];
        assert_eq!(suggest_similar("countr", &available, 3), vec!["counter"]);
    }

    #[test]
    fn suggest_case_insensitive_first() {
        let available = ["Logger", "logger_factory"];
        let found = suggest_similar("logger", &available, 3);
        assert_eq!(found, vec!["Logger", "logger_factory"]);
    }

    #[test]
    fn suggest_respects_limit() {
        let available = ["db1", "db2", "db3", "db4"];
        assert_eq!(suggest_similar("db", &available, 2).len(), 2);
    }

    #[test]
    fn suggest_no_match() {
        let available = ["database"];
        assert!(suggest_similar("xyz", &available, 3).is_empty());
    }

    #[test]
    fn suggest_never_offers_empty_name() {
        let available = ["", "counter"];
        assert!(suggest_similar("zzz", &available, 3).is_empty());
        assert_eq!(suggest_similar("countr", &available, 3), vec!["counter"]);
    }

    #[test]
    fn suggest_empty_request_matches_nothing_by_substring() {
        let available = ["database", "logger"];
        assert!(suggest_similar("", &available, 3).is_empty());
    }

    #[test]
    fn suggest_skips_exact_name() {
        let available = ["db"];
        assert!(suggest_similar("db", &available, 3).is_empty());
    }
}
