//! Parsing of comma-separated root path lists.

/// Split a root list into its path elements.
///
/// Elements are separated by commas; leading and trailing ASCII whitespace is
/// stripped from each element, and empty elements are dropped. No validation
/// of path syntax or existence happens here; that is the walk's job.
pub fn split_roots(list: &str) -> Vec<String> {
    list.split(',')
        .map(|element| element.trim_matches(|c: char| c.is_ascii_whitespace()))
        .filter(|element| !element.is_empty())
        .map(str::to_owned)
        .collect()
}
