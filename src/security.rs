/// Maximum length of an id used as a single path segment
const MAX_SEGMENT_LEN: usize = 128;

/// Check that a request-supplied id can be joined onto a content path
/// without escaping it. Use this for match ids and league slugs before any
/// filesystem access.
pub fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.len() <= MAX_SEGMENT_LEN
        && !segment.starts_with('.')
        && !segment.contains("..")
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
