//! Pattern-bounded scanning over raw markup.
//!
//! None of these functions fail. A miss is reported through a sentinel that the
//! caller checks before scanning on:
//!
//! - [`extract`] returns an empty string and sets the cursor to `None`;
//! - [`advance_after`] and [`advance_before`] return `text.len()`.
//!
//! Patterns passed to [`extract`] and [`detach_prefix`] are regular expressions
//! and should use lazy quantifiers (`.*?`) where they span text.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Resumable scan position; `None` is the "not found" state left by [`extract`].
pub type Cursor = Option<usize>;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^<]*>").unwrap());

fn compile(pattern: &str, case_insensitive: bool) -> Option<Regex> {
    match RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .dot_matches_new_line(true)
        .build()
    {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::warn!("Invalid scan pattern {:?}: {}", pattern, e);
            None
        }
    }
}

/// Returns the text between the first `start` match at or after the cursor and
/// the next `end` match after it, moving the cursor to where `start` matched.
///
/// Matching is case-insensitive. On a miss the result is empty and the cursor
/// becomes `None`; a `None` cursor stays a miss.
pub fn extract(text: &str, start: &str, end: &str, cursor: &mut Cursor) -> String {
    let found = cursor
        .filter(|from| text.is_char_boundary(*from))
        .and_then(|from| {
            let open = compile(start, true)?.find_at(text, from)?;
            let close = compile(end, true)?.find_at(text, open.end())?;
            Some((open.start(), &text[open.end()..close.start()]))
        });

    match found {
        Some((position, region)) => {
            *cursor = Some(position);
            region.to_string()
        }
        None => {
            tracing::trace!("extract miss for {:?}..{:?}", start, end);
            *cursor = None;
            String::new()
        }
    }
}

/// Position right after the first `marker` at or after `from`, or `text.len()`.
pub fn advance_after(text: &str, marker: &str, from: usize) -> usize {
    let before = advance_before(text, marker, from);
    if before == text.len() {
        return before;
    }
    before + marker.len()
}

/// Position of the first `marker` at or after `from`, or `text.len()`.
pub fn advance_before(text: &str, marker: &str, from: usize) -> usize {
    text.get(from..)
        .and_then(|rest| rest.find(marker))
        .map(|offset| from + offset)
        .unwrap_or(text.len())
}

/// Removes and returns the shortest prefix of `text` ending with a match of
/// `pattern`. Leaves `text` untouched and returns an empty string on a miss.
///
/// `pattern` may use alternation, e.g. `"(romhead|$)"` consumes up to the next
/// section marker or everything that is left.
pub fn detach_prefix(text: &mut String, pattern: &str) -> String {
    let Some(regex) = compile(&format!("^.*?(?:{pattern})"), false) else {
        return String::new();
    };
    let Some(end) = regex.find(text).map(|m| m.end()) else {
        return String::new();
    };
    text.drain(..end).collect()
}

/// Drops every `<...>` tag, keeping the text between them.
pub fn strip_tags(text: &str) -> String {
    TAG.replace_all(text, "").into_owned()
}

/// Collapses internal whitespace runs to one space and trims the ends.
pub fn simplified(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn extract_heading() {
        let mut cursor = Some(0);
        assert_eq!(extract("<h2>Haus</h2>", "<h2>", "<", &mut cursor), "Haus");
        assert_eq!(cursor, Some(0));
    }

    #[test]
    fn extract_moves_cursor_to_match_start() {
        let text = "xx<td>a</td><TD>b</td>";
        let mut cursor = Some(0);
        assert_eq!(extract(text, "<td>", "</td>", &mut cursor), "a");
        assert_eq!(cursor, Some(2));

        cursor = cursor.map(|p| p + 1);
        assert_eq!(extract(text, "<td>", "</td>", &mut cursor), "b");
        assert_eq!(cursor, Some(12));
    }

    #[test]
    fn extract_miss_sets_sentinel() {
        let mut cursor = Some(0);
        assert_eq!(extract("<h2>Haus", "<h2>", "</h2>", &mut cursor), "");
        assert_eq!(cursor, None);

        // a miss stays a miss
        assert_eq!(extract("<h2>Haus</h2>", "<h2>", "<", &mut cursor), "");
        assert_eq!(cursor, None);
    }

    #[test]
    fn extract_is_non_greedy() {
        let mut cursor = Some(0);
        let text = r#"<span class="x" id="1">word</span><span>other</span>"#;
        assert_eq!(extract(text, r#"<span class="x".*?>"#, "</span>", &mut cursor), "word");
    }

    #[rstest]
    #[case("abcXYZdef", "XYZ", 0, 6)]
    #[case("abc", "XYZ", 0, 3)]
    #[case("XYZ XYZ", "XYZ", 1, 7)]
    #[case("abc", "a", 10, 3)]
    fn advance_after_sentinel(
        #[case] text: &str,
        #[case] marker: &str,
        #[case] from: usize,
        #[case] expected: usize,
    ) {
        assert_eq!(advance_after(text, marker, from), expected);
    }

    #[test]
    fn advance_before_points_at_marker() {
        assert_eq!(advance_before("abcXYZdef", "XYZ", 0), 3);
        assert_eq!(advance_before("abcXYZdef", "XYZ", 4), 9);
    }

    #[test]
    fn detach_consumes_sections_in_order() {
        let mut text = String::from("head romhead one romhead two");
        assert_eq!(detach_prefix(&mut text, "(romhead|$)"), "head romhead");
        assert_eq!(detach_prefix(&mut text, "(romhead|$)"), " one romhead");
        assert_eq!(detach_prefix(&mut text, "(romhead|$)"), " two");
        assert!(text.is_empty());
    }

    #[test]
    fn detach_miss_leaves_text() {
        let mut text = String::from("<tr><td>a</td>");
        assert_eq!(detach_prefix(&mut text, "<tr id"), "");
        assert_eq!(text, "<tr><td>a</td>");
    }

    #[test]
    fn strips_tags_and_whitespace() {
        assert_eq!(strip_tags("<b>das</b> <i>Haus</i>"), "das Haus");
        assert_eq!(simplified("  a \n  b "), "a b");
    }
}
