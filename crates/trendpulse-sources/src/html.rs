//! Small HTML text helpers for the scraped boards.

use std::sync::LazyLock;

use regex::Regex;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// Replace every tag with a newline and decode entities, keeping the text
/// nodes on separate lines.
pub(crate) fn text_lines(fragment: &str) -> Vec<String> {
    TAG.replace_all(fragment, "\n")
        .lines()
        .map(|line| decode_entities(line.trim()))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Strip tags and collapse whitespace.
pub(crate) fn strip_tags(fragment: &str) -> String {
    let text = TAG.replace_all(fragment, " ");
    decode_entities(&text.split_whitespace().collect::<Vec<_>>().join(" "))
}

pub(crate) fn decode_entities(text: &str) -> String {
    quick_xml::escape::unescape(text)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_else(|_| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_lines_splits_on_tags() {
        let lines = text_lines("<span class=\"num\">1</span><span>손흥민 골</span><em>new</em>");
        assert_eq!(lines, vec!["1", "손흥민 골", "new"]);
    }

    #[test]
    fn strip_tags_decodes_entities() {
        assert_eq!(strip_tags("<b>Tom &amp; Jerry</b>\n  return"), "Tom & Jerry return");
    }

    #[test]
    fn unknown_entity_is_left_verbatim() {
        assert_eq!(decode_entities("a &nbsp; b"), "a &nbsp; b");
    }
}
