//! Match span generation for result highlighting

use crate::search::SearchMatch;
use regex::RegexBuilder;

const CONTENT_FIELD: &str = "content";

/// Every case-insensitive occurrence of each query word in `content`
///
/// Spans are grouped by query word in query order, then by position.
/// Offsets are byte offsets into `content`.
pub fn highlight_matches(query: &str, content: &str) -> Vec<SearchMatch> {
    let mut matches = Vec::new();
    if content.is_empty() {
        return matches;
    }

    let mut seen: Vec<String> = Vec::new();
    for word in query.split_whitespace().map(str::to_lowercase) {
        if seen.contains(&word) {
            continue;
        }

        let matcher = match RegexBuilder::new(&regex::escape(&word))
            .case_insensitive(true)
            .build()
        {
            Ok(matcher) => matcher,
            Err(e) => {
                tracing::warn!("Skipping highlight for {:?}: {}", word, e);
                continue;
            }
        };

        for found in matcher.find_iter(content) {
            let (start, end) = (found.start(), found.end());
            matches.push(SearchMatch {
                field: CONTENT_FIELD.to_string(),
                text: word.clone(),
                start,
                end,
                highlight: format!(
                    "{}<mark>{}</mark>{}",
                    &content[..start],
                    &content[start..end],
                    &content[end..]
                ),
            });
        }

        seen.push(word);
    }

    matches
}
