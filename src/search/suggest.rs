//! Query completion from a user's own thoughts

use crate::thought::Thought;

/// Content words must be longer than this to be offered
const MIN_WORD_CHARS: usize = 3;

/// Completions for `partial`
///
/// Entity values containing `partial` come first, then content words that
/// start with it. Comparison is case-insensitive, suggestions are distinct
/// and keep first-seen order.
pub fn suggest(partial: &str, thoughts: &[Thought], limit: usize) -> Vec<String> {
    let needle = partial.trim().to_lowercase();
    if needle.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut suggestions: Vec<String> = Vec::new();
    let push = |candidate: &str, suggestions: &mut Vec<String>| {
        if suggestions.len() < limit && !suggestions.iter().any(|s| s == candidate) {
            suggestions.push(candidate.to_string());
        }
    };

    for entity in thoughts.iter().flat_map(|t| t.entities.iter()) {
        if entity.value.to_lowercase().contains(&needle) {
            push(&entity.value, &mut suggestions);
        }
    }

    for thought in thoughts {
        for word in thought.content.split_whitespace() {
            let word = word.trim_matches(|c: char| !c.is_alphanumeric());
            if word.chars().count() > MIN_WORD_CHARS && word.to_lowercase().starts_with(&needle) {
                push(&word.to_lowercase(), &mut suggestions);
            }
        }
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Entity, EntityType};
    use chrono::Utc;

    fn create_test_thought(content: &str, entities: &[(EntityType, &str)]) -> Thought {
        let mut thought = Thought::new("user-1", content, Utc::now());
        for (entity_type, value) in entities {
            thought
                .entities
                .push(Entity::new(thought.id, *entity_type, *value, 0.9));
        }
        thought
    }

    #[test]
    fn test_entities_before_words() {
        let thoughts = vec![create_test_thought(
            "Paragliding near Paris",
            &[(EntityType::Location, "Paris")],
        )];

        let suggestions = suggest("par", &thoughts, 10);

        assert_eq!(suggestions, vec!["Paris", "paragliding", "paris"]);
    }

    #[test]
    fn test_entity_substring_match() {
        let thoughts = vec![create_test_thought("", &[(EntityType::Person, "Joanna")])];
        assert_eq!(suggest("ANN", &thoughts, 5), vec!["Joanna"]);
    }

    #[test]
    fn test_short_words_skipped_and_distinct() {
        let thoughts = vec![
            create_test_thought("run runner, run!", &[]),
            create_test_thought("Runner again", &[]),
        ];

        assert_eq!(suggest("run", &thoughts, 10), vec!["runner"]);
    }

    #[test]
    fn test_limit_and_empty_input() {
        let thoughts = vec![create_test_thought("alpha alpine alps altitude", &[])];

        assert_eq!(suggest("al", &thoughts, 2), vec!["alpha", "alpine"]);
        assert!(suggest("  ", &thoughts, 5).is_empty());
        assert!(suggest("al", &thoughts, 0).is_empty());
    }
}
