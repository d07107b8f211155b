//! Chunking and chunk-to-entity association.
//!
//! Source text is split on newlines; each non-empty line is one chunk. A
//! chunk is embedded only when it can be tied to a registered entity, and the
//! tie is explicit: the entity whose label is mentioned earliest in the chunk
//! owns it. Chunks mentioning no registered entity are skipped.

use crate::registry::NodeRegistry;
use trellis_core::EntityId;

/// A chunk paired with the entity whose payload it becomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedChunk {
    pub text: String,
    pub entity_id: EntityId,
}

/// Split source text into newline-delimited chunks.
///
/// Lines are trimmed; blank lines produce no chunk.
pub fn split_chunks(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Associate each chunk with the registered entity mentioned earliest in it.
///
/// Matching is a case-insensitive substring search over every registered
/// label. Position ties go to the earlier-registered entity. Returns the
/// tagged chunks plus the count of chunks with no mention.
pub fn associate_chunks(chunks: &[String], registry: &NodeRegistry) -> (Vec<TaggedChunk>, usize) {
    let labels: Vec<(String, EntityId)> = registry
        .entries()
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, id)| (name.to_lowercase(), id))
        .collect();

    let mut tagged = Vec::new();
    let mut skipped = 0;

    for chunk in chunks {
        match earliest_mention(chunk, &labels) {
            Some(entity_id) => tagged.push(TaggedChunk {
                text: chunk.clone(),
                entity_id,
            }),
            None => skipped += 1,
        }
    }

    (tagged, skipped)
}

fn earliest_mention(chunk: &str, labels: &[(String, EntityId)]) -> Option<EntityId> {
    let haystack = chunk.to_lowercase();
    let mut best: Option<(usize, EntityId)> = None;
    for (label, id) in labels {
        if let Some(pos) = haystack.find(label.as_str()) {
            // Strict < keeps the earlier-registered entity on ties.
            if best.map_or(true, |(best_pos, _)| pos < best_pos) {
                best = Some((pos, *id));
            }
        }
    }
    best.map(|(_, id)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_llm::RawTriple;

    fn registry_for(triples: &[RawTriple]) -> NodeRegistry {
        NodeRegistry::from_triples(triples).registry
    }

    #[test]
    fn test_split_drops_blank_lines_and_trims() {
        let chunks = split_chunks("first line\n\n  second line  \n\t\n");
        assert_eq!(chunks, vec!["first line", "second line"]);
    }

    #[test]
    fn test_split_empty_text() {
        assert!(split_chunks("").is_empty());
        assert!(split_chunks("\n\n").is_empty());
    }

    #[test]
    fn test_earliest_mention_wins() {
        let registry = registry_for(&[RawTriple::new("Pancreas", "Insulin", "produces")]);
        let chunks = vec!["Insulin is made in the pancreas.".to_string()];
        let (tagged, skipped) = associate_chunks(&chunks, &registry);
        assert_eq!(skipped, 0);
        assert_eq!(tagged[0].entity_id, registry.resolve("Insulin").unwrap());
    }

    #[test]
    fn test_mention_is_case_insensitive() {
        let registry = registry_for(&[RawTriple::new("Insulin", "Glucose", "regulates")]);
        let chunks = vec!["INSULIN levels dropped.".to_string()];
        let (tagged, skipped) = associate_chunks(&chunks, &registry);
        assert_eq!(skipped, 0);
        assert_eq!(tagged[0].entity_id, registry.resolve("Insulin").unwrap());
    }

    #[test]
    fn test_unmentioned_chunk_is_skipped() {
        let registry = registry_for(&[RawTriple::new("Insulin", "Glucose", "regulates")]);
        let chunks = vec![
            "Insulin regulates glucose.".to_string(),
            "The weather was pleasant.".to_string(),
        ];
        let (tagged, skipped) = associate_chunks(&chunks, &registry);
        assert_eq!(tagged.len(), 1);
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_tie_goes_to_earlier_registered_entity() {
        // Both labels match at position 0 of the lowercased chunk.
        let registry = registry_for(&[RawTriple::new("ab", "abc", "prefixes")]);
        let chunks = vec!["abc is a string".to_string()];
        let (tagged, _) = associate_chunks(&chunks, &registry);
        assert_eq!(tagged[0].entity_id, registry.resolve("ab").unwrap());
    }

    #[test]
    fn test_empty_registry_skips_everything() {
        let registry = NodeRegistry::new();
        let chunks = vec!["anything".to_string()];
        let (tagged, skipped) = associate_chunks(&chunks, &registry);
        assert!(tagged.is_empty());
        assert_eq!(skipped, 1);
    }
}
