//! Source assembly for answers.

use crate::rag::types::Source;
use crate::types::ScoredFragment;
use std::collections::HashSet;

/// One `Source` per distinct page URL, in first-seen order of the
/// (already distance-ordered) hits. The first hit from a page supplies the
/// snippet.
pub fn assemble_sources(hits: &[ScoredFragment]) -> Vec<Source> {
    let mut seen = HashSet::new();
    hits.iter()
        .filter(|hit| seen.insert(hit.fragment.source_url.as_str()))
        .map(|hit| Source {
            url: hit.fragment.source_url.clone(),
            snippet: hit.fragment.text.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Fragment;

    fn hit(text: &str, url: &str, distance: f32) -> ScoredFragment {
        ScoredFragment {
            fragment: Fragment {
                id: format!("id_{}", text),
                text: text.to_string(),
                source_url: url.to_string(),
            },
            distance,
        }
    }

    #[test]
    fn test_dedup_keeps_first_snippet() {
        let hits = vec![
            hit("A", "https://x/1", 0.1),
            hit("B", "https://x/1", 0.2),
            hit("C", "https://x/2", 0.3),
        ];

        assert_eq!(
            assemble_sources(&hits),
            vec![
                Source {
                    url: "https://x/1".to_string(),
                    snippet: "A".to_string()
                },
                Source {
                    url: "https://x/2".to_string(),
                    snippet: "C".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_order_follows_hits_not_urls() {
        let hits = vec![
            hit("z", "https://x/z", 0.1),
            hit("a", "https://x/a", 0.2),
            hit("z2", "https://x/z", 0.3),
        ];
        let urls: Vec<String> = assemble_sources(&hits).into_iter().map(|s| s.url).collect();
        assert_eq!(urls, vec!["https://x/z", "https://x/a"]);
    }

    #[test]
    fn test_no_hits() {
        assert!(assemble_sources(&[]).is_empty());
    }
}
