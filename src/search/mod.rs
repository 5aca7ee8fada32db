//! Linear catalog search.
//!
//! A fresh case-insensitive substring scan per query; no persistent index.
//! Matches contribution content, question, author, the parent experiment's
//! title, and code-snippet bodies. Snippet bodies are only consulted when
//! the content field did not already match.

use crate::models::{Contribution, Department};

/// A matching contribution with enough context to navigate to it.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub department_id: String,
    pub subject_id: String,
    pub experiment_id: String,
    pub experiment_title: String,
    pub contribution: Contribution,
}

/// Scan the tree for contributions matching the query. Each contribution
/// appears at most once, however many fields match. An empty or
/// whitespace-only query yields no results.
pub fn search(tree: &[Department], query: &str) -> Vec<SearchHit> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut hits = Vec::new();
    for dept in tree {
        for subject in &dept.subjects {
            for experiment in &subject.experiments {
                let title_matches = experiment.title.to_lowercase().contains(&needle);
                for contribution in &experiment.contributions {
                    if matches(contribution, title_matches, &needle) {
                        hits.push(SearchHit {
                            department_id: dept.id.clone(),
                            subject_id: subject.id.clone(),
                            experiment_id: experiment.id.clone(),
                            experiment_title: experiment.title.clone(),
                            contribution: contribution.clone(),
                        });
                    }
                }
            }
        }
    }
    hits
}

fn matches(contribution: &Contribution, title_matches: bool, needle: &str) -> bool {
    let contains = |text: &str| text.to_lowercase().contains(needle);

    contains(&contribution.content)
        || contribution.question.as_deref().is_some_and(contains)
        || contains(&contribution.author)
        || title_matches
        || contribution
            .code_snippets
            .as_deref()
            .is_some_and(|snippets| snippets.iter().any(|s| contains(&s.code)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CodeSnippet, ContributionType, Experiment, Subject, Timestamp};

    fn contribution(id: &str, content: &str) -> Contribution {
        Contribution {
            id: id.to_string(),
            author: "Jane Doe".to_string(),
            kind: ContributionType::Theory,
            content: content.to_string(),
            image_url: None,
            language: None,
            code_snippets: None,
            question: None,
            upvotes: 0,
            created_at: Timestamp::parse("2024-01-01T00:00:00Z"),
            is_ai_generated: None,
        }
    }

    fn tree_with(experiments: Vec<Experiment>) -> Vec<Department> {
        vec![Department {
            id: "dept-1".to_string(),
            name: "Computer Science".to_string(),
            subjects: vec![Subject {
                id: "subj-1".to_string(),
                name: "Data Structures Lab".to_string(),
                code: "CS301L".to_string(),
                drive_link: None,
                github_link: None,
                experiments,
            }],
        }]
    }

    fn experiment(id: &str, title: &str, contributions: Vec<Contribution>) -> Experiment {
        Experiment {
            id: id.to_string(),
            title: title.to_string(),
            objective: String::new(),
            contributions,
        }
    }

    #[test]
    fn test_matches_content_case_insensitively() {
        let tree = tree_with(vec![
            experiment(
                "exp-1",
                "Arrays",
                vec![contribution("c-1", "Implements a Stack using arrays")],
            ),
            experiment("exp-2", "Lists", vec![contribution("c-2", "Queue")]),
        ]);

        let hits = search(&tree, "stack");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].contribution.id, "c-1");
        assert_eq!(hits[0].experiment_id, "exp-1");
    }

    #[test]
    fn test_empty_query_yields_no_results() {
        let tree = tree_with(vec![experiment(
            "exp-1",
            "Arrays",
            vec![contribution("c-1", "Stack")],
        )]);
        assert!(search(&tree, "").is_empty());
        assert!(search(&tree, "   ").is_empty());
    }

    #[test]
    fn test_snippet_only_match_is_found_once() {
        let mut with_snippet = contribution("c-1", "See the attached listing");
        with_snippet.code_snippets = Some(vec![CodeSnippet {
            language: "python".to_string(),
            code: "stack = []\nstack.append(1)".to_string(),
        }]);
        let tree = tree_with(vec![experiment("exp-1", "Arrays", vec![with_snippet])]);

        let hits = search(&tree, "stack");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].contribution.id, "c-1");
    }

    #[test]
    fn test_content_and_snippet_match_yields_one_hit() {
        let mut both = contribution("c-1", "A stack implemented in Python");
        both.code_snippets = Some(vec![CodeSnippet {
            language: "python".to_string(),
            code: "stack = []".to_string(),
        }]);
        let tree = tree_with(vec![experiment("exp-1", "Arrays", vec![both])]);

        assert_eq!(search(&tree, "stack").len(), 1);
    }

    #[test]
    fn test_question_and_author_match() {
        let mut with_question = contribution("c-1", "LIFO semantics");
        with_question.question = Some("What is stack overflow?".to_string());
        let by_author = contribution("c-2", "FIFO semantics");
        let tree = tree_with(vec![experiment(
            "exp-1",
            "Basics",
            vec![with_question, by_author],
        )]);

        let overflow_hits = search(&tree, "overflow");
        assert_eq!(overflow_hits.len(), 1);
        assert_eq!(overflow_hits[0].contribution.id, "c-1");

        // Both contributions share the author.
        assert_eq!(search(&tree, "jane").len(), 2);
    }

    #[test]
    fn test_experiment_title_match_includes_its_contributions() {
        let tree = tree_with(vec![
            experiment(
                "exp-1",
                "Binary Search Tree",
                vec![contribution("c-1", "Insertion notes")],
            ),
            experiment("exp-2", "Hashing", vec![contribution("c-2", "Buckets")]),
        ]);

        let hits = search(&tree, "binary");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].contribution.id, "c-1");
        assert_eq!(hits[0].experiment_title, "Binary Search Tree");
    }

    #[test]
    fn test_no_matches() {
        let tree = tree_with(vec![experiment(
            "exp-1",
            "Arrays",
            vec![contribution("c-1", "Stack")],
        )]);
        assert!(search(&tree, "polynomial").is_empty());
    }
}
