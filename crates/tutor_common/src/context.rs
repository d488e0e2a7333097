//! Context assembly.
//!
//! Folds whatever situational data the request carried (course data, enrolled
//! courses, learning profile, conversation history, live-search snippet) into
//! a single text block safe to inline into a prompt. Every field is optional
//! and absence means "omit the section"; assembly never fails.
//!
//! Assembly also collects the highlight-term list consumed by the
//! post-processor: a fixed academic vocabulary plus any course topics.

use crate::types::{ConversationTurn, CourseContext, CourseSummary, LearningProfile};
use chrono::Local;

/// How many history turns are folded into the prompt.
const MAX_HISTORY_TURNS: usize = 6;

/// How much of a live-search snippet survives into the prompt.
const MAX_SNIPPET_CHARS: usize = 600;

/// High-value academic vocabulary, always candidate highlight terms.
const ACADEMIC_VOCABULARY: &[&str] = &[
    "theorem",
    "hypothesis",
    "derivative",
    "integral",
    "algorithm",
    "photosynthesis",
    "mitosis",
    "entropy",
    "equilibrium",
    "polynomial",
    "vector",
    "matrix",
    "syllabus",
    "thesis",
    "citation",
    "probability",
    "momentum",
    "catalyst",
    "recursion",
    "inflation",
];

/// Keywords suggesting the question needs live information. When any of these
/// match, the daemon consults the web-search collaborator before prompting.
const CURRENT_INFO_KEYWORDS: &[&str] = &[
    "news",
    "today",
    "current",
    "latest",
    "recent",
    "right now",
    "this week",
    "this year",
    "happening",
    "weather",
    "stock",
    "price of",
    "election",
    "trending",
];

/// The optional situational data accompanying a question.
#[derive(Debug, Clone, Default)]
pub struct ContextBundle {
    /// Free-form context string passed by the client.
    pub extra_context: Option<String>,
    pub course: Option<CourseContext>,
    pub enrolled: Vec<CourseSummary>,
    pub profile: Option<LearningProfile>,
    /// Short text retrieved from a live web search, when warranted.
    pub current_info: Option<String>,
    pub history: Vec<ConversationTurn>,
}

/// Output of assembly: the prompt-ready block plus the highlight terms.
#[derive(Debug, Clone, Default)]
pub struct AssembledContext {
    pub text: String,
    pub highlight_terms: Vec<String>,
}

/// Does this question plausibly require live information?
pub fn needs_current_info(question: &str) -> bool {
    let lower = question.to_lowercase();
    CURRENT_INFO_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Build the context block. Absent fields are omitted; an empty bundle yields
/// only the time section.
pub fn assemble(bundle: &ContextBundle) -> AssembledContext {
    let mut text = String::new();
    let mut terms: Vec<String> = ACADEMIC_VOCABULARY.iter().map(|s| s.to_string()).collect();

    text.push_str(&format!(
        "=== CURRENT TIME ===\n{}\n",
        Local::now().format("%A, %B %e %Y, %H:%M")
    ));

    if let Some(extra) = bundle.extra_context.as_deref() {
        if !extra.trim().is_empty() {
            text.push_str("\n=== ADDITIONAL CONTEXT ===\n");
            text.push_str(extra.trim());
            text.push('\n');
        }
    }

    if let Some(course) = &bundle.course {
        text.push_str("\n=== COURSE ===\n");
        if let Some(name) = &course.course_name {
            text.push_str(&format!("Course: {}", name));
            if let Some(code) = &course.course_code {
                text.push_str(&format!(" ({})", code));
            }
            text.push('\n');
        }
        if let Some(instructor) = &course.instructor {
            text.push_str(&format!("Instructor: {}\n", instructor));
        }
        if let Some(schedule) = &course.schedule {
            text.push_str(&format!("Schedule: {}\n", schedule));
        }
        if !course.topics.is_empty() {
            text.push_str(&format!("Topics: {}\n", course.topics.join(", ")));
            terms.extend(course.topics.iter().cloned());
        }
        if !course.assignments.is_empty() {
            text.push_str(&format!("Assignments: {}\n", course.assignments.join("; ")));
        }
        if !course.exams.is_empty() {
            text.push_str(&format!("Exams: {}\n", course.exams.join("; ")));
        }
    }

    if !bundle.enrolled.is_empty() {
        text.push_str("\n=== ENROLLED COURSES ===\n");
        for c in &bundle.enrolled {
            text.push_str(&format!("- {}", c.course_name));
            if let Some(code) = &c.course_code {
                text.push_str(&format!(" ({})", code));
            }
            if let Some(instructor) = &c.instructor {
                text.push_str(&format!(", taught by {}", instructor));
            }
            text.push('\n');
        }
    }

    if let Some(profile) = &bundle.profile {
        if !profile.struggled_topics.is_empty() {
            text.push_str("\n=== LEARNING PROFILE ===\n");
            text.push_str(&format!(
                "The student has previously struggled with: {}. \
                 Explain these with extra care when they come up.\n",
                profile.struggled_topics.join(", ")
            ));
        }
    }

    if let Some(snippet) = bundle.current_info.as_deref() {
        let snippet = snippet.trim();
        if !snippet.is_empty() {
            let clipped: String = snippet.chars().take(MAX_SNIPPET_CHARS).collect();
            text.push_str("\n=== LIVE SEARCH RESULT ===\n");
            text.push_str(&clipped);
            text.push('\n');
        }
    }

    if !bundle.history.is_empty() {
        text.push_str("\n=== RECENT CONVERSATION ===\n");
        let skip = bundle.history.len().saturating_sub(MAX_HISTORY_TURNS);
        for turn in bundle.history.iter().skip(skip) {
            let speaker = if turn.role == "assistant" {
                "Assistant"
            } else {
                "Student"
            };
            text.push_str(&format!("{}: {}", speaker, turn.content.trim()));
            if let Some(file) = &turn.attached_file {
                text.push_str(&format!(" [attached: {}]", file.name));
            }
            text.push('\n');
        }
    }

    terms.sort();
    terms.dedup_by(|a, b| a.eq_ignore_ascii_case(b));

    AssembledContext {
        text,
        highlight_terms: terms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bundle_degrades_to_time_only() {
        let assembled = assemble(&ContextBundle::default());
        assert!(assembled.text.contains("=== CURRENT TIME ==="));
        assert!(!assembled.text.contains("=== COURSE ==="));
        assert!(!assembled.text.contains("=== LEARNING PROFILE ==="));
        // Academic vocabulary is always available for highlighting.
        assert!(assembled
            .highlight_terms
            .iter()
            .any(|t| t == "theorem"));
    }

    #[test]
    fn test_course_topics_become_highlight_terms() {
        let bundle = ContextBundle {
            course: Some(CourseContext {
                course_name: Some("Linear Algebra".to_string()),
                topics: vec!["eigenvalues".to_string(), "diagonalization".to_string()],
                ..Default::default()
            }),
            ..Default::default()
        };
        let assembled = assemble(&bundle);
        assert!(assembled.text.contains("Course: Linear Algebra"));
        assert!(assembled.text.contains("eigenvalues, diagonalization"));
        assert!(assembled.highlight_terms.iter().any(|t| t == "eigenvalues"));
    }

    #[test]
    fn test_history_is_capped_to_recent_turns() {
        let history: Vec<ConversationTurn> = (0..10)
            .map(|i| ConversationTurn {
                role: "user".to_string(),
                content: format!("turn {}", i),
                attached_file: None,
            })
            .collect();
        let assembled = assemble(&ContextBundle {
            history,
            ..Default::default()
        });
        assert!(!assembled.text.contains("turn 0"));
        assert!(assembled.text.contains("turn 9"));
    }

    #[test]
    fn test_attached_file_is_noted() {
        let assembled = assemble(&ContextBundle {
            history: vec![ConversationTurn {
                role: "user".to_string(),
                content: "see my homework".to_string(),
                attached_file: Some(crate::types::AttachedFile {
                    name: "hw3.pdf".to_string(),
                    mime_type: None,
                }),
            }],
            ..Default::default()
        });
        assert!(assembled.text.contains("[attached: hw3.pdf]"));
    }

    #[test]
    fn test_search_snippet_is_clipped() {
        let long = "x".repeat(2000);
        let assembled = assemble(&ContextBundle {
            current_info: Some(long),
            ..Default::default()
        });
        assert!(assembled.text.contains("=== LIVE SEARCH RESULT ==="));
        assert!(assembled.text.len() < 1500);
    }

    #[test]
    fn test_needs_current_info_keywords() {
        assert!(needs_current_info("what's in the news today?"));
        assert!(needs_current_info("latest developments in fusion power"));
        assert!(!needs_current_info("what is the pythagorean theorem"));
    }
}
