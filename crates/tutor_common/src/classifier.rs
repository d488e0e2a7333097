//! Query classification.
//!
//! Fast pre-LLM classification that assigns every question a [`QueryType`],
//! which bounds output length and selects a prompt template downstream.
//! Categories overlap ("explain this code"), so classification is an explicit
//! ordered rule list evaluated first-match-wins rather than cascading ifs;
//! the precedence is data, visible and testable.
//!
//! A second, independent fast-path check ([`is_simple_question`]) recognizes
//! trivial arithmetic, greetings, and basic "what is X" questions and routes
//! them to a minimal prompt, bypassing subject/complexity detection. This
//! exists purely to keep common, cheap interactions fast.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// ============================================================================
// Query Type
// ============================================================================

/// The coarse category assigned to a question. Never persisted; used only to
/// parameterize generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    ShortAnswer,
    Code,
    Reasoning,
    Essay,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortAnswer => "short_answer",
            Self::Code => "code",
            Self::Reasoning => "reasoning",
            Self::Essay => "essay",
        }
    }

    /// Output-length budget for this query type. Unconstrained generation
    /// produces user-perceived latency and cost blowups for simple
    /// questions, so every category carries a fixed cap.
    pub fn max_tokens(&self) -> u32 {
        match self {
            Self::ShortAnswer => 512,
            Self::Reasoning => 1536,
            Self::Essay => 3072,
            Self::Code => 4096,
        }
    }
}

// ============================================================================
// Patterns
// ============================================================================

/// Code-related markers: keywords, language names, fenced blocks.
static CODE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)```|\b(code|coding|program|function|script|algorithm|implement|compile|debug|syntax|recursion|loop|array|variable|class method|python|javascript|typescript|java|rust|golang|c\+\+|c#|sql|html|css|bash)\b",
    )
    .expect("code pattern")
});

/// "what/who/when/where is X" factual template.
static SHORT_FACT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(what|who|when|where)((')?s|\s+is|\s+are|\s+was|\s+were)\b")
        .expect("short fact pattern")
});

static ESSAY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(explain|analyze|analyse|compare|contrast|discuss|describe|evaluate|elaborate|summarize|summarise)\b")
        .expect("essay pattern")
});

static REASONING_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(solve|calculate|compute|prove|derive|why|how many|how much|step by step)\b")
        .expect("reasoning pattern")
});

/// Assistant @mentions, stripped before classification.
static MENTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)@(ai|tutor|assistant)\b").expect("mention pattern"));

/// Pure arithmetic, optionally phrased as "what is ...".
static ARITHMETIC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(what\s+is\s+|what's\s+)?[\d\s.+\-*/x^()=%]+\??\s*$")
        .expect("arithmetic pattern")
});

static GREETING_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(hi|hello|hey|yo|good\s+(morning|afternoon|evening)|thanks|thank\s+you|how\s+are\s+you)\b[\s!.?]*$")
        .expect("greeting pattern")
});

/// Science vocabulary that disqualifies a question from "pure math" even when
/// digits are present ("a cell divides every 3 hours" is biology, not
/// arithmetic).
const SCIENCE_KEYWORDS: &[&str] = &[
    "biology",
    "chemistry",
    "physics",
    "cell",
    "atom",
    "molecule",
    "reaction",
    "force",
    "energy",
    "velocity",
    "acceleration",
    "dna",
    "protein",
    "species",
    "organism",
    "electron",
    "compound",
    "acid",
];

/// Academic vocabulary that disqualifies a "what is X" question from the
/// simple fast path; these deserve the full subject-aware prompt.
const COMPLEX_ACADEMIC_KEYWORDS: &[&str] = &[
    "quantum",
    "thermodynamics",
    "derivative",
    "integral",
    "eigenvalue",
    "photosynthesis",
    "mitochondria",
    "polymorphism",
    "epistemology",
    "macroeconomics",
    "stoichiometry",
    "electromagnetism",
    "neurotransmitter",
    "jurisprudence",
];

// ============================================================================
// Classification rules
// ============================================================================

struct Rule {
    label: QueryType,
    applies: fn(&str) -> bool,
}

/// Ordered first-match-wins rules. Code wins over everything since coding
/// questions routinely contain "explain" or "solve"; the factual template
/// only applies when no code marker is present by virtue of running second.
static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule {
            label: QueryType::Code,
            applies: |q| CODE_PATTERN.is_match(q),
        },
        Rule {
            label: QueryType::ShortAnswer,
            applies: |q| SHORT_FACT_PATTERN.is_match(q),
        },
        Rule {
            label: QueryType::Essay,
            applies: |q| ESSAY_PATTERN.is_match(q),
        },
        Rule {
            label: QueryType::Reasoning,
            applies: |q| REASONING_PATTERN.is_match(q),
        },
    ]
});

/// Classify a question. Pure; assumes mentions are already stripped.
pub fn classify(question: &str) -> QueryType {
    for rule in RULES.iter() {
        if (rule.applies)(question) {
            return rule.label;
        }
    }
    QueryType::ShortAnswer
}

/// Remove assistant @mentions and collapse the leftover whitespace.
pub fn strip_mentions(question: &str) -> String {
    let stripped = MENTION_PATTERN.replace_all(question, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fast-path check for trivial questions: arithmetic, greetings, and short
/// "what is X" lookups. Code questions and complex academic vocabulary are
/// excluded regardless of shape.
pub fn is_simple_question(question: &str) -> bool {
    let q = question.trim();
    if q.is_empty() || q.len() > 120 {
        return false;
    }
    if CODE_PATTERN.is_match(q) {
        return false;
    }
    let lower = q.to_lowercase();
    if COMPLEX_ACADEMIC_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return false;
    }

    if ARITHMETIC_PATTERN.is_match(q) && q.chars().any(|c| c.is_ascii_digit()) {
        return true;
    }
    if GREETING_PATTERN.is_match(q) {
        return true;
    }
    // Basic "what is X" with a short X.
    if SHORT_FACT_PATTERN.is_match(q) && q.split_whitespace().count() <= 6 {
        return true;
    }
    false
}

/// True for math-with-numbers questions, false for science text that happens
/// to contain digits. Controls whether the fast prompt asks for math markup.
pub fn is_pure_math_question(question: &str) -> bool {
    let lower = question.to_lowercase();
    if SCIENCE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return false;
    }
    let has_digit = lower.chars().any(|c| c.is_ascii_digit());
    let has_operator = lower.contains('+')
        || lower.contains('-')
        || lower.contains('*')
        || lower.contains('/')
        || lower.contains('^')
        || lower.contains('=')
        || lower.contains("plus")
        || lower.contains("minus")
        || lower.contains("times")
        || lower.contains("divided");
    has_digit && has_operator
}

// ============================================================================
// Tests
// ============================================================================
