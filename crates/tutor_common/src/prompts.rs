//! Prompt building.
//!
//! Combines the classifier output and the assembled context into the final
//! instruction string sent to a provider. Two structurally different paths:
//! a compact fast-path template for trivial questions, and a general template
//! built from subject-specific voice plus complexity-specific depth. Coding
//! questions get a much stricter template with embedded worked examples,
//! because unformatted code is unusable in the downstream renderer.
//!
//! The subject/complexity instruction maps are immutable lookup tables built
//! once at process start.

use crate::classifier::{is_pure_math_question, QueryType};
use crate::context::AssembledContext;
use once_cell::sync::Lazy;
use std::collections::HashSet;

// ============================================================================
// Subject detection
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Mathematics,
    Science,
    ComputerScience,
    History,
    Literature,
    Economics,
    Psychology,
    Philosophy,
    Art,
    Medicine,
    Law,
    General,
}

impl Subject {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mathematics => "mathematics",
            Self::Science => "science",
            Self::ComputerScience => "computer_science",
            Self::History => "history",
            Self::Literature => "literature",
            Self::Economics => "economics",
            Self::Psychology => "psychology",
            Self::Philosophy => "philosophy",
            Self::Art => "art",
            Self::Medicine => "medicine",
            Self::Law => "law",
            Self::General => "general",
        }
    }
}

/// Ordered (subject, keywords) table; first subject with a keyword hit wins.
/// Computer science precedes mathematics so "binary search proof" lands in CS.
/// Keywords pass through [`normalize_word`] at build time so they compare
/// equal to normalized question words ("calculus" and "calculus," both fold
/// to the same key).
static SUBJECT_KEYWORDS: Lazy<Vec<(Subject, HashSet<String>)>> = Lazy::new(|| {
    let table: Vec<(Subject, &[&str])> = vec![
        (
            Subject::ComputerScience,
            &["programming", "algorithm", "software", "database", "compiler", "network", "python", "javascript", "recursion", "binary", "operating"],
        ),
        (
            Subject::Mathematics,
            &["math", "algebra", "calculus", "geometry", "equation", "derivative", "integral", "matrix", "theorem", "polynomial", "trigonometry", "probability"],
        ),
        (
            Subject::Medicine,
            &["anatomy", "disease", "diagnosis", "symptom", "pharmacology", "clinical", "patient", "medicine"],
        ),
        (
            Subject::Science,
            &["physics", "chemistry", "biology", "atom", "molecule", "cell", "energy", "force", "reaction", "evolution", "dna", "quantum"],
        ),
        (
            Subject::Economics,
            &["economics", "market", "inflation", "supply", "demand", "gdp", "monetary", "fiscal", "trade"],
        ),
        (
            Subject::Psychology,
            &["psychology", "behavior", "cognitive", "memory", "perception", "conditioning", "freud", "piaget"],
        ),
        (
            Subject::Philosophy,
            &["philosophy", "ethics", "metaphysics", "epistemology", "kant", "aristotle", "existentialism", "morality"],
        ),
        (
            Subject::Law,
            &["law", "legal", "statute", "constitution", "contract", "tort", "court", "liability"],
        ),
        (
            Subject::History,
            &["history", "war", "revolution", "empire", "century", "ancient", "medieval", "dynasty", "treaty"],
        ),
        (
            Subject::Literature,
            &["literature", "novel", "poem", "poetry", "shakespeare", "metaphor", "narrative", "protagonist", "essay"],
        ),
        (
            Subject::Art,
            &["art", "painting", "sculpture", "renaissance", "impressionism", "composition", "baroque"],
        ),
    ];

    table
        .into_iter()
        .map(|(subject, keywords)| {
            (subject, keywords.iter().map(|k| normalize_word(k)).collect())
        })
        .collect()
});

/// Normalize a word: strip punctuation, fold simple plurals.
fn normalize_word(word: &str) -> String {
    let cleaned: String = word
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    if cleaned.ends_with('s') && cleaned.len() > 3 {
        cleaned[..cleaned.len() - 1].to_string()
    } else {
        cleaned
    }
}

/// Detect the coarse subject of a question. First match in table order wins.
pub fn detect_subject(question: &str) -> Subject {
    let words: HashSet<String> = question
        .split_whitespace()
        .map(normalize_word)
        .collect();

    for (subject, keywords) in SUBJECT_KEYWORDS.iter() {
        if keywords.iter().any(|k| words.contains(k.as_str())) {
            return *subject;
        }
    }
    Subject::General
}

// ============================================================================
// Complexity detection
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Complexity {
    Basic,
    Intermediate,
    Advanced,
}

const ADVANCED_KEYWORDS: &[&str] = &[
    "prove",
    "derivation",
    "rigorous",
    "graduate",
    "advanced",
    "formal",
    "optimize",
    "asymptotic",
    "in depth",
];

const BASIC_KEYWORDS: &[&str] = &[
    "simple",
    "simply",
    "basics",
    "beginner",
    "intro",
    "briefly",
    "eli5",
    "definition",
];

/// Advanced markers win over basic markers; default is intermediate.
pub fn detect_complexity(question: &str) -> Complexity {
    let lower = question.to_lowercase();
    if ADVANCED_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Complexity::Advanced;
    }
    if BASIC_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Complexity::Basic;
    }
    Complexity::Intermediate
}

// ============================================================================
// Instruction tables
// ============================================================================

fn subject_voice(subject: Subject) -> &'static str {
    match subject {
        Subject::Mathematics => {
            "You are a patient mathematics tutor. Show each algebraic step, use LaTeX \
             ($...$ inline, $$...$$ display) for all notation, and state which rule \
             justifies each transformation."
        }
        Subject::Science => {
            "You are a science tutor. Anchor explanations in mechanisms and cause-effect \
             chains, define technical terms on first use, and use concrete everyday \
             analogies where they genuinely fit."
        }
        Subject::ComputerScience => {
            "You are a computer science tutor. Reason about invariants and complexity, \
             and ground every concept in a concrete example."
        }
        Subject::History => {
            "You are a history tutor. Situate events in their chronology, name the key \
             actors and their motivations, and distinguish evidence from interpretation."
        }
        Subject::Literature => {
            "You are a literature tutor. Support every claim with textual evidence and \
             attend to form as well as content."
        }
        Subject::Economics => {
            "You are an economics tutor. Make the underlying model explicit, state its \
             assumptions, and work through at least one numeric illustration."
        }
        Subject::Psychology => {
            "You are a psychology tutor. Cite the classic studies behind each claim and \
             separate well-replicated findings from contested ones."
        }
        Subject::Philosophy => {
            "You are a philosophy tutor. Reconstruct arguments premise by premise and \
             present the strongest objections alongside them."
        }
        Subject::Art => {
            "You are an art tutor. Connect techniques to the movements that developed \
             them and describe visual elements precisely."
        }
        Subject::Medicine => {
            "You are a medical educator. Explain physiology before pathology, and keep \
             all content educational rather than diagnostic."
        }
        Subject::Law => {
            "You are a law tutor. Organize answers around rules and their elements, \
             illustrate with leading cases, and flag jurisdictional differences."
        }
        Subject::General => {
            "You are a knowledgeable, encouraging tutor. Answer directly and clearly, \
             structured from the core idea outward."
        }
    }
}

fn complexity_depth(complexity: Complexity) -> &'static str {
    match complexity {
        Complexity::Basic => {
            "Pitch the answer at an introductory level: short sentences, no unexplained \
             jargon, one idea at a time."
        }
        Complexity::Intermediate => {
            "Pitch the answer at an undergraduate level: assume basic familiarity with \
             the subject, but still define specialized terms."
        }
        Complexity::Advanced => {
            "Pitch the answer at an advanced level: be rigorous, state assumptions \
             precisely, and do not skip nontrivial steps."
        }
    }
}

/// Strict template for coding questions. The renderer can only display code
/// inside fenced blocks, so the format rules are mandatory and illustrated
/// with worked examples the model can imitate.
const CODING_INSTRUCTIONS: &str = r#"You are a programming tutor. FORMAT RULES (MANDATORY):
1. ALL code MUST be inside fenced code blocks with an explicit language tag.
2. NEVER emit code outside a fenced block, not even single identifiers in step lists.
3. Use ONE programming language per answer; if the question names a language, use exactly that one.
4. Explain the approach in prose BEFORE the code, then show the complete runnable code, then walk through it.

Follow the format of these examples exactly.

Example 1, "reverse a string in python":

The simplest approach uses slice notation with a negative step:

```python
def reverse_string(s: str) -> str:
    return s[::-1]

print(reverse_string("tutor"))  # rotut
```

The slice `[::-1]` walks the string from the end to the start, producing a reversed copy in O(n).

Example 2, "check if a number is prime in javascript":

Trial division up to the square root is enough:

```javascript
function isPrime(n) {
  if (n < 2) return false;
  for (let i = 2; i * i <= n; i++) {
    if (n % i === 0) return false;
  }
  return true;
}

console.log(isPrime(97)); // true
```

Any composite number has a factor no larger than its square root, so the loop bound `i * i <= n` is sufficient."#;

// ============================================================================
// Prompt assembly
// ============================================================================

/// Build the final instruction string for a provider.
pub fn build_prompt(
    question: &str,
    query_type: QueryType,
    context: &AssembledContext,
    simple: bool,
) -> String {
    if simple {
        return build_fast_prompt(question);
    }
    if query_type == QueryType::Code {
        return format!(
            "{}\n\n{}\nQuestion: {}",
            CODING_INSTRUCTIONS,
            context_section(context),
            question
        );
    }

    let subject = detect_subject(question);
    let complexity = detect_complexity(question);

    format!(
        "{}\n{}\n\n{}\nAnswer the question below as a {} ({}) response.\n\
         Question: {}",
        subject_voice(subject),
        complexity_depth(complexity),
        context_section(context),
        query_type.as_str(),
        subject.as_str(),
        question
    )
}

/// Compact template for trivial questions: forced <think> block, then the
/// answer, math markup only for genuinely mathematical questions.
fn build_fast_prompt(question: &str) -> String {
    let math_clause = if is_pure_math_question(question) {
        "Format the final answer with LaTeX math markup ($...$)."
    } else {
        "Answer in plain prose, no math markup."
    };
    format!(
        "You are a quick, friendly tutor. First reason inside a <think>...</think> \
         block, then give the final answer on its own. Keep both short. {}\n\
         Question: {}",
        math_clause, question
    )
}

fn context_section(context: &AssembledContext) -> String {
    if context.text.trim().is_empty() {
        String::new()
    } else {
        format!(
            "=== CONTEXT (AUTHORITATIVE - DO NOT CONTRADICT) ===\n{}\n=== END CONTEXT ===\n",
            context.text.trim_end()
        )
    }
}
