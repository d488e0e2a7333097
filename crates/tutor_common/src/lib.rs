//! Shared library for the tutor answer engine.
//!
//! Everything here is request-scoped and side-effect free: the daemon crate
//! (`tutord`) owns the HTTP surface, the provider clients, and the stream
//! emitter, while this crate holds the pure pipeline stages (classification,
//! context assembly, prompt building, post-processing) and the wire types.

pub mod classifier;
pub mod context;
pub mod highlight;
pub mod prompts;
pub mod stream;
pub mod types;

pub use classifier::{
    classify, is_pure_math_question, is_simple_question, strip_mentions, QueryType,
};
pub use context::{assemble, needs_current_info, AssembledContext, ContextBundle};
pub use highlight::highlight_terms;
pub use prompts::{build_prompt, detect_complexity, detect_subject, Complexity, Subject};
pub use stream::{encode_line, StreamEvent};
pub use types::{
    AnswerRequest, AnswerResponse, AttachedFile, ConversationTurn, CourseContext, CourseSummary,
    LearningProfile, ProviderResult, Source,
};
