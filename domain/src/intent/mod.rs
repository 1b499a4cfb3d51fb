//! Intent domain module
//!
//! A free-text music query is classified by a language model into one or
//! more [`Intent`]s, each a `{type, keyword}` pair that a catalog search can
//! execute independently.
//!
//! Classifier output is untrusted: it is parsed by [`classify_output`],
//! which always yields at least one intent, and unknown types are coerced
//! by [`RawIntent::validate`].

pub mod entities;
pub mod parser;

pub use entities::{Intent, MusicItem, RawIntent, SearchType};
pub use parser::{
    Classification, ClassificationParseError, classify_output, extract_json, parse_intents,
    strip_code_fence,
};
