mod label;
mod label_set;
pub mod matchers;
mod regex;

pub use label::*;
pub use label_set::*;
pub use matchers::{MatchOp, Matcher, PredicateMatch, RegexMatcher};
