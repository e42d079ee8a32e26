use super::regex::compile_anchored;
use crate::common::constants::METRIC_NAME_LABEL;
use crate::error::{QueryError, QueryResult};
use enquote::enquote;
use regex::Regex;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
pub enum MatchOp {
    Equal,
    NotEqual,
    RegexEqual,
    RegexNotEqual,
}

impl MatchOp {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MatchOp::Equal => "=",
            MatchOp::NotEqual => "!=",
            MatchOp::RegexEqual => "=~",
            MatchOp::RegexNotEqual => "!~",
        }
    }
}

impl Display for MatchOp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MatchOp {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(MatchOp::Equal),
            "!=" => Ok(MatchOp::NotEqual),
            "=~" => Ok(MatchOp::RegexEqual),
            "!~" => Ok(MatchOp::RegexNotEqual),
            _ => Err(QueryError::InvalidMatcher(format!(
                "unknown match operator \"{s}\""
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RegexMatcher {
    pub(crate) regex: Regex,
    /// pattern as written, minus any anchors
    pub value: String,
}

impl RegexMatcher {
    pub fn create(value: &str) -> QueryResult<Self> {
        let (regex, unanchored) = compile_anchored(value)?;
        Ok(Self {
            regex,
            value: unanchored.to_string(),
        })
    }

    pub fn is_match(&self, other: &str) -> bool {
        self.regex.is_match(other)
    }
}

impl Eq for RegexMatcher {}

impl PartialEq for RegexMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.regex.as_str() == other.regex.as_str()
    }
}

impl Hash for RegexMatcher {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.regex.as_str().hash(state);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PredicateMatch {
    Equal(String),
    NotEqual(String),
    RegexEqual(RegexMatcher),
    RegexNotEqual(RegexMatcher),
}

impl PredicateMatch {
    pub fn op(&self) -> MatchOp {
        match self {
            PredicateMatch::Equal(_) => MatchOp::Equal,
            PredicateMatch::NotEqual(_) => MatchOp::NotEqual,
            PredicateMatch::RegexEqual(_) => MatchOp::RegexEqual,
            PredicateMatch::RegexNotEqual(_) => MatchOp::RegexNotEqual,
        }
    }

    pub fn matches(&self, other: &str) -> bool {
        match self {
            PredicateMatch::Equal(value) => value == other,
            PredicateMatch::NotEqual(value) => value != other,
            PredicateMatch::RegexEqual(re) => re.is_match(other),
            PredicateMatch::RegexNotEqual(re) => !re.is_match(other),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            PredicateMatch::Equal(value) | PredicateMatch::NotEqual(value) => value,
            PredicateMatch::RegexEqual(re) | PredicateMatch::RegexNotEqual(re) => &re.value,
        }
    }
}

/// A predicate over the value of a single label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Matcher {
    pub label: String,
    pub matcher: PredicateMatch,
}

impl Matcher {
    pub fn create<N, V>(match_op: MatchOp, label: N, value: V) -> QueryResult<Self>
    where
        N: Into<String>,
        V: Into<String>,
    {
        let label = label.into();
        let value = value.into();

        let matcher = match match_op {
            MatchOp::Equal => PredicateMatch::Equal(value),
            MatchOp::NotEqual => PredicateMatch::NotEqual(value),
            MatchOp::RegexEqual => PredicateMatch::RegexEqual(RegexMatcher::create(&value)?),
            MatchOp::RegexNotEqual => PredicateMatch::RegexNotEqual(RegexMatcher::create(&value)?),
        };
        Ok(Self { label, matcher })
    }

    pub fn equals<N: Into<String>, V: Into<String>>(label: N, value: V) -> Self {
        Self {
            label: label.into(),
            matcher: PredicateMatch::Equal(value.into()),
        }
    }

    pub fn not_equals<N: Into<String>, V: Into<String>>(label: N, value: V) -> Self {
        Self {
            label: label.into(),
            matcher: PredicateMatch::NotEqual(value.into()),
        }
    }

    pub fn op(&self) -> MatchOp {
        self.matcher.op()
    }

    /// The literal value, or the regex pattern for regex matchers.
    pub fn value(&self) -> &str {
        self.matcher.text()
    }

    pub fn matches(&self, value: &str) -> bool {
        self.matcher.matches(value)
    }

    pub fn is_metric_name_filter(&self) -> bool {
        self.label == METRIC_NAME_LABEL && self.op() == MatchOp::Equal
    }

    /// True if this is an equality matcher on exactly `label`=`value`.
    pub fn is_equality(&self, label: &str, value: &str) -> bool {
        matches!(&self.matcher, PredicateMatch::Equal(v) if v == value) && self.label == label
    }
}

impl Display for Matcher {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.label,
            self.op(),
            enquote('"', self.value())
        )
    }
}
