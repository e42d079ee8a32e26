use super::label::Label;
use super::matchers::Matcher;
use crate::common::constants::METRIC_NAME_LABEL;
use std::fmt::Display;
use std::ops::Deref;

const EMPTY_VALUE: &str = "";

/// An immutable label set, kept sorted by name so that equality and ordering are
/// well-defined. Two sets compare lexicographically over their (name, value) pairs,
/// with a strict prefix sorting first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Labels(Vec<Label>);

impl Labels {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Builds a label set from arbitrary input. Entries are sorted by name; when a name
    /// repeats, the last value given wins.
    pub fn new(mut labels: Vec<Label>) -> Self {
        // stable, so later duplicates stay after earlier ones
        labels.sort_by(|a, b| a.name.cmp(&b.name));
        let mut result: Vec<Label> = Vec::with_capacity(labels.len());
        for label in labels {
            match result.last_mut() {
                Some(last) if last.name == label.name => *last = label,
                _ => result.push(label),
            }
        }
        Self(result)
    }

    pub fn from_pairs<N: AsRef<str>, V: AsRef<str>>(pairs: &[(N, V)]) -> Self {
        let labels = pairs
            .iter()
            .map(|(n, v)| Label::new(n.as_ref(), v.as_ref()))
            .collect();
        Self::new(labels)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .binary_search_by(|l| l.name.as_str().cmp(name))
            .ok()
            .map(|idx| self.0[idx].value.as_str())
    }

    pub fn metric_name(&self) -> Option<&str> {
        self.get(METRIC_NAME_LABEL)
    }

    /// Returns true if every matcher accepts this set. A missing label is treated as
    /// having the empty value.
    pub fn matches_all(&self, matchers: &[Matcher]) -> bool {
        matchers
            .iter()
            .all(|m| m.matches(self.get(&m.label).unwrap_or(EMPTY_VALUE)))
    }
}

impl Deref for Labels {
    type Target = [Label];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Label>> for Labels {
    fn from(labels: Vec<Label>) -> Self {
        Labels::new(labels)
    }
}

impl FromIterator<Label> for Labels {
    fn from_iter<T: IntoIterator<Item = Label>>(iter: T) -> Self {
        Labels::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Labels {
    type Item = &'a Label;
    type IntoIter = std::slice::Iter<'a, Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Display for Labels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, label) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{label}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::MatchOp;
    use std::cmp::Ordering;
    use test_case::test_case;

    #[test]
    fn test_new_sorts_and_dedups() {
        let labels = Labels::new(vec![
            Label::new("job", "api"),
            Label::new("env", "dev"),
            Label::new("env", "prod"),
        ]);
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].name, "env");
        assert_eq!(labels.get("env"), Some("prod"));
        assert_eq!(labels.get("job"), Some("api"));
        assert_eq!(labels.get("missing"), None);
    }

    #[test_case(&[("a", "1")], &[("a", "1")], Ordering::Equal; "equal")]
    #[test_case(&[("a", "1")], &[("a", "2")], Ordering::Less; "value")]
    #[test_case(&[("a", "1")], &[("b", "0")], Ordering::Less; "name")]
    #[test_case(&[("a", "1")], &[("a", "1"), ("b", "1")], Ordering::Less; "prefix")]
    #[test_case(&[("b", "1")], &[("a", "9"), ("c", "1")], Ordering::Greater; "name beats length")]
    fn test_ordering(a: &[(&str, &str)], b: &[(&str, &str)], expected: Ordering) {
        let a = Labels::from_pairs(a);
        let b = Labels::from_pairs(b);
        assert_eq!(a.cmp(&b), expected);
    }

    #[test]
    fn test_matches_all() {
        let labels = Labels::from_pairs(&[("__name__", "up"), ("env", "prod")]);
        let matchers = vec![
            Matcher::create(MatchOp::Equal, "__name__", "up").unwrap(),
            Matcher::create(MatchOp::RegexEqual, "env", "pro.*").unwrap(),
            Matcher::create(MatchOp::Equal, "host", "").unwrap(),
        ];
        assert!(labels.matches_all(&matchers));

        let matchers = vec![Matcher::create(MatchOp::NotEqual, "env", "prod").unwrap()];
        assert!(!labels.matches_all(&matchers));
    }

    #[test]
    fn test_display() {
        let labels = Labels::from_pairs(&[("job", "api"), ("__name__", "up")]);
        assert_eq!(labels.to_string(), r#"{__name__="up", job="api"}"#);
        assert_eq!(labels.metric_name(), Some("up"));
    }
}
