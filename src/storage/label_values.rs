use std::cmp::Ordering;

/// Merges sorted, duplicate-free lists into one sorted, duplicate-free list. Inputs are
/// combined by recursive halving so no list is re-scanned more than log2(k) times.
pub fn merge_string_slices(mut lists: Vec<Vec<String>>) -> Vec<String> {
    match lists.len() {
        0 => Vec::new(),
        1 => lists.pop().unwrap_or_default(),
        2 => {
            let b = lists.pop().unwrap_or_default();
            let a = lists.pop().unwrap_or_default();
            merge_two_string_slices(a, b)
        }
        n => {
            let right = lists.split_off(n / 2);
            merge_two_string_slices(merge_string_slices(lists), merge_string_slices(right))
        }
    }
}

pub fn merge_two_string_slices(a: Vec<String>, b: Vec<String>) -> Vec<String> {
    if a.is_empty() {
        return b;
    }
    if b.is_empty() {
        return a;
    }

    let mut result = Vec::with_capacity(a.len().max(b.len()));
    let mut left = a.into_iter().peekable();
    let mut right = b.into_iter().peekable();

    loop {
        let ordering = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => l.cmp(r),
            _ => break,
        };
        match ordering {
            Ordering::Less => result.extend(left.next()),
            Ordering::Greater => result.extend(right.next()),
            Ordering::Equal => {
                result.extend(left.next());
                right.next();
            }
        }
    }
    result.extend(left);
    result.extend(right);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test_case(&[&["a", "c"], &["b", "c", "d"]], &["a", "b", "c", "d"]; "overlap")]
    #[test_case(&[], &[]; "no lists")]
    #[test_case(&[&["x", "y"]], &["x", "y"]; "single list")]
    #[test_case(&[&[], &["a"]], &["a"]; "one empty")]
    #[test_case(&[&["a", "b"], &["a", "b"]], &["a", "b"]; "identical")]
    #[test_case(
        &[&["e"], &["a", "f"], &["b"], &["a", "c", "e"], &["d", "f", "g"]],
        &["a", "b", "c", "d", "e", "f", "g"];
        "five lists"
    )]
    fn test_merge_string_slices(lists: &[&[&str]], expected: &[&str]) {
        let lists = lists.iter().map(|l| strings(l)).collect();
        assert_eq!(merge_string_slices(lists), strings(expected));
    }

    #[test]
    fn test_merge_two_keeps_tail() {
        let merged = merge_two_string_slices(strings(&["a", "b"]), strings(&["b", "x", "y", "z"]));
        assert_eq!(merged, strings(&["a", "b", "x", "y", "z"]));
    }
}
