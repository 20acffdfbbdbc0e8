use std::cmp;

/// Finds the Levenshtein edit distance between two strings.
///
/// Returns `None` if the distance exceeds the limit. Comparison is
/// case-insensitive so that `Remove` is closer to `remove` than to `build`.
pub fn edit_distance(a: &str, b: &str, limit: usize) -> Option<usize> {
    let a = a.to_lowercase().chars().collect::<Vec<_>>();
    let b = b.to_lowercase().chars().collect::<Vec<_>>();

    if a.len().abs_diff(b.len()) > limit {
        return None;
    }

    let mut prev = (0..=b.len()).collect::<Vec<usize>>();
    let mut current = vec![0; b.len() + 1];

    for (i, a_char) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b.iter().enumerate() {
            let substitution_cost = if a_char == b_char { 0 } else { 1 };
            current[j + 1] = cmp::min(
                cmp::min(prev[j + 1] + 1, current[j] + 1),
                prev[j] + substitution_cost,
            );
        }
        std::mem::swap(&mut prev, &mut current);
    }

    let distance = prev[b.len()];
    (distance <= limit).then_some(distance)
}

/// Find the closest element from `iter` matching `choice`. The `key` callback
/// is used to select a `&str` from the iterator to compare against `choice`.
pub fn closest<'a, T>(
    choice: &str,
    iter: impl Iterator<Item = T>,
    key: impl Fn(&T) -> &'a str,
) -> Option<T> {
    // Only consider candidates with an edit distance of 3 or less so we don't
    // suggest out-of-the-blue options.
    iter.filter_map(|e| Some((edit_distance(choice, key(&e), 3)?, e)))
        .min_by_key(|t| t.0)
        .map(|t| t.1)
}

/// Version of `closest` that returns a common "suggestion" that can be tacked
/// onto the end of an error message.
pub fn closest_msg<'a, T>(
    choice: &str,
    iter: impl Iterator<Item = T>,
    key: impl Fn(&T) -> &'a str,
) -> String {
    match closest(choice, iter, &key) {
        Some(e) => format!("\n\n\tDid you mean `{}`?", key(&e)),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance() {
        assert_eq!(edit_distance("hoist", "hoist", 3), Some(0));
        assert_eq!(edit_distance("hoist", "heist", 3), Some(1));
        assert_eq!(edit_distance("publish", "publsh", 3), Some(1));
        assert_eq!(edit_distance("add", "remove", 3), None);
        // Case differences cost nothing.
        assert_eq!(edit_distance("Remove", "remove", 3), Some(0));
    }

    #[test]
    fn suggestions() {
        let commands = ["add", "remove", "publish", "search"];
        let found = closest("pubish", commands.iter().copied(), |s| s);
        assert_eq!(found, Some("publish"));
        assert_eq!(closest("zzzzzzz", commands.iter().copied(), |s| s), None);
        assert_eq!(
            closest_msg("serach", commands.iter().copied(), |s| s),
            "\n\n\tDid you mean `search`?"
        );
    }
}
