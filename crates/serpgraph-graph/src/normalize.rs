//! Keyword normalization.
//!
//! Every name entering the graph goes through [`normalize`], so node identity,
//! duplicate bookkeeping and frontier membership all agree on spelling.

/// Lowercase, replace non-ASCII runs with a single space, collapse space runs.
///
/// Idempotent: normalizing an already-normalized keyword is a no-op.
pub fn normalize(keyword: &str) -> String {
    let mut out = String::with_capacity(keyword.len());
    let mut prev_space = false;
    for ch in keyword.to_lowercase().chars() {
        let ch = if ch.is_ascii() { ch } else { ' ' };
        if ch == ' ' {
            if prev_space {
                continue;
            }
            prev_space = true;
        } else {
            prev_space = false;
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn lowercases_and_replaces_non_ascii() {
        assert_eq!(normalize("Zürich Weather"), "z rich weather");
        assert_eq!(normalize("CHEESE"), "cheese");
    }

    #[test]
    fn collapses_space_runs() {
        assert_eq!(normalize("a    b"), "a b");
        assert_eq!(normalize("héllo wörld"), "h llo w rld");
    }

    #[test]
    fn ascii_keywords_pass_through() {
        assert_eq!(normalize("plain keyword"), "plain keyword");
    }

    proptest! {
        #[test]
        fn idempotent(keyword in "\\PC{0,64}") {
            let once = normalize(&keyword);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn output_is_ascii(keyword in "\\PC{0,64}") {
            prop_assert!(normalize(&keyword).is_ascii());
        }
    }
}
