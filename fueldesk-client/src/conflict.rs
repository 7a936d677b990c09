//! Conflict message parser
//!
//! The backend rejects a start with a human-readable message such as
//! `"Existe um turno em aberto (ID: 42)"`. The only way to learn which
//! shift is open is to pull the id back out of that text.

/// Extract the shift id embedded in a conflict message.
///
/// Recognizes a decimal integer preceded by the literal token `ID`
/// (case-sensitive) and a colon, whitespace-tolerant around the colon.
/// Returns the first match; `None` when no id is recoverable. Never
/// panics - an id too large for `i64` counts as no match.
pub fn extract_shift_id(message: &str) -> Option<i64> {
    let mut search = 0;
    while let Some(pos) = message[search..].find("ID") {
        let start = search + pos;
        // Token boundary: reject "ID" inside a longer word like "VALID".
        let bounded = message[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        if bounded {
            let rest = message[start + 2..].trim_start();
            if let Some(rest) = rest.strip_prefix(':') {
                let rest = rest.trim_start();
                let digits: &str = rest
                    .find(|c: char| !c.is_ascii_digit())
                    .map(|end| &rest[..end])
                    .unwrap_or(rest);
                if !digits.is_empty() {
                    return digits.parse::<i64>().ok();
                }
            }
        }
        search = start + 2;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_from_backend_conflict_message() {
        assert_eq!(
            extract_shift_id("Existe um turno em aberto (ID: 42)"),
            Some(42)
        );
    }

    #[test]
    fn tolerates_whitespace_around_colon() {
        assert_eq!(extract_shift_id("turno em aberto ID : 7"), Some(7));
        assert_eq!(extract_shift_id("turno em aberto (ID:123)"), Some(123));
    }

    #[test]
    fn zero_is_a_valid_id() {
        assert_eq!(extract_shift_id("(ID: 0)"), Some(0));
    }

    #[test]
    fn returns_first_match() {
        assert_eq!(extract_shift_id("ID: 5 e depois ID: 9"), Some(5));
    }

    #[test]
    fn no_token_means_no_match() {
        assert_eq!(extract_shift_id("Existe um turno em aberto"), None);
        assert_eq!(extract_shift_id(""), None);
        assert_eq!(extract_shift_id("id: 42"), None); // token is case-sensitive
    }

    #[test]
    fn token_without_digits_means_no_match() {
        assert_eq!(extract_shift_id("ID: "), None);
        assert_eq!(extract_shift_id("ID 42"), None); // missing colon
    }

    #[test]
    fn id_inside_a_longer_word_is_not_a_token() {
        assert_eq!(extract_shift_id("INVALID: 3"), None);
        assert_eq!(extract_shift_id("INVALID: 3 mas (ID: 8)"), Some(8));
    }

    #[test]
    fn overflowing_id_counts_as_no_match() {
        assert_eq!(extract_shift_id("ID: 99999999999999999999999999"), None);
    }
}
