use rand::Rng;

/// Alphabet for public media handles. URL-safe base64 characters, so the
/// handles never need percent-encoding.
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Length of every public handle.
pub const SHORT_ID_LEN: usize = 12;

/// Generate a random public handle.
///
/// Candidates are drawn from a CSPRNG; 64^12 possibilities make collisions
/// rare but not impossible, so callers must still check against the
/// persisted set and let the database unique constraint have the last word.
pub fn generate() -> String {
    let mut rng = rand::rng();
    (0..SHORT_ID_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn ids_have_fixed_length() {
        for _ in 0..100 {
            assert_eq!(generate().len(), SHORT_ID_LEN);
        }
    }

    #[test]
    fn ids_use_only_url_safe_characters() {
        for _ in 0..100 {
            let id = generate();
            assert!(
                id.bytes().all(|b| ALPHABET.contains(&b)),
                "unexpected character in {id:?}"
            );
        }
    }

    #[test]
    fn ids_do_not_repeat_in_practice() {
        let ids: HashSet<String> = (0..1000).map(|_| generate()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
