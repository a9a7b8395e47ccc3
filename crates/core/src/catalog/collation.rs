use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const COMBINING_TILDE: char = '\u{303}';

/// Sort key approximating a Spanish title comparison.
///
/// Levels, compared in order: base letters ignoring accents and case, then
/// accents, then case with lowercase first ("a" < "A"). `ñ` is a letter of
/// its own between `n` and `o` at the first level.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct CollationKey {
    primary: Vec<u32>,
    secondary: String,
    tertiary: Vec<bool>,
}

pub fn collation_key(text: &str) -> CollationKey {
    let decomposed: String = text.trim().nfd().collect();

    let primary = primary_weights(&decomposed);
    let secondary = decomposed.to_lowercase();
    let tertiary = decomposed.chars().map(char::is_uppercase).collect();

    CollationKey { primary, secondary, tertiary }
}

/// Lowercased base letters, each weighted `code << 1`; `n` followed by a
/// combining tilde takes the odd slot right after `n`.
fn primary_weights(decomposed: &str) -> Vec<u32> {
    let mut weights = Vec::with_capacity(decomposed.len());
    let mut chars = decomposed.chars().peekable();
    while let Some(ch) = chars.next() {
        if is_combining_mark(ch) {
            continue;
        }
        for lower in ch.to_lowercase() {
            let mut weight = u32::from(lower) << 1;
            if lower == 'n' && chars.peek() == Some(&COMBINING_TILDE) {
                weight |= 1;
            }
            weights.push(weight);
        }
    }
    weights
}
