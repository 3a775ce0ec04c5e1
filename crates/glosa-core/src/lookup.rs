use unicode_normalization::UnicodeNormalization;

/// NFC-normalized lower case, used for every case-insensitive word comparison.
pub fn fold_case(text: &str) -> String {
    text.nfc().collect::<String>().to_lowercase()
}

pub fn same_word(a: &str, b: &str) -> bool {
    fold_case(a) == fold_case(b)
}

/// Picks the candidate closest to `word` when none matches it exactly.
///
/// OCR often reads `l` as `1`, so that is undone first. A candidate qualifies
/// when it contains the word or is contained in it; the smallest length
/// difference wins and earlier candidates win ties. Returns the repaired word
/// itself when nothing qualifies.
pub fn best_match(word: &str, candidates: &[String]) -> String {
    let word = word.replace('1', "l");
    let folded = fold_case(&word);

    let mut best: Option<(usize, &String)> = None;
    for candidate in candidates {
        let other = fold_case(candidate);
        let rate = if other.contains(&folded) {
            other.chars().count() - folded.chars().count()
        } else if folded.contains(&other) && !other.is_empty() {
            folded.chars().count() - other.chars().count()
        } else {
            continue;
        };
        if best.is_none_or(|(best_rate, _)| rate < best_rate) {
            best = Some((rate, candidate));
        }
    }

    match best {
        Some((_, candidate)) => candidate.clone(),
        None => word,
    }
}
