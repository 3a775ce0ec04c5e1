use glosa_core::{Gender, WordClass};

/// Abbreviations the site prints next to a headword
const WORD_CLASSES: [(&str, WordClass); 6] = [
    ("NOUN", WordClass::Noun),
    ("VERB", WordClass::Verb),
    ("ADJ", WordClass::Adjective),
    ("ADV", WordClass::Adverb),
    ("PRON", WordClass::Pronoun),
    ("CONJ", WordClass::Conjunction),
];

/// First whitespace-separated token found in the vocabulary decides the class.
///
/// Tokens are compared in upper case and their order does not matter beyond
/// which one is seen first.
pub fn word_class_from_tokens(text: &str) -> WordClass {
    text.split_whitespace()
        .map(str::to_uppercase)
        .find_map(|token| {
            WORD_CLASSES
                .iter()
                .find(|(abbrev, _)| *abbrev == token)
                .map(|(_, class)| *class)
        })
        .unwrap_or(WordClass::None)
}

pub fn gender_from_tag(tag: &str) -> Gender {
    match tag.trim() {
        "m" => Gender::Masculine,
        "f" => Gender::Feminine,
        "nt" => Gender::Neuter,
        _ => Gender::None,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("NOUN", WordClass::Noun)]
    #[case("noun masc", WordClass::Noun)]
    #[case("MASC NOUN", WordClass::Noun)]
    #[case("VB trans VERB", WordClass::Verb)]
    #[case("adj", WordClass::Adjective)]
    #[case("PREP", WordClass::None)]
    #[case("", WordClass::None)]
    fn class_is_a_set_lookup(#[case] text: &str, #[case] expected: WordClass) {
        assert_eq!(word_class_from_tokens(text), expected);
    }

    #[test]
    fn gender_tags() {
        assert_eq!(gender_from_tag(" nt "), Gender::Neuter);
        assert_eq!(gender_from_tag("f"), Gender::Feminine);
        assert_eq!(gender_from_tag("pl"), Gender::None);
    }
}
