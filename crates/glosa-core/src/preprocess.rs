use once_cell::sync::Lazy;
use regex::Regex;

static PHONETICS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<span class=['"]phonetics['"]>(?:<span[^<]*</span>|[^<()/])*</span>"#).unwrap()
});
static SUPERSCRIPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"<sup>[^<]*</sup>").unwrap());
static ROMAN_NUMERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"<span[^<]*>[IV]*\.</span>").unwrap());
static ANNOTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<span class=['"](?:region|style|category)['"]>.*?</span>"#).unwrap()
});
static ACRONYM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<acronym[^<]*>|</acronym>").unwrap());

/// Strips markup that carries no translation content before records are scanned.
pub trait Preprocessor {
    // Default dictionary-markup cleaner
    fn process(&self, text: &str) -> String {
        // phonetic transcription first, it nests spans
        let text = PHONETICS.replace_all(text, "");
        let text = SUPERSCRIPT.replace_all(&text, "");
        let text = ROMAN_NUMERAL.replace_all(&text, "");
        // regional, style and category labels
        let text = ANNOTATION.replace_all(&text, "");
        let text = ACRONYM.replace_all(&text, "");

        text.replace("&#39;", "'").replace("&nbsp;", " ")
    }
}

pub struct DefaultPreprocessor;
impl Preprocessor for DefaultPreprocessor {}
