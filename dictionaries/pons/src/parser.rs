use glosa_core::dictionary::{DictionaryMetadata, ParseOutcome, WebDictionary};
use glosa_core::lookup::{best_match, same_word};
use glosa_core::preprocess::{DefaultPreprocessor, Preprocessor};
use glosa_core::scan::{advance_after, detach_prefix, extract, simplified, strip_tags, Cursor};
use glosa_core::{Attribute, NodeKind, TreeError, TreeStore, WordClass, WordDetails};
use glosa_types::{DictionaryQuery, NodeAddress};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::grammar::{gender_from_tag, word_class_from_tokens};

/// Every result section starts at a `romhead` block
const SECTION_END: &str = "(romhead|$)";

static HEADWORD_MARKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[_|*]").unwrap());
static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r" *\[.*?\] *").unwrap());
static GRAMMAR_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r" +(m|f|nt|pl)(pl)*( +|$)").unwrap());

/// Reader for the mobile result pages of pons.eu.
pub struct PonsDictionary {
    website: String,
    fit_main_word: bool,
}

impl PonsDictionary {
    pub fn new(website: impl Into<String>) -> Self {
        Self {
            website: website.into().trim_end_matches('/').to_string(),
            fit_main_word: true,
        }
    }

    /// Whether a main word with no exact headword is retouched to the closest one.
    pub fn with_fit_main_word(mut self, enabled: bool) -> Self {
        self.fit_main_word = enabled;
        self
    }
}

impl WebDictionary for PonsDictionary {
    fn metadata(&self) -> DictionaryMetadata {
        DictionaryMetadata {
            name: "Pons.eu".to_string(),
            website: self.website.clone(),
            languages: ["PL", "EN", "DE", "FR"].map(String::from).to_vec(),
        }
    }

    fn query(&self, word: &str, source: &str, target: &str) -> DictionaryQuery {
        DictionaryQuery {
            url: format!("{}/dict/search/mobile-results/", self.website),
            params: vec![
                ("q".to_string(), word.to_string()),
                ("l".to_string(), format!("{}{}", source, target).to_lowercase()),
            ],
        }
    }

    fn parse(&self, store: &TreeStore, payload: &str, main_word: &NodeAddress) -> ParseOutcome {
        let Some(attributes) = store.attributes(main_word) else {
            tracing::warn!("Main word {} is gone, dropping its payload", main_word);
            return ParseOutcome::NoMatch;
        };

        let mut builder = TreeBuilder {
            store,
            query: attributes.word,
            parents: vec![main_word.clone()],
            headwords: Vec::new(),
            exact_found: false,
        };
        let text = DefaultPreprocessor.process(payload);
        match builder.build(text) {
            Ok(0) => ParseOutcome::NoMatch,
            Ok(sections) => {
                if let Err(e) = builder.finish(self.fit_main_word) {
                    tracing::warn!("Could not update main word {}: {}", main_word, e);
                }
                ParseOutcome::Built { sections }
            }
            Err(e) => {
                // nodes added so far stay
                tracing::warn!("Parsing for {} stopped: {}", main_word, e);
                ParseOutcome::NoMatch
            }
        }
    }
}

/// Walks one payload, keeping a stack of insertion points.
struct TreeBuilder<'a> {
    store: &'a TreeStore,
    query: String,
    /// Main word first; one entry per open header, plus one per open context
    parents: Vec<NodeAddress>,
    headwords: Vec<String>,
    exact_found: bool,
}

impl TreeBuilder<'_> {
    fn top(&self) -> NodeAddress {
        self.parents.last().cloned().unwrap_or_default()
    }

    fn build(&mut self, mut text: String) -> Result<usize, TreeError> {
        // everything before the first section
        detach_prefix(&mut text, SECTION_END);

        let mut sections = 0;
        while text.contains("target") {
            let mut section = detach_prefix(&mut text, SECTION_END);
            if section.is_empty() {
                break;
            }
            sections += 1;

            let heading = detach_prefix(&mut section, "</h2>");
            self.header(&heading)?;
            self.rows(&mut section)?;
            self.parents.pop();
        }
        tracing::debug!("{} sections for {:?}", sections, self.query);
        Ok(sections)
    }

    fn header(&mut self, text: &str) -> Result<(), TreeError> {
        let top = self.top();
        let mut cursor: Cursor = Some(0);
        let mut word = extract(text, "<h2>", "<", &mut cursor).trim().to_string();
        if word.is_empty() {
            cursor = Some(0);
            let attributed = extract(text, r#"<span class="headword_attributes".*?>"#, "</span>", &mut cursor);
            word = HEADWORD_MARKS.replace_all(attributed.trim(), "").into_owned();
        }

        let Some(position) = cursor else {
            // keeps one stack entry per section
            self.parents.push(top);
            return Ok(());
        };

        let word_class = speech_part(text, position);
        let details = WordDetails {
            plural: if word_class == WordClass::Noun {
                plural(text)
            } else {
                String::new()
            },
            word_class,
            gender: gender(text),
        };
        if !word.is_empty() {
            self.headwords.push(word.clone());
        }

        let next = if same_word(&word, &self.query) {
            self.exact_found = true;
            if word_class == WordClass::None {
                top
            } else {
                self.store.add_word("", NodeKind::SpeechPart, &top, &details)?
            }
        } else {
            self.store.add_word(&word, NodeKind::Plain, &top, &details)?
        };
        self.parents.push(next);
        Ok(())
    }

    fn rows(&mut self, section: &mut String) -> Result<(), TreeError> {
        let mut open_context: Option<String> = None;
        while section.contains("target") {
            let lead = detach_prefix(section, "<tr id");
            let label = sense(&lead);
            if !label.is_empty() && open_context.as_deref() != Some(label.as_str()) {
                if open_context.is_some() {
                    self.parents.pop();
                }
                let context = self.store.add_context(&label, &self.top())?;
                self.parents.push(context);
                open_context = Some(label);
            }

            let mut row = detach_prefix(section, "</tr>");
            if row.is_empty() {
                row = std::mem::take(section);
            }
            self.entries(&row)?;
        }
        if open_context.is_some() {
            self.parents.pop();
        }
        Ok(())
    }

    fn entries(&mut self, row: &str) -> Result<(), TreeError> {
        let mut cursor: Cursor = Some(0);
        loop {
            let source = cell(row, r#""source">"#, &mut cursor);
            if cursor.is_none() {
                break;
            }
            let entry = self.store.add_word(&source, NodeKind::Plain, &self.top(), &WordDetails::default())?;

            let target = cell(row, r#""target">"#, &mut cursor);
            if cursor.is_none() {
                break;
            }
            let target = clean_target(&target);
            if !target.is_empty() {
                self.store.add_target_word(&target, &entry, &WordDetails::default())?;
            }
        }
        Ok(())
    }

    /// Back-fills an unambiguous main word and fits its text to the headwords.
    fn finish(&self, fit_main_word: bool) -> Result<(), TreeError> {
        let main = self.parents.first().cloned().unwrap_or_default();

        if self.store.child_count(&main) == Some(1) {
            if let (Some(mut attributes), Some(child)) =
                (self.store.attributes(&main), self.store.attributes(&main.child(0)))
            {
                attributes.set(Attribute::Plural(child.plural));
                attributes.set(Attribute::WordClass(child.word_class));
                attributes.set(Attribute::Gender(child.gender));
                self.store.set_attributes(&main, attributes)?;
            }
        }

        if fit_main_word && !self.exact_found && !self.headwords.is_empty() {
            let fitted = best_match(&self.query, &self.headwords);
            if fitted != self.query {
                tracing::debug!("Retouching {:?} to {:?}", self.query, fitted);
                self.store.retouch_word(&main, &fitted)?;
            }
        }
        Ok(())
    }
}

fn speech_part(text: &str, from: usize) -> WordClass {
    let mut at = advance_after(text, "wordclass", from);
    if at == text.len() {
        at = advance_after(text, "info", from);
    }
    let mut cursor = Some(at);
    word_class_from_tokens(&extract(text, ">", "<", &mut cursor))
}

/// Plural ending from a flexion span such as `&lt;-es, -er&gt;`.
fn plural(text: &str) -> String {
    let mut cursor = Some(0);
    let flexion = extract(text, r#"<span class="flexion">"#, "</span>", &mut cursor);
    if cursor.is_none() {
        return String::new();
    }
    let mut cursor = Some(0);
    let plural = extract(&flexion, ",", "&gt;", &mut cursor);
    simplified(&plural).trim_start_matches('-').to_string()
}

fn gender(text: &str) -> glosa_core::Gender {
    let mut cursor = Some(0);
    let genus = extract(text, r#"<span class="genus">"#, "</span>", &mut cursor);
    gender_from_tag(&strip_tags(&genus))
}

/// Sense label from the table head preceding a row.
fn sense(text: &str) -> String {
    let mut cursor = Some(0);
    let head = extract(text, "<thead", "</thead>", &mut cursor);
    if cursor.is_none() {
        return String::new();
    }
    let mut cursor = Some(advance_after(&head, "sense", 0));
    let label = extract(&head, ">", "</span>", &mut cursor);
    simplified(&strip_tags(&label))
}

fn cell(row: &str, start: &str, cursor: &mut Cursor) -> String {
    strip_tags(&extract(row, start, "</td>", cursor)).trim().to_string()
}

/// Drops bracketed notes and trailing gender/number tags.
fn clean_target(text: &str) -> String {
    let mut target = BRACKETED.replace_all(text, " ").into_owned();
    loop {
        let next = GRAMMAR_TAGS.replace_all(&target, " ").into_owned();
        if next == target {
            break;
        }
        target = next;
    }
    simplified(&target)
}

#[cfg(test)]
mod tests {
    use glosa_core::Gender;
    use rstest::rstest;

    use super::*;

    fn row(source: &str, target: &str) -> String {
        format!(r#"<tr id="r"><td class="source">{source}</td><td class="target">{target}</td></tr>"#)
    }

    fn sense_head(label: &str) -> String {
        format!(r#"<thead><tr><th><span class="sense">{label}</span></th></tr></thead>"#)
    }

    fn section(heading: &str, body: &str) -> String {
        format!(r#"<div class="romhead"><h2>{heading}</h2></div><table>{body}</table>"#)
    }

    fn parse(word: &str, payload: &str) -> (TreeStore, NodeAddress, ParseOutcome) {
        let store = TreeStore::new("de", "en");
        let main = store.add_main_word(word);
        let outcome = PonsDictionary::new("https://mobile.pons.eu").parse(&store, payload, &main);
        (store, main, outcome)
    }

    #[rstest]
    #[case("house nt", "house")]
    #[case("Haus [o. Heim] nt", "Haus")]
    #[case("houses pl", "houses")]
    #[case("dog m pl", "dog")]
    #[case("film", "film")]
    fn target_annotations_are_dropped(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(clean_target(raw), expected);
    }

    #[test]
    fn query_uses_mobile_results() {
        let query = PonsDictionary::new("https://mobile.pons.eu/").query("Haus", "DE", "en");
        assert_eq!(query.url, "https://mobile.pons.eu/dict/search/mobile-results/");
        assert_eq!(query.param("q"), Some("Haus"));
        assert_eq!(query.param("l"), Some("deen"));
    }

    #[test]
    fn header_details_are_read() {
        let heading = concat!(
            "Tisch <span class=\"wordclass\"><acronym title=\"noun\">NOUN</acronym></span> ",
            "<span class=\"genus\"><acronym>m</acronym></span> ",
            "<span class=\"flexion\">&lt;-(e)s, -e&gt;</span>",
        );
        let payload = section(heading, &row("Tisch", "table"));
        let (store, main, outcome) = parse("tisch", &payload);

        assert_eq!(outcome, ParseOutcome::Built { sections: 1 });
        // single speech part, so the main word takes its details
        let attrs = store.attributes(&main).unwrap();
        assert_eq!(attrs.word_class, WordClass::Noun);
        assert_eq!(attrs.gender, Gender::Masculine);
        assert_eq!(attrs.plural, "e");
        assert_eq!(store.display(&main).as_deref(), Some("der Tisch, -e"));
    }

    #[test]
    fn rows_sharing_a_sense_share_one_context() {
        let body = format!(
            "{}{}{}{}{}",
            sense_head("building"),
            row("Haus", "house"),
            sense_head("building"),
            row("Haus", "building"),
            format!("{}{}", sense_head("family"), row("Haus", "household")),
        );
        let payload = section("Haus", &body);
        let (store, main, _) = parse("Haus", &payload);

        assert_eq!(store.children_display(&main).unwrap(), vec!["building", "family"]);
        assert_eq!(store.child_count(&main.child(0)), Some(2));
    }

    #[test]
    fn missing_header_keeps_main_word_as_parent() {
        let payload = r#"<div class="romhead"></div><table><tr id="r"><td class="source">Haus</td><td class="target">house</td></tr></table>"#;
        let (store, main, outcome) = parse("Haus", payload);

        assert_eq!(outcome, ParseOutcome::Built { sections: 1 });
        assert_eq!(store.outline(&main).unwrap(), "Haus\n  Haus\n    house\n");
    }

    #[test]
    fn headerless_section_between_headed_ones_keeps_nesting() {
        let payload = format!(
            "{}{}{}",
            section("Haus <span class=\"wordclass\">NOUN</span>", &row("Haus", "house")),
            format!(r#"<div class="romhead"></div><table>{}</table>"#, row("Heim", "home")),
            section("Häuschen", &row("Häuschen", "little house")),
        );
        let store = TreeStore::new("de", "en");
        let main = store.add_main_word("Haus");
        let mut builder = TreeBuilder {
            store: &store,
            query: "Haus".to_string(),
            parents: vec![main.clone()],
            headwords: Vec::new(),
            exact_found: false,
        };

        assert_eq!(builder.build(DefaultPreprocessor.process(&payload)), Ok(3));
        assert_eq!(builder.parents, vec![main.clone()]);
        assert_eq!(
            store.outline(&main).unwrap(),
            concat!(
                "Haus\n",
                "  Noun\n    Haus\n      house\n",
                "  Heim\n    home\n",
                "  Häuschen\n    Häuschen\n      little house\n",
            )
        );
    }

    #[test]
    fn attribute_headword_is_the_fallback() {
        let heading = r#"<span class="headword_attributes" title="x">Ha|us</span>"#;
        let payload = format!(r#"<div class="romhead">{heading}</h2>{}"#, row("Haus", "house"));
        let (store, main, _) = parse("Haus", &payload);

        // transparent header without a class adds nothing
        assert_eq!(store.children_display(&main).unwrap(), vec!["Haus"]);
    }

    #[test]
    fn payload_without_results_is_no_match() {
        let (store, main, outcome) = parse("Xyz", "<html><body>No results</body></html>");
        assert_eq!(outcome, ParseOutcome::NoMatch);
        assert_eq!(store.child_count(&main), Some(0));
    }

    #[test]
    fn main_word_fits_closest_headword() {
        let payload = section("Tischlampe", &row("Tischlampe", "desk lamp"));
        let (store, main, _) = parse("Tisch1ampe", &payload);
        assert_eq!(store.attributes(&main).unwrap().word, "Tischlampe");
        assert_eq!(store.child_count(&main), Some(1));
    }
}
