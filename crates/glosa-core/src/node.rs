use std::cmp::Ordering;

/// Structural role of a node in the translation tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NodeKind {
    #[default]
    Plain,
    /// Top-level word taken from the source document
    MainWord,
    /// Grammatical category grouping entries
    SpeechPart,
    /// Sense label grouping entries
    Context,
    /// Translation leaf
    TargetWord,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WordClass {
    #[default]
    None,
    Noun,
    Verb,
    Adjective,
    Adverb,
    Pronoun,
    Conjunction,
}

impl WordClass {
    /// Name shown for a speech-part node
    pub fn label(&self) -> &'static str {
        match self {
            WordClass::None => "NA",
            WordClass::Noun => "Noun",
            WordClass::Verb => "Verb",
            WordClass::Adjective => "Adjective",
            WordClass::Adverb => "Adverb",
            WordClass::Pronoun => "Pronoun",
            WordClass::Conjunction => "Conjunction",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Gender {
    #[default]
    None,
    Masculine,
    Feminine,
    Neuter,
}

impl Gender {
    /// Definite article for languages with grammatical gender, with a trailing space.
    pub fn article(&self, language: &str) -> &'static str {
        if language != "de" {
            return "";
        }
        match self {
            Gender::Masculine => "der ",
            Gender::Feminine => "die ",
            Gender::Neuter => "das ",
            Gender::None => "",
        }
    }
}

/// Full attribute set of a node. Children start from a copy of their parent's.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    pub word: String,
    pub plural: String,
    pub context: String,
    pub language: String,
    pub word_class: WordClass,
    pub gender: Gender,
    pub kind: NodeKind,
}

/// One attribute write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    Word(String),
    Plural(String),
    Context(String),
    Language(String),
    WordClass(WordClass),
    Gender(Gender),
    Kind(NodeKind),
}

/// Optional grammatical details for a new word node.
///
/// Empty or `None` fields are not written, so the node keeps what it
/// inherited from its parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordDetails {
    pub plural: String,
    pub word_class: WordClass,
    pub gender: Gender,
}

impl Attributes {
    pub fn set(&mut self, attribute: Attribute) {
        match attribute {
            Attribute::Word(word) => self.word = word,
            Attribute::Plural(plural) => self.plural = plural,
            Attribute::Context(context) => self.context = context,
            Attribute::Language(language) => self.language = language,
            Attribute::WordClass(word_class) => {
                self.word_class = word_class;
                // German nouns are capitalized
                if self.language == "de" && word_class == WordClass::Noun {
                    self.word = capitalize(&self.word);
                }
            }
            Attribute::Gender(gender) => self.gender = gender,
            Attribute::Kind(kind) => self.kind = kind,
        }
    }

    /// Article, word and plural suffix, e.g. `der Tisch, -e`.
    pub fn source_text(&self) -> String {
        let mut text = format!("{}{}", self.gender.article(&self.language), self.word);
        if !self.plural.is_empty() {
            text.push_str(", -");
            text.push_str(&self.plural);
        }
        text
    }

    pub fn display(&self) -> String {
        match self.kind {
            NodeKind::Plain | NodeKind::MainWord => self.source_text(),
            NodeKind::SpeechPart => self.word_class.label().to_string(),
            NodeKind::Context => self.context.clone(),
            NodeKind::TargetWord => self.word.clone(),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A node exclusively owns its children; dropping it drops the subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    attributes: Attributes,
    children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn root(language: &str) -> Self {
        Self {
            attributes: Attributes {
                language: language.to_string(),
                ..Attributes::default()
            },
            children: Vec::new(),
        }
    }

    /// New node starting from a copy of `parent`'s attributes.
    pub fn inheriting(parent: &Attributes) -> Self {
        Self {
            attributes: parent.clone(),
            children: Vec::new(),
        }
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub(crate) fn set_attributes(&mut self, attributes: Attributes) {
        self.attributes = attributes;
    }

    pub fn set(&mut self, attribute: Attribute) {
        self.attributes.set(attribute);
    }

    pub fn display(&self) -> String {
        self.attributes.display()
    }

    pub fn kind(&self) -> NodeKind {
        self.attributes.kind
    }

    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    pub fn child(&self, row: usize) -> Option<&TreeNode> {
        self.children.get(row)
    }

    pub(crate) fn child_mut(&mut self, row: usize) -> Option<&mut TreeNode> {
        self.children.get_mut(row)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// This node plus all descendants.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }

    pub fn children_display(&self) -> Vec<String> {
        self.children.iter().map(TreeNode::display).collect()
    }

    /// Appends `count` inheriting children, returns the row of the first.
    pub fn add_children(&mut self, count: usize) -> usize {
        let first = self.children.len();
        for _ in 0..count {
            let child = TreeNode::inheriting(&self.attributes);
            self.children.push(child);
        }
        first
    }

    /// Inserts already built nodes, keeping their attributes, before `position`.
    /// Positions past the end change nothing.
    pub fn insert_children(&mut self, position: usize, nodes: Vec<TreeNode>) -> bool {
        if position > self.children.len() {
            return false;
        }
        self.children.splice(position..position, nodes);
        true
    }

    fn in_range(&self, position: usize, count: usize) -> bool {
        position
            .checked_add(count)
            .is_some_and(|end| end <= self.children.len())
    }

    /// Destroys `count` children from `position`. Out-of-range requests change nothing.
    pub fn remove_children(&mut self, position: usize, count: usize) -> bool {
        self.detach_children(position, count).is_some()
    }

    /// Unlinks `count` children from `position` and hands them to the caller.
    pub fn detach_children(&mut self, position: usize, count: usize) -> Option<Vec<TreeNode>> {
        if !self.in_range(position, count) {
            return None;
        }
        Some(self.children.drain(position..position + count).collect())
    }

    pub(crate) fn take_children(&mut self) -> Vec<TreeNode> {
        std::mem::take(&mut self.children)
    }

    /// Alphabetical by display text.
    pub fn sort_children(&mut self) {
        self.children.sort_by(compare_display);
    }
}

fn compare_display(a: &TreeNode, b: &TreeNode) -> Ordering {
    a.display().to_lowercase().cmp(&b.display().to_lowercase())
}
