pub mod grammar;
pub mod parser;

pub use grammar::{gender_from_tag, word_class_from_tokens};
pub use parser::PonsDictionary;
