//! Spellings of the object and chunk names.

use phf::phf_set;

use crate::common::text::{fold, is_letter};

pub const STACK: &[&str] = &["stack"];
pub const BACKGROUND: &[&str] = &["background", "bkgnd", "bg"];
pub const BACKGROUNDS: &[&str] = &["backgrounds", "bkgnds", "bgs"];
pub const CARD: &[&str] = &["card", "cd"];
pub const CARDS: &[&str] = &["cards", "cds"];
pub const BUTTON: &[&str] = &["button", "btn"];
pub const BUTTONS: &[&str] = &["buttons", "btns"];
pub const FIELD: &[&str] = &["field", "fld"];
pub const FIELDS: &[&str] = &["fields", "flds"];
pub const PART: &[&str] = &["part"];
pub const PARTS: &[&str] = &["parts"];
pub const LINE: &[&str] = &["line"];
pub const LINES: &[&str] = &["lines"];
pub const ITEM: &[&str] = &["item"];
pub const ITEMS: &[&str] = &["items"];
pub const WORD: &[&str] = &["word"];
pub const WORDS: &[&str] = &["words"];
pub const CHARACTER: &[&str] = &["character", "char"];
pub const CHARACTERS: &[&str] = &["characters", "chars"];
pub const MESSAGE: &[&str] = &["message", "msg"];
pub const PREVIOUS: &[&str] = &["previous", "prev"];
pub const SECONDS: &[&str] = &["seconds", "second", "secs", "sec"];
pub const TICKS: &[&str] = &["ticks", "tick"];

/// `card 2 of this bg` and `card 2 in this bg`.
pub const OF: &[&str] = &["of", "in"];
pub const ARTICLE: &[&str] = &["a", "an"];

/// Words that end or join the parts of a statement.
static KEYWORDS: phf::Set<&'static str> = phf_set! {
    "then", "else", "end", "to", "into", "before", "after", "of", "in", "from", "by",
    "with", "times", "is", "and", "or", "not", "mod", "div", "contains",
};

/// Whether a word may name a variable or a message.
pub fn is_identifier(word: &str) -> bool {
    word.chars().next().is_some_and(is_letter) && !KEYWORDS.contains(fold(word).as_str())
}
