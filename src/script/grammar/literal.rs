//! Literals, constants, ordinals and identifiers.

use phf::phf_map;

use crate::common::text::fold;
use crate::script::ast::{Exactness, ExpressionType, Literal, Ordinal, RelativeOrdinal};
use crate::script::schema::{Schema, Sequence};
use crate::script::token::Token;

use super::vocabulary::{self, PREVIOUS};

#[derive(Clone, Copy)]
enum Constant {
    Text(&'static str),
    Integer(i64),
    Real(f64),
    Boolean(bool),
}

/// Named constants, keys folded.
static CONSTANTS: phf::Map<&'static str, Constant> = phf_map! {
    "true" => Constant::Boolean(true),
    "false" => Constant::Boolean(false),
    "empty" => Constant::Text(""),
    "return" => Constant::Text("\r"),
    "space" => Constant::Text(" "),
    "tab" => Constant::Text("\t"),
    "quote" => Constant::Text("\""),
    "comma" => Constant::Text(","),
    "colon" => Constant::Text(":"),
    "formfeed" => Constant::Text("\x0C"),
    "linefeed" => Constant::Text("\n"),
    "pi" => Constant::Real(std::f64::consts::PI),
    "zero" => Constant::Integer(0),
    "one" => Constant::Integer(1),
    "two" => Constant::Integer(2),
    "three" => Constant::Integer(3),
    "four" => Constant::Integer(4),
    "five" => Constant::Integer(5),
    "six" => Constant::Integer(6),
    "seven" => Constant::Integer(7),
    "eight" => Constant::Integer(8),
    "nine" => Constant::Integer(9),
    "ten" => Constant::Integer(10),
};

const ORDINAL_NAMES: &[&str] = &[
    "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth", "tenth",
];

impl From<Constant> for Literal {
    fn from(constant: Constant) -> Self {
        match constant {
            Constant::Text(text) => Literal::String(text.to_string()),
            Constant::Integer(value) => Literal::Integer(value),
            Constant::Real(value) => Literal::FloatingPoint(value),
            Constant::Boolean(value) => Literal::Boolean(value),
        }
    }
}

fn read_literal(token: &Token) -> Option<Literal> {
    match token {
        Token::QuotedString(text) => Some(Literal::String(text.clone())),
        Token::Integer(value) => Some(Literal::Integer(*value)),
        Token::RealNumber(value) => Some(Literal::FloatingPoint(*value)),
        Token::Word(word) => CONSTANTS.get(fold(word).as_str()).map(|&c| c.into()),
        _ => None,
    }
}

pub struct Literals {
    pub literal: Schema<Literal>,
    /// Any word
    pub word: Schema<String>,
    /// A word that is not a keyword: `[a-z][a-z0-9]*`
    pub identifier: Schema<String>,
    pub ordinal: Schema<Ordinal>,
    pub relative_ordinal: Schema<RelativeOrdinal>,
    pub expression_type: Schema<ExpressionType>,
    pub exactness: Schema<Exactness>,
}

pub fn build() -> Literals {
    let literal = Schema::token("literal", read_literal);
    let word = Schema::token("word", |token| token.as_word().map(str::to_string));
    let identifier = Schema::token("identifier", |token| {
        token
            .as_word()
            .filter(|w| vocabulary::is_identifier(w))
            .map(str::to_string)
    });

    let mut ordinal = Schema::new("ordinal")
        .or(Sequence::new().word("any").returns(Ordinal::Any))
        .or(Sequence::new().either(&["middle", "mid"]).returns(Ordinal::Middle))
        .or(Sequence::new().word("last").returns(Ordinal::Last));
    for (index, &name) in ORDINAL_NAMES.iter().enumerate() {
        ordinal = ordinal.or(Sequence::new().word(name).returns(Ordinal::number(index as i64 + 1)));
    }

    let relative_ordinal = Schema::new("relative ordinal")
        .or(Sequence::new().word("this").returns(RelativeOrdinal::Current))
        .or(Sequence::new().word("next").returns(RelativeOrdinal::Next))
        .or(Sequence::new().either(PREVIOUS).returns(RelativeOrdinal::Previous));

    let expression_type = Schema::new("type")
        .or(Sequence::new().word("number").returns(ExpressionType::Number))
        .or(Sequence::new().word("integer").returns(ExpressionType::Integer))
        .or(Sequence::new().word("point").returns(ExpressionType::Point))
        .or(Sequence::new().either(&["rectangle", "rect"]).returns(ExpressionType::Rectangle))
        .or(Sequence::new().word("date").returns(ExpressionType::Date))
        .or(Sequence::new().word("logical").returns(ExpressionType::Logical));

    let exactness = Schema::new("exactness")
        .or(Sequence::new().word("long").returns(Exactness::Long))
        .or(Sequence::new().word("short").returns(Exactness::Short))
        .or(Sequence::new()
            .either(&["abbreviated", "abbrev", "abbr"])
            .returns(Exactness::Abbreviated));

    Literals {
        literal,
        word,
        identifier,
        ordinal,
        relative_ordinal,
        expression_type,
        exactness,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ParseOptions;
    use crate::script::token::tokenize;

    fn parse<T: 'static>(schema: &Schema<T>, text: &str) -> Option<T> {
        schema.parse(&tokenize(text), &ParseOptions::default()).ok()
    }

    #[test]
    fn test_literals() {
        let literals = build();
        assert_eq!(parse(&literals.literal, "\"hi\""), Some(Literal::String("hi".to_string())));
        assert_eq!(parse(&literals.literal, "2.5"), Some(Literal::FloatingPoint(2.5)));
        assert_eq!(parse(&literals.literal, "TRUE"), Some(Literal::Boolean(true)));
        assert_eq!(parse(&literals.literal, "fàlse"), Some(Literal::Boolean(false)));
        assert_eq!(parse(&literals.literal, "seven"), Some(Literal::Integer(7)));
        assert_eq!(parse(&literals.literal, "empty"), Some(Literal::String(String::new())));
        assert_eq!(parse(&literals.literal, "counter"), None);
    }

    #[test]
    fn test_ordinals() {
        let literals = build();
        assert_eq!(parse(&literals.ordinal, "third"), Some(Ordinal::number(3)));
        assert_eq!(parse(&literals.ordinal, "tenth"), Some(Ordinal::number(10)));
        assert_eq!(parse(&literals.ordinal, "mid"), Some(Ordinal::Middle));
        assert_eq!(parse(&literals.relative_ordinal, "prev"), Some(RelativeOrdinal::Previous));
    }

    #[test]
    fn test_identifiers() {
        let literals = build();
        assert_eq!(parse(&literals.identifier, "total"), Some("total".to_string()));
        assert_eq!(parse(&literals.identifier, "into"), None);
        assert_eq!(parse(&literals.word, "into"), Some("into".to_string()));
    }
}
