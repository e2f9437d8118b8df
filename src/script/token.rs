//! Tokens of the scripting language.
//!
//! The tokenizer works on decoded script text. It never fails: any character
//! it does not recognize becomes a one-character word.

use phf::phf_set;
use serde::{Deserialize, Serialize};

use crate::common::text::{equals_folded, is_letter};

/// Operators spelled with two characters.
static TWO_CHARACTER_SYMBOLS: phf::Set<&'static str> = phf_set! {
    "<>", "<=", ">=", "&&",
};

const LINE_CONTINUATION: char = '¬';
const QUOTE: char = '"';

/// A lexical token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token {
    /// Identifier or keyword, letters and digits starting with a letter
    Word(String),
    /// Text between double quotes, without the quotes
    QuotedString(String),
    /// Punctuation or operator
    Symbol(String),
    Integer(i64),
    RealNumber(f64),
    /// End of a line
    LineSeparator,
}

impl Token {
    /// Whether the token is a word or a symbol spelled like `text`, ignoring
    /// case and diacritics.
    pub fn is_spelled(&self, text: &str) -> bool {
        match self {
            Token::Word(word) | Token::Symbol(word) => equals_folded(word, text),
            _ => false,
        }
    }

    #[inline]
    pub fn is_line_separator(&self) -> bool {
        matches!(self, Token::LineSeparator)
    }

    pub fn as_word(&self) -> Option<&str> {
        match self {
            Token::Word(word) => Some(word),
            _ => None,
        }
    }
}

#[inline]
fn is_line_end(c: char) -> bool {
    c == '\r' || c == '\n'
}

#[inline]
fn is_space(c: char) -> bool {
    c.is_whitespace() && !is_line_end(c)
}

#[inline]
fn is_alphanumeric(c: char) -> bool {
    is_letter(c) || c.is_ascii_digit()
}

#[inline]
fn is_symbol(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '/' | '^' | '&' | '=' | '<' | '>' | '≠' | '≤' | '≥' | '(' | ')' | ',' | '.'
            | ':' | ';' | '[' | ']' | '{' | '}' | '#' | '@' | '!' | '?' | '$' | '%' | '|' | '\\' | '\''
            | '~' | '`'
    )
}

/// Iterator over the tokens of a script text.
///
/// The tokenizer holds no state besides its position, so cloning it restarts
/// the sequence from the same point.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    text: &'a str,
    position: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, position: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.position..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.text[self.position..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        Some(c)
    }

    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let start = self.position;
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.position += c.len_utf8();
        }
        &self.text[start..self.position]
    }

    /// Move after the next line end, return whether there was one.
    fn skip_to_next_line(&mut self) -> bool {
        self.advance_while(|c| !is_line_end(c));
        self.advance().is_some()
    }

    fn read_symbol(&mut self) -> Token {
        let rest = &self.text[self.position..];
        if let Some(pair) = rest.get(..2)
            && TWO_CHARACTER_SYMBOLS.contains(pair)
        {
            self.position += 2;
            return Token::Symbol(pair.to_string());
        }
        let start = self.position;
        self.advance();
        Token::Symbol(self.text[start..self.position].to_string())
    }

    fn read_number(&mut self) -> Token {
        let start = self.position;
        self.advance_while(|c| c.is_ascii_digit());
        let fractional = self.peek() == Some('.');
        if fractional {
            self.advance();
            self.advance_while(|c| c.is_ascii_digit());
        }
        let digits = &self.text[start..self.position];
        if !fractional && let Ok(value) = digits.parse::<i64>() {
            return Token::Integer(value);
        }
        // Digits only, so the conversion cannot fail
        Token::RealNumber(digits.parse::<f64>().unwrap_or(f64::INFINITY))
    }

    fn read_quoted_string(&mut self) -> Token {
        let quote_start = self.position;
        self.advance();
        let content = self.advance_while(|c| c != QUOTE && !is_line_end(c));
        if self.peek() == Some(QUOTE) {
            self.advance();
            Token::QuotedString(content.to_string())
        } else {
            // Unterminated, the opening quote is part of the string
            Token::QuotedString(self.text[quote_start..self.position].to_string())
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            self.advance_while(is_space);
            let c = self.peek()?;

            if c == '-' && self.peek_second() == Some('-') {
                // A comment at the very end of the text has no line separator
                return self.skip_to_next_line().then_some(Token::LineSeparator);
            }
            if is_symbol(c) {
                return Some(self.read_symbol());
            }
            if is_line_end(c) {
                self.advance();
                return Some(Token::LineSeparator);
            }
            if c.is_ascii_digit() {
                return Some(self.read_number());
            }
            if is_letter(c) {
                return Some(Token::Word(self.advance_while(is_alphanumeric).to_string()));
            }
            if c == QUOTE {
                return Some(self.read_quoted_string());
            }
            if c == LINE_CONTINUATION {
                self.skip_to_next_line();
                continue;
            }
            self.advance();
            return Some(Token::Word(c.to_string()));
        }
    }
}

/// Split a script text into tokens.
pub fn tokenize(text: &str) -> Vec<Token> {
    Tokenizer::new(text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str) -> Token {
        Token::Word(text.to_string())
    }

    fn symbol(text: &str) -> Token {
        Token::Symbol(text.to_string())
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            tokenize("put 3.5 into x2"),
            vec![word("put"), Token::RealNumber(3.5), word("into"), word("x2")]
        );
        assert_eq!(tokenize("a <> b"), vec![word("a"), symbol("<>"), word("b")]);
        assert_eq!(tokenize("a&&b&c"), vec![word("a"), symbol("&&"), word("b"), symbol("&"), word("c")]);
        assert_eq!(tokenize("12."), vec![Token::RealNumber(12.0)]);
    }

    #[test]
    fn test_lines_and_comments() {
        assert_eq!(
            tokenize("beep -- twice\rbeep"),
            vec![word("beep"), Token::LineSeparator, word("beep")]
        );
        // No line separator after a final comment without a line end
        assert_eq!(tokenize("beep -- done"), vec![word("beep")]);
        assert_eq!(tokenize("put 1 ¬\r into x"), vec![word("put"), Token::Integer(1), word("into"), word("x")]);
    }

    #[test]
    fn test_quoted_strings() {
        assert_eq!(tokenize("\"Hello world\""), vec![Token::QuotedString("Hello world".to_string())]);
        assert_eq!(
            tokenize("\"open\rx"),
            vec![Token::QuotedString("\"open".to_string()), Token::LineSeparator, word("x")]
        );
    }

    #[test]
    fn test_unknown_characters() {
        assert_eq!(tokenize("a_b"), vec![word("a"), word("_"), word("b")]);
        assert_eq!(tokenize("café"), vec![word("café")]);
    }

    #[test]
    fn test_restartable() {
        let tokenizer = Tokenizer::new("go next card");
        let first: Vec<Token> = tokenizer.clone().collect();
        let second: Vec<Token> = tokenizer.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_folded_spelling() {
        assert!(word("FàLSE").is_spelled("false"));
        assert!(symbol("<>").is_spelled("<>"));
        assert!(!Token::QuotedString("is".to_string()).is_spelled("is"));
    }
}
