//! The scripting language: tokens, handler location and the grammar
//! producing the syntax tree.
//!
//! Scripts are split into handlers by scanning the raw text for `on` and
//! `function` declarations, then each handler is tokenized and parsed on its
//! own. Text outside handlers is ignored.
//!
//! # Examples
//!
//! ```rust
//! use hyperstack::script::{parse_script, Statement};
//!
//! let script = parse_script("on mouseUp\r  beep 2\rend mouseUp\r")?;
//! let handler = script.handler("MOUSEUP").unwrap();
//! assert!(matches!(handler.statements[0], Statement::Command(_)));
//! # Ok::<(), hyperstack::common::Error>(())
//! ```

pub mod ast;
mod grammar;
pub mod handler;
pub mod options;
pub mod schema;
pub mod token;

pub use ast::*;
pub use handler::{HandlerKind, HandlerLocation, locate_handlers};
pub use options::ParseOptions;
pub use token::{Token, Tokenizer, tokenize};

use crate::common::error::{Error, Result};
use grammar::with_grammar;
use schema::Cursor;

/// Parse a whole expression, like `the number of cards + 1`.
pub fn parse_expression(text: &str) -> Result<Expression> {
    parse_expression_with_options(text, &ParseOptions::default())
}

pub fn parse_expression_with_options(text: &str, options: &ParseOptions) -> Result<Expression> {
    let tokens = tokenize(text);
    with_grammar(|grammar| grammar.expression.parse(&tokens, options))
}

/// Parse the handlers of a script.
///
/// A handler that does not parse fails the whole script. The position of a
/// [`Error::ParseError`] counts tokens from the start of that handler.
pub fn parse_script(text: &str) -> Result<Script> {
    parse_script_with_options(text, &ParseOptions::default())
}

pub fn parse_script_with_options(text: &str, options: &ParseOptions) -> Result<Script> {
    let locations = locate_handlers(text);
    let mut handlers = Vec::with_capacity(locations.len());
    for (index, location) in locations.iter().enumerate() {
        let end = locations.get(index + 1).map_or(text.len(), |next| next.offset);
        let tokens = tokenize(&text[location.offset..end]);
        handlers.push(parse_handler(&tokens, location, options)?);
    }
    Ok(Script { handlers })
}

fn parse_handler(tokens: &[Token], location: &HandlerLocation, options: &ParseOptions) -> Result<Handler> {
    with_grammar(|grammar| {
        let mut cursor = Cursor::new(tokens, options);
        cursor.skip_line_separators();
        let Some(handler) = grammar.handler.parse_at(&mut cursor)? else {
            return Err(match cursor.error() {
                Error::ParseError { position, message } => Error::ParseError {
                    position,
                    message: format!("in handler {}: {message}", location.name),
                },
                error => error,
            });
        };

        cursor.skip_line_separators();
        if !cursor.is_at_end() {
            log::debug!(
                "Ignoring {} tokens after the end of handler {}",
                tokens.len() - cursor.position(),
                handler.name
            );
        }
        Ok(handler)
    })
}
