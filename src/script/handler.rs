//! Location of the handlers declared in a script.
//!
//! Declarations are found by scanning the raw text, line by line, without
//! tokenizing it: the keyword must be followed by exactly one space character,
//! `on<tab>mouseUp` is not a declaration.

use memchr::memchr2;
use serde::{Deserialize, Serialize};

use crate::common::text::equals_folded;

const MESSAGE_PREFIX: &str = "on";
const FUNCTION_PREFIX: &str = "function";

/// Whether a handler answers a message or computes a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandlerKind {
    Message,
    Function,
}

/// A handler declaration found in a script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerLocation {
    pub name: String,
    pub kind: HandlerKind,
    /// Byte offset of the start of the declaration line
    pub offset: usize,
}

impl PartialEq for HandlerLocation {
    fn eq(&self, other: &Self) -> bool {
        equals_folded(&self.name, &other.name) && self.kind == other.kind && self.offset == other.offset
    }
}

/// Check that `line` starts with `word` followed by a space.
fn strip_keyword<'a>(line: &'a str, word: &str) -> Option<&'a str> {
    let head = line.get(..word.len())?;
    if !equals_folded(head, word) {
        return None;
    }
    line[word.len()..].strip_prefix(' ')
}

fn locate_in_line(line: &str, offset: usize) -> Option<HandlerLocation> {
    let declaration = line.trim_start_matches(' ');
    let (kind, rest) = if let Some(rest) = strip_keyword(declaration, MESSAGE_PREFIX) {
        (HandlerKind::Message, rest)
    } else if let Some(rest) = strip_keyword(declaration, FUNCTION_PREFIX) {
        (HandlerKind::Function, rest)
    } else {
        return None;
    };

    let rest = rest.trim_start_matches(' ');
    let name = rest.split(' ').next().unwrap_or_default();
    if name.is_empty() {
        return None;
    }
    Some(HandlerLocation {
        name: name.to_string(),
        kind,
        offset,
    })
}

/// List the handler declarations of a script, in text order.
///
/// # Examples
///
/// ```
/// use hyperstack::script::{locate_handlers, HandlerKind};
///
/// let handlers = locate_handlers("on mouseUp\r  beep\rend mouseUp\rfunction double x\rend double");
/// assert_eq!(handlers.len(), 2);
/// assert_eq!(handlers[1].name, "double");
/// assert_eq!(handlers[1].kind, HandlerKind::Function);
/// ```
pub fn locate_handlers(script: &str) -> Vec<HandlerLocation> {
    let bytes = script.as_bytes();
    let mut locations = Vec::new();
    let mut start = 0;
    while start < bytes.len() {
        let end = memchr2(b'\r', b'\n', &bytes[start..]).map_or(bytes.len(), |i| start + i);
        if let Some(location) = locate_in_line(&script[start..end], start) {
            locations.push(location);
        }
        start = end + 1;
    }
    locations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_handlers() {
        let script = "-- buttons\ron mouseUp\r  beep\rend mouseUp\r\r  function square x\r  return x*x\rend square";
        let handlers = locate_handlers(script);
        assert_eq!(
            handlers,
            vec![
                HandlerLocation {
                    name: "mouseUp".to_string(),
                    kind: HandlerKind::Message,
                    offset: 11,
                },
                HandlerLocation {
                    name: "square".to_string(),
                    kind: HandlerKind::Function,
                    offset: 42,
                },
            ]
        );
    }

    #[test]
    fn test_tab_is_not_a_separator() {
        assert!(locate_handlers("on\tmouseUp\rend mouseUp").is_empty());
        assert_eq!(locate_handlers("on mouseUp\rend mouseUp").len(), 1);
    }

    #[test]
    fn test_declaration_rules() {
        // Case and diacritics are ignored in the keyword
        assert_eq!(locate_handlers("ON idle").len(), 1);
        // Several spaces before the name are accepted
        assert_eq!(locate_handlers("on    idle")[0].name, "idle");
        // The keyword must be a whole word
        assert!(locate_handlers("online idle").is_empty());
        // No name
        assert!(locate_handlers("on \rend").is_empty());
        assert!(locate_handlers("on").is_empty());
    }

    #[test]
    fn test_name_comparison() {
        let a = HandlerLocation {
            name: "MouseUp".to_string(),
            kind: HandlerKind::Message,
            offset: 0,
        };
        let b = HandlerLocation {
            name: "mouseup".to_string(),
            ..a.clone()
        };
        assert_eq!(a, b);
    }
}
