//! Grammar combinators.
//!
//! A [`Schema`] is a named grammar rule producing a typed value. It holds
//! ordered branches; the first branch that matches wins and there is no
//! longest-match resolution. A branch is a [`Sequence`] of elements (literal
//! words, line separators, token predicates and references to other schemas)
//! followed by a computation turning the captured sub-values into the result.
//!
//! Parsing is backtracking recursive descent over a token slice: a failing
//! branch resets the cursor to where it started before the next branch is
//! tried. Rules must not be left-recursive. Binary operators are written as a
//! head followed by repeated [`Tail`]s and folded to the left.
//!
//! References to a schema that is being built, or that contains the current
//! schema, are made with [`Sequence::again`] and held weakly so that recursive
//! grammars do not leak.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::common::error::{Error, Result};

use super::options::ParseOptions;
use super::token::Token;

/// Number of expected items kept for the error message.
const MAX_EXPECTED: usize = 8;

/// Position of a parse in a token slice.
pub struct Cursor<'t> {
    tokens: &'t [Token],
    position: usize,
    depth: usize,
    max_depth: usize,
    furthest: usize,
    expected: SmallVec<[&'static str; MAX_EXPECTED]>,
}

impl<'t> Cursor<'t> {
    pub fn new(tokens: &'t [Token], options: &ParseOptions) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
            max_depth: options.max_depth,
            furthest: 0,
            expected: SmallVec::new(),
        }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.position)
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    pub fn skip_line_separators(&mut self) {
        while self.peek().is_some_and(Token::is_line_separator) {
            self.position += 1;
        }
    }

    /// Record that `what` was expected at the current position.
    fn expect(&mut self, what: &'static str) {
        if self.position > self.furthest {
            self.furthest = self.position;
            self.expected.clear();
        }
        if self.position == self.furthest && self.expected.len() < MAX_EXPECTED && !self.expected.contains(&what) {
            self.expected.push(what);
        }
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.max_depth {
            return Err(Error::GrammarTooDeep { depth: self.max_depth });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// The error describing the furthest point the parse reached.
    pub fn error(&self) -> Error {
        let position = self.furthest.max(self.position);
        let found = match self.tokens.get(position) {
            Some(token) => format!("{token:?}"),
            None => "end of script".to_string(),
        };
        let message = if position == self.furthest && !self.expected.is_empty() {
            format!("expected {}, found {found}", self.expected.join(" or "))
        } else {
            format!("unexpected {found}")
        };
        Error::ParseError { position, message }
    }
}

/// Sub-values captured by a branch, consumed left to right by its computation.
pub struct Captures {
    schema: &'static str,
    values: SmallVec<[Option<Box<dyn Any>>; 4]>,
    next: usize,
}

impl Captures {
    fn new(schema: &'static str) -> Self {
        Self {
            schema,
            values: SmallVec::new(),
            next: 0,
        }
    }

    fn push(&mut self, value: Box<dyn Any>) {
        self.values.push(Some(value));
    }

    /// The next captured value, which must be of type `A`.
    pub fn take<A: 'static>(&mut self) -> Result<A> {
        let mismatch = || Error::CaptureMismatch {
            schema: self.schema.to_string(),
        };
        let value = self
            .values
            .get_mut(self.next)
            .and_then(Option::take)
            .ok_or_else(mismatch)?;
        self.next += 1;
        value.downcast::<A>().map(|v| *v).map_err(|_| mismatch())
    }
}

/// A pending binary operation: the right operand is known, the left one is
/// the value folded so far.
pub struct Tail<T>(Box<dyn FnOnce(T) -> T>);

impl<T> Tail<T> {
    pub fn new(apply: impl FnOnce(T) -> T + 'static) -> Self {
        Self(Box::new(apply))
    }

    #[inline]
    pub fn apply(self, left: T) -> T {
        (self.0)(left)
    }
}

/// A schema with its result type erased, as seen from a sequence.
trait ErasedSchema {
    /// Results of type `()` are matched but not captured.
    fn is_constant(&self) -> bool;

    /// Match the schema as often as `repetition` allows.
    fn parse_erased(&self, cursor: &mut Cursor<'_>, repetition: Repetition) -> Result<Option<Box<dyn Any>>>;
}

/// How many times a sequence matches a schema, and the shape of the capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repetition {
    /// Exactly once, captured as `T`
    Once,
    /// Zero or one time, captured as `Option<T>`
    Optional,
    /// `min..=max` times, captured as `Vec<T>`
    Many { min: usize, max: Option<usize> },
}

enum SchemaLink {
    Strong(Rc<dyn ErasedSchema>),
    Weak(Weak<dyn ErasedSchema>),
}

enum Element {
    Word(&'static str),
    Either(&'static [&'static str]),
    OptionalWord(&'static str),
    OptionalEither(&'static [&'static str]),
    LineSeparators { min: usize },
    Token {
        label: &'static str,
        matcher: Box<dyn Fn(&Token) -> Option<Box<dyn Any>>>,
    },
    Schema {
        link: SchemaLink,
        repetition: Repetition,
    },
}

impl Element {
    /// Match the element at the cursor. `Ok(false)` means no match; the
    /// cursor is then left anywhere and reset by the caller.
    fn match_at(&self, cursor: &mut Cursor<'_>, captures: &mut Captures) -> Result<bool> {
        match self {
            Element::Word(word) => match_word(cursor, *word),
            Element::Either(words) => {
                for &word in words.iter() {
                    if cursor.peek().is_some_and(|t| t.is_spelled(word)) {
                        cursor.position += 1;
                        return Ok(true);
                    }
                    cursor.expect(word);
                }
                Ok(false)
            },
            Element::OptionalWord(word) => {
                match_word(cursor, *word)?;
                Ok(true)
            },
            Element::OptionalEither(words) => {
                if let Some(token) = cursor.peek()
                    && words.iter().any(|w| token.is_spelled(w))
                {
                    cursor.position += 1;
                }
                Ok(true)
            },
            Element::LineSeparators { min } => {
                let start = cursor.position;
                cursor.skip_line_separators();
                if cursor.position - start < *min {
                    cursor.expect("end of line");
                    return Ok(false);
                }
                Ok(true)
            },
            Element::Token { label, matcher } => match cursor.peek().and_then(|t| matcher(t)) {
                Some(value) => {
                    cursor.position += 1;
                    captures.push(value);
                    Ok(true)
                },
                None => {
                    cursor.expect(label);
                    Ok(false)
                },
            },
            Element::Schema { link, repetition } => {
                let schema = match link {
                    SchemaLink::Strong(schema) => Rc::clone(schema),
                    SchemaLink::Weak(schema) => match schema.upgrade() {
                        Some(schema) => schema,
                        None => {
                            log::warn!("Grammar rule {} refers to a dropped rule", captures.schema);
                            return Ok(false);
                        },
                    },
                };
                match schema.parse_erased(cursor, *repetition)? {
                    Some(value) => {
                        if !schema.is_constant() {
                            captures.push(value);
                        }
                        Ok(true)
                    },
                    None => Ok(false),
                }
            },
        }
    }
}

fn match_word(cursor: &mut Cursor<'_>, word: &'static str) -> Result<bool> {
    if cursor.peek().is_some_and(|t| t.is_spelled(word)) {
        cursor.position += 1;
        Ok(true)
    } else {
        cursor.expect(word);
        Ok(false)
    }
}

type Computation<T> = Box<dyn Fn(&mut Captures) -> Result<T>>;

/// A sequence of elements and the computation of its result.
pub struct Branch<T> {
    elements: SmallVec<[Element; 4]>,
    compute: Computation<T>,
}

impl<T> Branch<T> {
    fn parse(&self, schema: &'static str, cursor: &mut Cursor<'_>) -> Result<Option<T>> {
        let mut captures = Captures::new(schema);
        for element in &self.elements {
            if !element.match_at(cursor, &mut captures)? {
                return Ok(None);
            }
        }
        (self.compute)(&mut captures).map(Some)
    }
}

/// Builder of the elements of a branch.
#[derive(Default)]
pub struct Sequence {
    elements: SmallVec<[Element; 4]>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Literal words, separated by spaces in `text`.
    pub fn word(mut self, text: &'static str) -> Self {
        self.elements.extend(text.split_whitespace().map(Element::Word));
        self
    }

    /// One of several spellings of a word.
    pub fn either(mut self, words: &'static [&'static str]) -> Self {
        self.elements.push(Element::Either(words));
        self
    }

    pub fn maybe_word(mut self, word: &'static str) -> Self {
        self.elements.push(Element::OptionalWord(word));
        self
    }

    pub fn maybe_either(mut self, words: &'static [&'static str]) -> Self {
        self.elements.push(Element::OptionalEither(words));
        self
    }

    /// One or more line separators.
    pub fn line(mut self) -> Self {
        self.elements.push(Element::LineSeparators { min: 1 });
        self
    }

    pub fn maybe_line(mut self) -> Self {
        self.elements.push(Element::LineSeparators { min: 0 });
        self
    }

    /// A single token turned into a value.
    pub fn token<U: 'static>(mut self, label: &'static str, matcher: impl Fn(&Token) -> Option<U> + 'static) -> Self {
        self.elements.push(Element::Token {
            label,
            matcher: Box::new(move |token| matcher(token).map(|v| Box::new(v) as Box<dyn Any>)),
        });
        self
    }

    fn schema<U: 'static>(mut self, schema: &Schema<U>, strong: bool, repetition: Repetition) -> Self {
        let link = if strong {
            SchemaLink::Strong(Rc::clone(&schema.inner) as Rc<dyn ErasedSchema>)
        } else {
            let weak: Weak<dyn ErasedSchema> = Rc::downgrade(&schema.inner) as Weak<dyn ErasedSchema>;
            SchemaLink::Weak(weak)
        };
        self.elements.push(Element::Schema { link, repetition });
        self
    }

    /// Exactly one match of `schema`, captured as `U`.
    pub fn then<U: 'static>(self, schema: &Schema<U>) -> Self {
        self.schema(schema, true, Repetition::Once)
    }

    /// Like [`then`](Self::then), for a schema that is an ancestor of the
    /// one being built.
    pub fn again<U: 'static>(self, schema: &Schema<U>) -> Self {
        self.schema(schema, false, Repetition::Once)
    }

    /// An optional match, captured as `Option<U>`.
    pub fn maybe<U: 'static>(self, schema: &Schema<U>) -> Self {
        self.schema(schema, true, Repetition::Optional)
    }

    pub fn maybe_again<U: 'static>(self, schema: &Schema<U>) -> Self {
        self.schema(schema, false, Repetition::Optional)
    }

    /// At least `min` matches, captured as `Vec<U>`.
    pub fn repeat<U: 'static>(self, schema: &Schema<U>, min: usize) -> Self {
        self.schema(schema, true, Repetition::Many { min, max: None })
    }

    pub fn repeat_again<U: 'static>(self, schema: &Schema<U>, min: usize) -> Self {
        self.schema(schema, false, Repetition::Many { min, max: None })
    }

    /// Between `min` and `max` matches, captured as `Vec<U>`. Matching stops
    /// at `max` even when more would follow.
    pub fn repeat_between<U: 'static>(self, schema: &Schema<U>, min: usize, max: usize) -> Self {
        self.schema(schema, true, Repetition::Many { min, max: Some(max) })
    }

    pub fn repeat_again_between<U: 'static>(self, schema: &Schema<U>, min: usize, max: usize) -> Self {
        self.schema(schema, false, Repetition::Many { min, max: Some(max) })
    }

    /// Apply a group of elements built elsewhere.
    pub fn with(self, build: impl FnOnce(Self) -> Self) -> Self {
        build(self)
    }

    fn branch<T>(self, compute: Computation<T>) -> Branch<T> {
        Branch {
            elements: self.elements,
            compute,
        }
    }

    /// Result independent of the captures.
    pub fn returns<T: Clone + 'static>(self, value: T) -> Branch<T> {
        self.branch(Box::new(move |_| Ok(value.clone())))
    }

    /// Result being the only capture.
    pub fn passes<T: 'static>(self) -> Branch<T> {
        self.branch(Box::new(|captures| captures.take::<T>()))
    }

    pub fn returns_single<T, A>(self, compute: impl Fn(A) -> T + 'static) -> Branch<T>
    where
        A: 'static,
    {
        self.branch(Box::new(move |captures| Ok(compute(captures.take::<A>()?))))
    }

    pub fn returns2<T, A, B>(self, compute: impl Fn(A, B) -> T + 'static) -> Branch<T>
    where
        A: 'static,
        B: 'static,
    {
        self.branch(Box::new(move |captures| {
            let a = captures.take::<A>()?;
            let b = captures.take::<B>()?;
            Ok(compute(a, b))
        }))
    }

    pub fn returns3<T, A, B, C>(self, compute: impl Fn(A, B, C) -> T + 'static) -> Branch<T>
    where
        A: 'static,
        B: 'static,
        C: 'static,
    {
        self.branch(Box::new(move |captures| {
            let a = captures.take::<A>()?;
            let b = captures.take::<B>()?;
            let c = captures.take::<C>()?;
            Ok(compute(a, b, c))
        }))
    }

    pub fn returns4<T, A, B, C, D>(self, compute: impl Fn(A, B, C, D) -> T + 'static) -> Branch<T>
    where
        A: 'static,
        B: 'static,
        C: 'static,
        D: 'static,
    {
        self.branch(Box::new(move |captures| {
            let a = captures.take::<A>()?;
            let b = captures.take::<B>()?;
            let c = captures.take::<C>()?;
            let d = captures.take::<D>()?;
            Ok(compute(a, b, c, d))
        }))
    }
}

struct SchemaInner<T> {
    name: &'static str,
    branches: RefCell<Vec<Branch<T>>>,
}

impl<T: 'static> SchemaInner<T> {
    fn parse(&self, cursor: &mut Cursor<'_>) -> Result<Option<T>> {
        cursor.enter()?;
        let result = self.parse_branches(cursor);
        cursor.leave();
        result
    }

    fn parse_branches(&self, cursor: &mut Cursor<'_>) -> Result<Option<T>> {
        let start = cursor.position;
        for (index, branch) in self.branches.borrow().iter().enumerate() {
            log::trace!("{}: branch {index} at token {start}", self.name);
            cursor.position = start;
            if let Some(value) = branch.parse(self.name, cursor)? {
                return Ok(Some(value));
            }
        }
        cursor.position = start;
        Ok(None)
    }
}

impl<T: 'static> ErasedSchema for SchemaInner<T> {
    fn is_constant(&self) -> bool {
        TypeId::of::<T>() == TypeId::of::<()>()
    }

    fn parse_erased(&self, cursor: &mut Cursor<'_>, repetition: Repetition) -> Result<Option<Box<dyn Any>>> {
        let (min, max) = match repetition {
            Repetition::Once => return Ok(self.parse(cursor)?.map(|value| Box::new(value) as Box<dyn Any>)),
            Repetition::Optional => return Ok(Some(Box::new(self.parse(cursor)?))),
            Repetition::Many { min, max } => (min, max),
        };

        let mut values = Vec::new();
        while max.is_none_or(|max| values.len() < max) {
            let start = cursor.position;
            match self.parse(cursor)? {
                Some(value) => values.push(value),
                None => break,
            }
            // An empty match would repeat forever
            if cursor.position == start {
                break;
            }
        }
        if values.len() < min {
            return Ok(None);
        }
        Ok(Some(Box::new(values)))
    }
}

/// A named grammar rule producing a `T`.
pub struct Schema<T> {
    inner: Rc<SchemaInner<T>>,
}

impl<T> Clone for Schema<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.inner.name)
            .field("branches", &self.inner.branches.borrow().len())
            .finish()
    }
}

impl<T: 'static> Schema<T> {
    /// A schema without branches yet, matching nothing until
    /// [`define`](Self::define) is called.
    pub fn new(name: &'static str) -> Self {
        Self {
            inner: Rc::new(SchemaInner {
                name,
                branches: RefCell::new(Vec::new()),
            }),
        }
    }

    /// A schema matching one token.
    pub fn token(name: &'static str, matcher: impl Fn(&Token) -> Option<T> + 'static) -> Self {
        Self::new(name).or(Sequence::new().token(name, matcher).passes())
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Append a branch to a schema that is already shared.
    pub fn define(&self, branch: Branch<T>) {
        self.inner.branches.borrow_mut().push(branch);
    }

    /// Append a branch.
    pub fn or(self, branch: Branch<T>) -> Self {
        self.define(branch);
        self
    }

    /// Append a branch delegating to a schema of the same type.
    pub fn or_schema(self, other: &Schema<T>) -> Self {
        self.or(Sequence::new().then(other).passes())
    }

    /// Append a branch delegating to a schema of another type.
    pub fn or_map<U: 'static>(self, other: &Schema<U>, convert: impl Fn(U) -> T + 'static) -> Self {
        self.or(Sequence::new().then(other).returns_single(convert))
    }

    /// Match at the cursor, leaving it after the match.
    pub fn parse_at(&self, cursor: &mut Cursor<'_>) -> Result<Option<T>> {
        self.inner.parse(cursor)
    }

    /// Match the whole token slice, trailing line separators aside.
    pub fn parse(&self, tokens: &[Token], options: &ParseOptions) -> Result<T> {
        let mut cursor = Cursor::new(tokens, options);
        cursor.skip_line_separators();
        let value = self.parse_at(&mut cursor)?;
        cursor.skip_line_separators();
        match value {
            Some(value) if cursor.is_at_end() => Ok(value),
            _ => Err(cursor.error()),
        }
    }
}

impl<T: 'static> Schema<Tail<T>> {
    /// `head tail*`, the tails folded from the left.
    pub fn fold_left(&self, name: &'static str, head: &Schema<T>) -> Schema<T> {
        Schema::new(name).or(Sequence::new()
            .then(head)
            .repeat(self, 0)
            .returns2(|first: T, tails: Vec<Tail<T>>| tails.into_iter().fold(first, |left, tail| tail.apply(left))))
    }
}
