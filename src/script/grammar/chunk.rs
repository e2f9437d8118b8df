//! Chunk selectors: `char 2 to 4 of word 3 of`.

use crate::script::ast::{Chunk, ChunkElement, ChunkNumber, ChunkType, Expression, Ordinal};
use crate::script::schema::{Schema, Sequence};

use super::literal::Literals;
use super::vocabulary::{CHARACTER, CHARACTERS, ITEM, ITEMS, LINE, LINES, OF, WORD, WORDS};

pub struct Chunks {
    /// One or more elements, each followed by `of`
    pub chunk: Schema<Chunk>,
    /// `lines`, `items`, `words` or `chars`
    pub plural_type: Schema<ChunkType>,
}

pub fn build(expression: &Schema<Expression>, literals: &Literals) -> Chunks {
    let chunk_type = Schema::new("chunk type")
        .or(Sequence::new().either(LINE).returns(ChunkType::Line))
        .or(Sequence::new().either(ITEM).returns(ChunkType::Item))
        .or(Sequence::new().either(WORD).returns(ChunkType::Word))
        .or(Sequence::new().either(CHARACTER).returns(ChunkType::Character));
    let plural_type = Schema::new("chunk types")
        .or(Sequence::new().either(LINES).returns(ChunkType::Line))
        .or(Sequence::new().either(ITEMS).returns(ChunkType::Item))
        .or(Sequence::new().either(WORDS).returns(ChunkType::Word))
        .or(Sequence::new().either(CHARACTERS).returns(ChunkType::Character));

    let range_end =
        Schema::new("chunk range end").or(Sequence::new().word("to").again(expression).passes::<Expression>());
    let element = Schema::new("chunk element")
        .or(Sequence::new()
            .then(&chunk_type)
            .again(expression)
            .maybe(&range_end)
            .returns3(|chunk_type, number: Expression, maximum: Option<Expression>| ChunkElement {
                chunk_type,
                number: match maximum {
                    Some(maximum) => ChunkNumber::Range {
                        minimum: number,
                        maximum,
                    },
                    None => ChunkNumber::Single(Ordinal::Number(Box::new(number))),
                },
            }))
        .or(Sequence::new()
            .maybe_word("the")
            .then(&literals.ordinal)
            .then(&chunk_type)
            .returns2(|ordinal, chunk_type| ChunkElement {
                chunk_type,
                number: ChunkNumber::Single(ordinal),
            }));

    let element_of =
        Schema::new("chunk element of").or(Sequence::new().then(&element).either(OF).passes::<ChunkElement>());
    let chunk = Schema::new("chunk").or(Sequence::new()
        .repeat(&element_of, 1)
        .returns_single(|elements| Chunk { elements }));

    Chunks { chunk, plural_type }
}
