//! Containers, the places a value is read from or put into.

use crate::script::ast::{ChunkContainer, ContainerDescriptor};
use crate::script::schema::{Schema, Sequence};

use super::chunk::Chunks;
use super::literal::Literals;
use super::object::Objects;
use super::vocabulary::MESSAGE;

/// Define the branches of the shared `container` schema.
pub fn define(container: &Schema<ContainerDescriptor>, chunks: &Chunks, objects: &Objects, literals: &Literals) {
    container.define(Sequence::new()
        .maybe_word("the")
        .either(MESSAGE)
        .maybe_word("box")
        .returns(ContainerDescriptor::MessageBox));
    container.define(Sequence::new().maybe_word("the").word("selection").returns(ContainerDescriptor::Selection));
    container.define(Sequence::new()
        .then(&chunks.chunk)
        .again(container)
        .returns2(|chunk, container| ContainerDescriptor::Chunk(Box::new(ChunkContainer { chunk, container }))));
    container.define(Sequence::new().then(&objects.part).returns_single(ContainerDescriptor::Part));
    container.define(Sequence::new().then(&literals.identifier).returns_single(ContainerDescriptor::Variable));
}
