//! Descriptors of stacks, backgrounds, cards, buttons and fields.

use crate::script::ast::{
    CardDescriptor, Expression, Identification, LayerDescriptor, LayerType, Literal, ObjectDescriptor, Ordinal,
    PartDescriptor, PartType, StackDescriptor,
};
use crate::script::schema::{Schema, Sequence};

use super::literal::Literals;
use super::vocabulary::{BACKGROUND, BUTTON, CARD, FIELD, OF, PART, STACK};

pub struct Objects {
    pub object: Schema<ObjectDescriptor>,
    pub stack: Schema<StackDescriptor>,
    pub background: Schema<LayerDescriptor>,
    pub card: Schema<CardDescriptor>,
    pub part: Schema<PartDescriptor>,
}

type TypeName = fn(Sequence) -> Sequence;

/// `card "Help"` names a card, `card 3` and `card x` count it.
fn number_or_name(expression: Expression) -> Identification {
    match expression {
        Expression::Literal(Literal::String(_)) => Identification::Name(Box::new(expression)),
        _ => Identification::Ordinal(Ordinal::Number(Box::new(expression))),
    }
}

/// `<type> id <factor>`, `[the] <ordinal> <type>` or `<type> <expression>`.
fn identification(
    name: &'static str,
    type_name: TypeName,
    expression: &Schema<Expression>,
    factor: &Schema<Expression>,
    literals: &Literals,
) -> Schema<Identification> {
    Schema::new(name)
        .or(Sequence::new()
            .with(type_name)
            .word("id")
            .again(factor)
            .returns_single(|e: Expression| Identification::Identifier(Box::new(e))))
        .or(Sequence::new()
            .maybe_word("the")
            .then(&literals.ordinal)
            .with(type_name)
            .returns_single(Identification::Ordinal))
        .or(Sequence::new().with(type_name).again(expression).returns_single(number_or_name))
}

fn layer(
    name: &'static str,
    type_name: TypeName,
    expression: &Schema<Expression>,
    factor: &Schema<Expression>,
    literals: &Literals,
) -> Schema<LayerDescriptor> {
    Schema::new(name)
        .or(Sequence::new()
            .maybe_word("the")
            .then(&literals.relative_ordinal)
            .with(type_name)
            .returns_single(LayerDescriptor::Relative))
        .or_map(
            &identification(name, type_name, expression, factor, literals),
            LayerDescriptor::Identified,
        )
}

fn card_part(s: Sequence) -> Sequence {
    s.maybe_either(CARD).either(PART)
}

fn background_part(s: Sequence) -> Sequence {
    s.either(BACKGROUND).either(PART)
}

fn card_button(s: Sequence) -> Sequence {
    s.maybe_either(CARD).either(BUTTON)
}

fn background_button(s: Sequence) -> Sequence {
    s.either(BACKGROUND).either(BUTTON)
}

fn card_field(s: Sequence) -> Sequence {
    s.either(CARD).either(FIELD)
}

/// Fields are background fields unless told otherwise.
fn background_field(s: Sequence) -> Sequence {
    s.maybe_either(BACKGROUND).either(FIELD)
}

pub fn build(expression: &Schema<Expression>, factor: &Schema<Expression>, literals: &Literals) -> Objects {
    let stack = Schema::new("stack")
        .or(Sequence::new().word("this").either(STACK).returns(StackDescriptor::Current))
        .or(Sequence::new()
            .either(STACK)
            .again(expression)
            .returns_single(|e: Expression| StackDescriptor::Named(Box::new(e))));

    let background = layer("background", |s| s.either(BACKGROUND), expression, factor, literals);
    let parent_background = Schema::new("parent background")
        .or(Sequence::new().either(OF).then(&background).passes::<LayerDescriptor>());
    let card_layer = layer("card", |s| s.either(CARD), expression, factor, literals);
    let card = Schema::new("card").or(Sequence::new()
        .then(&card_layer)
        .maybe(&parent_background)
        .returns2(|card, background| CardDescriptor { card, background }));

    let kinds: [(PartType, LayerType, TypeName); 6] = [
        (PartType::Part, LayerType::Card, card_part),
        (PartType::Part, LayerType::Background, background_part),
        (PartType::Button, LayerType::Card, card_button),
        (PartType::Button, LayerType::Background, background_button),
        (PartType::Field, LayerType::Card, card_field),
        (PartType::Field, LayerType::Background, background_field),
    ];
    let mut layer_part = Schema::new("part type");
    for (part_type, layer, type_name) in kinds {
        layer_part = layer_part.or_map(
            &identification("part", type_name, expression, factor, literals),
            move |identification| (part_type, layer, identification),
        );
    }
    let parent_card =
        Schema::new("parent card").or(Sequence::new().either(OF).then(&card).passes::<CardDescriptor>());
    let part = Schema::new("part").or(Sequence::new().then(&layer_part).maybe(&parent_card).returns2(
        |(part_type, layer, identification): (PartType, LayerType, Identification), card| PartDescriptor {
            part_type,
            layer,
            identification,
            card,
        },
    ));

    let object = Schema::new("object")
        .or(Sequence::new().word("me").returns(ObjectDescriptor::Me))
        .or(Sequence::new().word("HyperCard").returns(ObjectDescriptor::HyperCard))
        .or_map(&stack, ObjectDescriptor::Stack)
        // Before cards and backgrounds, `card field 1` is not the card named `field`
        .or_map(&part, ObjectDescriptor::Part)
        .or_map(&background, ObjectDescriptor::Background)
        .or_map(&card, ObjectDescriptor::Card);

    Objects {
        object,
        stack,
        background,
        card,
        part,
    }
}
