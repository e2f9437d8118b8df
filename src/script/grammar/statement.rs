//! Statements and handlers.
//!
//! A block is a run of statements, each ending a line. `if` comes in two
//! shapes: the block shape puts a line break after `then` and closes with
//! `end if`, the single shape holds one statement and an optional `else`.

use crate::common::text::equals_folded;
use crate::script::ast::{
    CardDescriptor, Command, Condition, ContainerDescriptor, ContainerTargetPosition, DurationExpression, Expression,
    FlowStatement, GoDestination, Handler, LayerDescriptor, LayerType, MessageCall, ObjectDescriptor, PropertyDescriptor,
    ShowCommand, Statement, VisibleObject, WaitCommand,
};
use crate::script::handler::HandlerKind;
use crate::script::schema::{Schema, Sequence};

use super::literal::Literals;
use super::object::Objects;
use super::vocabulary::{BACKGROUND, CARD, CARDS, OF, SECONDS, TICKS};

/// An `if` with its `else if` successors still nested.
#[derive(Clone)]
struct IfChain {
    condition: Expression,
    statements: Vec<Statement>,
    otherwise: ElsePart,
}

#[derive(Clone)]
enum ElsePart {
    Nothing,
    Block(Vec<Statement>),
    ElseIf(Box<IfChain>),
}

impl IfChain {
    fn flatten(self) -> FlowStatement {
        let mut conditions = Vec::new();
        let mut chain = self;
        loop {
            conditions.push(Condition {
                condition: chain.condition,
                statements: chain.statements,
            });
            match chain.otherwise {
                ElsePart::Nothing => {
                    return FlowStatement::If {
                        conditions,
                        otherwise: Vec::new(),
                    };
                },
                ElsePart::Block(otherwise) => return FlowStatement::If { conditions, otherwise },
                ElsePart::ElseIf(next) => chain = *next,
            }
        }
    }
}

/// `a, b, c`
fn separated<T: 'static>(name: &'static str, item: &Schema<T>, strong: bool) -> Schema<Vec<T>> {
    let next = Schema::new(name);
    let next = if strong {
        next.or(Sequence::new().word(",").then(item).passes::<T>())
    } else {
        next.or(Sequence::new().word(",").again(item).passes::<T>())
    };
    let head = if strong {
        Sequence::new().then(item)
    } else {
        Sequence::new().again(item)
    };
    Schema::new(name).or(head.repeat(&next, 0).returns2(|first: T, rest: Vec<T>| {
        let mut items = Vec::with_capacity(rest.len() + 1);
        items.push(first);
        items.extend(rest);
        items
    }))
}

fn if_chain(statement: &Schema<Statement>, block: &Schema<Vec<Statement>>, expression: &Schema<Expression>) -> Schema<IfChain> {
    let chain: Schema<IfChain> = Schema::new("if");
    let head = Schema::new("if condition").or(Sequence::new()
        .word("if")
        .again(expression)
        .maybe_line()
        .word("then")
        .passes::<Expression>());

    let else_block = Schema::new("else block")
        .or(Sequence::new().word("end if").returns(ElsePart::Nothing))
        .or(Sequence::new()
            .word("else")
            .again(&chain)
            .returns_single(|next: IfChain| ElsePart::ElseIf(Box::new(next))))
        .or(Sequence::new()
            .word("else")
            .line()
            .then(block)
            .word("end if")
            .returns_single(ElsePart::Block))
        .or(Sequence::new()
            .word("else")
            .again(statement)
            .returns_single(|s: Statement| ElsePart::Block(vec![s])));
    let else_single = Schema::new("else")
        .or(Sequence::new()
            .maybe_line()
            .word("else")
            .again(&chain)
            .returns_single(|next: IfChain| ElsePart::ElseIf(Box::new(next))))
        .or(Sequence::new()
            .maybe_line()
            .word("else")
            .line()
            .then(block)
            .word("end if")
            .returns_single(ElsePart::Block))
        .or(Sequence::new()
            .maybe_line()
            .word("else")
            .again(statement)
            .returns_single(|s: Statement| ElsePart::Block(vec![s])));

    chain.define(Sequence::new().then(&head).line().then(block).then(&else_block).returns3(
        |condition, statements, otherwise| IfChain {
            condition,
            statements,
            otherwise,
        },
    ));
    chain.define(Sequence::new().then(&head).again(statement).maybe(&else_single).returns3(
        |condition, statement: Statement, otherwise: Option<ElsePart>| IfChain {
            condition,
            statements: vec![statement],
            otherwise: otherwise.unwrap_or(ElsePart::Nothing),
        },
    ));
    chain
}

fn repeat(block: &Schema<Vec<Statement>>, expression: &Schema<Expression>, literals: &Literals) -> Schema<FlowStatement> {
    let body = |sequence: Sequence| sequence.line().then(block).word("end repeat");
    Schema::new("repeat")
        .or(Sequence::new()
            .word("repeat with")
            .then(&literals.identifier)
            .word("=")
            .again(expression)
            .word("down to")
            .again(expression)
            .with(body)
            .returns4(|counter, start, end, statements| FlowStatement::RepeatWithDownCounter {
                counter,
                start,
                end,
                statements,
            }))
        .or(Sequence::new()
            .word("repeat with")
            .then(&literals.identifier)
            .word("=")
            .again(expression)
            .word("to")
            .again(expression)
            .with(body)
            .returns4(|counter, start, end, statements| FlowStatement::RepeatWithCounter {
                counter,
                start,
                end,
                statements,
            }))
        .or(Sequence::new()
            .word("repeat until")
            .again(expression)
            .with(body)
            .returns2(|condition, statements| FlowStatement::RepeatUntil { condition, statements }))
        .or(Sequence::new()
            .word("repeat while")
            .again(expression)
            .with(body)
            .returns2(|condition, statements| FlowStatement::RepeatWhile { condition, statements }))
        .or(Sequence::new()
            .word("repeat forever")
            .with(body)
            .returns_single(FlowStatement::Repeat))
        .or(Sequence::new().word("repeat").with(body).returns_single(FlowStatement::Repeat))
        .or(Sequence::new()
            .word("repeat")
            .maybe_word("for")
            .again(expression)
            .maybe_word("times")
            .with(body)
            .returns2(FlowStatement::RepeatTimes))
}

fn flow(
    statement: &Schema<Statement>,
    block: &Schema<Vec<Statement>>,
    expression: &Schema<Expression>,
    objects: &Objects,
    literals: &Literals,
) -> Schema<FlowStatement> {
    Schema::new("flow statement")
        .or_map(&if_chain(statement, block, expression), IfChain::flatten)
        .or_schema(&repeat(block, expression, literals))
        .or(Sequence::new().word("exit repeat").returns(FlowStatement::ExitRepeat))
        .or(Sequence::new().word("exit to HyperCard").returns(FlowStatement::ExitToHyperCard))
        .or(Sequence::new().word("exit").then(&literals.word).returns_single(FlowStatement::Exit))
        .or(Sequence::new().word("next repeat").returns(FlowStatement::NextRepeat))
        .or(Sequence::new().word("pass").then(&literals.word).returns_single(FlowStatement::Pass))
        .or(Sequence::new()
            .word("return")
            .again(expression)
            .returns_single(FlowStatement::ReturnExpression))
        .or(Sequence::new().word("return").returns(FlowStatement::Return))
        .or(Sequence::new()
            .word("global")
            .then(&separated("globals", &literals.identifier, true))
            .returns_single(FlowStatement::Global))
        .or(Sequence::new()
            .word("send")
            .again(expression)
            .word("to")
            .then(&objects.object)
            .returns2(|message: Expression, target: ObjectDescriptor| match target {
                ObjectDescriptor::HyperCard => FlowStatement::SendToHyperCard(message),
                target => FlowStatement::Send { message, target },
            }))
        .or(Sequence::new()
            .word("send")
            .again(expression)
            .returns_single(|message| FlowStatement::Send {
                message,
                target: ObjectDescriptor::Card(CardDescriptor::current()),
            }))
        .or(Sequence::new()
            .word("do")
            .again(expression)
            .word("as")
            .again(expression)
            .returns2(|script, language| FlowStatement::Do {
                script,
                language: Some(language),
            }))
        .or(Sequence::new()
            .word("do")
            .again(expression)
            .returns_single(|script| FlowStatement::Do { script, language: None }))
}

fn visible_object(objects: &Objects) -> Schema<VisibleObject> {
    Schema::new("visible object")
        .or(Sequence::new().word("menuBar").returns(VisibleObject::MenuBar))
        .or(Sequence::new().word("titleBar").returns(VisibleObject::TitleBar))
        .or(Sequence::new()
            .either(BACKGROUND)
            .word("picture")
            .returns(VisibleObject::Picture(LayerType::Background)))
        .or(Sequence::new()
            .maybe_either(CARD)
            .word("picture")
            .returns(VisibleObject::Picture(LayerType::Card)))
        .or_map(&objects.part, VisibleObject::Part)
}

fn go_destination(objects: &Objects, literals: &Literals) -> Schema<GoDestination> {
    Schema::new("destination")
        .or(Sequence::new().word("back").returns(GoDestination::Back))
        .or(Sequence::new().word("home").returns(GoDestination::Home))
        .or_map(&objects.stack, GoDestination::Stack)
        .or_map(&objects.background, GoDestination::Background)
        .or_map(&objects.card, GoDestination::Card)
        // `go next` is `go to next card`
        .or(Sequence::new()
            .then(&literals.relative_ordinal)
            .returns_single(|relative| {
                GoDestination::Card(CardDescriptor {
                    card: LayerDescriptor::Relative(relative),
                    background: None,
                })
            }))
}

fn command(
    expression: &Schema<Expression>,
    factor: &Schema<Expression>,
    container: &Schema<ContainerDescriptor>,
    objects: &Objects,
    literals: &Literals,
) -> Schema<Command> {
    let position = Schema::new("position")
        .or(Sequence::new().word("into").returns(ContainerTargetPosition::Into))
        .or(Sequence::new().word("before").returns(ContainerTargetPosition::Before))
        .or(Sequence::new().word("after").returns(ContainerTargetPosition::After));
    let destination = Schema::new("put destination").or(Sequence::new()
        .then(&position)
        .again(container)
        .returns2(|position: ContainerTargetPosition, container: ContainerDescriptor| (position, container)));
    let reply = Schema::new("reply").or(Sequence::new().word("or").again(factor).passes::<Expression>());
    let replies = Schema::new("replies").or(Sequence::new()
        .word("with")
        .again(factor)
        .repeat(&reply, 0)
        .returns2(|first: Expression, rest: Vec<Expression>| {
            let mut replies = Vec::with_capacity(rest.len() + 1);
            replies.push(first);
            replies.extend(rest);
            replies
        }));
    let default =
        Schema::new("default answer").or(Sequence::new().word("with").again(expression).passes::<Expression>());
    let visible = visible_object(objects);

    Schema::new("command")
        .or(Sequence::new()
            .word("put")
            .again(expression)
            .maybe(&destination)
            .returns2(|value, destination: Option<(ContainerTargetPosition, ContainerDescriptor)>| {
                // Without a destination the value goes to the message box
                let (position, container) =
                    destination.unwrap_or((ContainerTargetPosition::Into, ContainerDescriptor::MessageBox));
                Command::Put {
                    value,
                    position,
                    container,
                }
            }))
        .or(Sequence::new().word("get").again(expression).returns_single(Command::Get))
        .or(Sequence::new()
            .word("set")
            .maybe_word("the")
            .then(&literals.word)
            .either(OF)
            .then(&objects.object)
            .word("to")
            .again(expression)
            .returns3(|name, object: ObjectDescriptor, value| Command::Set {
                property: PropertyDescriptor {
                    name,
                    object: Some(object),
                },
                value,
            }))
        .or(Sequence::new()
            .word("set")
            .maybe_word("the")
            .then(&literals.word)
            .word("to")
            .again(expression)
            .returns2(|name, value| Command::Set {
                property: PropertyDescriptor { name, object: None },
                value,
            }))
        .or(Sequence::new()
            .word("go")
            .maybe_word("to")
            .then(&go_destination(objects, literals))
            .returns_single(Command::Go))
        .or(Sequence::new()
            .word("add")
            .again(expression)
            .word("to")
            .again(container)
            .returns2(|value, container| Command::Add { value, container }))
        .or(Sequence::new()
            .word("subtract")
            .again(expression)
            .word("from")
            .again(container)
            .returns2(|value, container| Command::Subtract { value, container }))
        .or(Sequence::new()
            .word("multiply")
            .again(container)
            .word("by")
            .again(expression)
            .returns2(|container, by| Command::Multiply { container, by }))
        .or(Sequence::new()
            .word("divide")
            .again(container)
            .word("by")
            .again(expression)
            .returns2(|container, by| Command::Divide { container, by }))
        .or(Sequence::new()
            .word("answer")
            .again(expression)
            .maybe(&replies)
            .returns2(|prompt, replies: Option<Vec<Expression>>| Command::Answer {
                prompt,
                replies: replies.unwrap_or_default(),
            }))
        .or(Sequence::new()
            .word("ask password")
            .again(expression)
            .maybe(&default)
            .returns2(|prompt, default| Command::Ask {
                prompt,
                default,
                password: true,
            }))
        .or(Sequence::new()
            .word("ask")
            .again(expression)
            .maybe(&default)
            .returns2(|prompt, default| Command::Ask {
                prompt,
                default,
                password: false,
            }))
        .or(Sequence::new().word("beep").maybe_again(expression).returns_single(Command::Beep))
        .or(Sequence::new()
            .word("wait until")
            .again(expression)
            .returns_single(|condition| Command::Wait(WaitCommand::Until(condition))))
        .or(Sequence::new()
            .word("wait while")
            .again(expression)
            .returns_single(|condition| Command::Wait(WaitCommand::While(condition))))
        .or(Sequence::new()
            .word("wait")
            .maybe_word("for")
            .again(expression)
            .either(SECONDS)
            .returns_single(|duration| Command::Wait(WaitCommand::Duration(DurationExpression::Seconds(duration)))))
        .or(Sequence::new()
            .word("wait")
            .maybe_word("for")
            .again(expression)
            .maybe_either(TICKS)
            .returns_single(|duration| Command::Wait(WaitCommand::Duration(DurationExpression::Ticks(duration)))))
        .or(Sequence::new()
            .word("show all")
            .either(CARDS)
            .returns(Command::Show(ShowCommand::AllCards)))
        .or(Sequence::new()
            .word("show marked")
            .either(CARDS)
            .returns(Command::Show(ShowCommand::MarkedCards)))
        .or(Sequence::new()
            .word("show")
            .either(CARDS)
            .returns(Command::Show(ShowCommand::AllCards)))
        .or(Sequence::new()
            .word("show")
            .then(&visible)
            .returns_single(|object| Command::Show(ShowCommand::Object(object))))
        .or(Sequence::new()
            .word("show")
            .again(expression)
            .either(CARDS)
            .returns_single(|count| Command::Show(ShowCommand::Cards(count))))
        .or(Sequence::new().word("hide").then(&visible).returns_single(Command::Hide))
}

/// Define the branches of the shared `statement` schema and build the
/// handler schema.
pub fn define(
    statement: &Schema<Statement>,
    expression: &Schema<Expression>,
    factor: &Schema<Expression>,
    container: &Schema<ContainerDescriptor>,
    objects: &Objects,
    literals: &Literals,
) -> Schema<Handler> {
    let statement_line = Schema::new("statement line").or(Sequence::new().again(statement).line().passes::<Statement>());
    let block = Schema::new("block").or(Sequence::new().repeat(&statement_line, 0).passes::<Vec<Statement>>());

    let message = Schema::new("message").or(Sequence::new()
        .then(&literals.identifier)
        .maybe(&separated("arguments", expression, false))
        .returns2(|identifier, arguments: Option<Vec<Expression>>| MessageCall {
            identifier,
            arguments: arguments.unwrap_or_default(),
        }));

    statement.define(Sequence::new()
        .then(&flow(statement, &block, expression, objects, literals))
        .returns_single(Statement::Flow));
    statement.define(Sequence::new()
        .then(&command(expression, factor, container, objects, literals))
        .returns_single(Statement::Command));
    statement.define(Sequence::new().then(&message).returns_single(Statement::Message));

    let kind = Schema::new("handler kind")
        .or(Sequence::new().word("on").returns(HandlerKind::Message))
        .or(Sequence::new().word("function").returns(HandlerKind::Function));
    let header = Schema::new("handler header").or(Sequence::new()
        .then(&kind)
        .then(&literals.word)
        .maybe(&separated("parameters", &literals.identifier, true))
        .returns3(|kind: HandlerKind, name: String, parameters: Option<Vec<String>>| {
            (kind, name, parameters.unwrap_or_default())
        }));
    Schema::new("handler").or(Sequence::new()
        .then(&header)
        .line()
        .then(&block)
        .word("end")
        .then(&literals.word)
        .returns3(
            |(kind, name, argument_names): (HandlerKind, String, Vec<String>), statements, end: String| {
                if !equals_folded(&name, &end) {
                    log::warn!("Handler {name} closed by end {end}");
                }
                Handler {
                    name,
                    kind,
                    argument_names,
                    statements,
                }
            },
        ))
}
