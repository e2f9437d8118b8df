//! Calls to built-in and script-defined functions.

use phf::phf_map;

use crate::common::text::fold;
use crate::script::ast::{
    ChunkType, Countable, Exactness, Expression, FunctionCall, LayerType, NoArgumentFunction, OneArgumentFunction,
};
use crate::script::schema::{Schema, Sequence};

use super::chunk::Chunks;
use super::literal::Literals;
use super::vocabulary::{BACKGROUND, BACKGROUNDS, BUTTONS, CARD, CARDS, FIELDS, OF, PARTS};

/// Built-in functions without argument, keys folded.
static NO_ARGUMENT_FUNCTIONS: phf::Map<&'static str, NoArgumentFunction> = phf_map! {
    "clickchunk" => NoArgumentFunction::ClickChunk,
    "clickh" => NoArgumentFunction::ClickH,
    "clickv" => NoArgumentFunction::ClickV,
    "clickline" => NoArgumentFunction::ClickLine,
    "clickloc" => NoArgumentFunction::ClickLoc,
    "clicktext" => NoArgumentFunction::ClickText,
    "commandkey" => NoArgumentFunction::CommandKey,
    "cmdkey" => NoArgumentFunction::CommandKey,
    "destination" => NoArgumentFunction::Destination,
    "diskspace" => NoArgumentFunction::DiskSpace,
    "foundchunk" => NoArgumentFunction::FoundChunk,
    "foundfield" => NoArgumentFunction::FoundField,
    "foundline" => NoArgumentFunction::FoundLine,
    "foundtext" => NoArgumentFunction::FoundText,
    "heapspace" => NoArgumentFunction::HeapSpace,
    "menus" => NoArgumentFunction::Menus,
    "mouse" => NoArgumentFunction::Mouse,
    "mouseclick" => NoArgumentFunction::MouseClick,
    "mouseh" => NoArgumentFunction::MouseH,
    "mousev" => NoArgumentFunction::MouseV,
    "mouseloc" => NoArgumentFunction::MouseLoc,
    "optionkey" => NoArgumentFunction::OptionKey,
    "paramcount" => NoArgumentFunction::ParamCount,
    "params" => NoArgumentFunction::Params,
    "programs" => NoArgumentFunction::Programs,
    "result" => NoArgumentFunction::Result,
    "screenrect" => NoArgumentFunction::ScreenRect,
    "seconds" => NoArgumentFunction::Seconds,
    "secs" => NoArgumentFunction::Seconds,
    "selectedchunk" => NoArgumentFunction::SelectedChunk,
    "selectedfield" => NoArgumentFunction::SelectedField,
    "selectedline" => NoArgumentFunction::SelectedLine,
    "selectedloc" => NoArgumentFunction::SelectedLoc,
    "selectedtext" => NoArgumentFunction::SelectedText,
    "shiftkey" => NoArgumentFunction::ShiftKey,
    "sound" => NoArgumentFunction::Sound,
    "stacks" => NoArgumentFunction::Stacks,
    "stackspace" => NoArgumentFunction::StackSpace,
    "systemversion" => NoArgumentFunction::SystemVersion,
    "ticks" => NoArgumentFunction::Ticks,
    "tool" => NoArgumentFunction::Tool,
    "windows" => NoArgumentFunction::Windows,
};

/// Built-in functions of one argument, keys folded.
static ONE_ARGUMENT_FUNCTIONS: phf::Map<&'static str, OneArgumentFunction> = phf_map! {
    "abs" => OneArgumentFunction::Abs,
    "atan" => OneArgumentFunction::Atan,
    "average" => OneArgumentFunction::Average,
    "chartonum" => OneArgumentFunction::CharToNum,
    "cos" => OneArgumentFunction::Cos,
    "exp" => OneArgumentFunction::Exp,
    "exp1" => OneArgumentFunction::Exp1,
    "exp2" => OneArgumentFunction::Exp2,
    "length" => OneArgumentFunction::Length,
    "ln" => OneArgumentFunction::Ln,
    "ln1" => OneArgumentFunction::Ln1,
    "log2" => OneArgumentFunction::Log2,
    "max" => OneArgumentFunction::Max,
    "min" => OneArgumentFunction::Min,
    "numtochar" => OneArgumentFunction::NumToChar,
    "param" => OneArgumentFunction::Param,
    "random" => OneArgumentFunction::Random,
    "round" => OneArgumentFunction::Round,
    "sin" => OneArgumentFunction::Sin,
    "sqrt" => OneArgumentFunction::Sqrt,
    "sum" => OneArgumentFunction::Sum,
    "tan" => OneArgumentFunction::Tan,
    "trunc" => OneArgumentFunction::Trunc,
    "value" => OneArgumentFunction::Value,
};

fn countables(factor: &Schema<Expression>, chunks: &Chunks) -> Schema<Countable> {
    let mut countable = Schema::new("countable");
    for (layer_words, layer) in [(BACKGROUND, LayerType::Background), (CARD, LayerType::Card)] {
        countable = countable
            .or(Sequence::new().either(layer_words).either(BUTTONS).returns(Countable::Buttons(layer)))
            .or(Sequence::new().either(layer_words).either(FIELDS).returns(Countable::Fields(layer)))
            .or(Sequence::new().either(layer_words).either(PARTS).returns(Countable::Parts(layer)));
    }
    countable
        // Buttons belong to cards and fields to backgrounds unless told otherwise
        .or(Sequence::new().either(BUTTONS).returns(Countable::Buttons(LayerType::Card)))
        .or(Sequence::new().either(FIELDS).returns(Countable::Fields(LayerType::Background)))
        .or(Sequence::new().either(PARTS).returns(Countable::Parts(LayerType::Card)))
        .or(Sequence::new().word("marked").either(CARDS).returns(Countable::MarkedCards))
        .or(Sequence::new().either(CARDS).returns(Countable::Cards))
        .or(Sequence::new().either(BACKGROUNDS).returns(Countable::Backgrounds))
        .or(Sequence::new()
            .then(&chunks.plural_type)
            .either(OF)
            .again(factor)
            .returns2(|chunk_type: ChunkType, text: Expression| Countable::Chunks(chunk_type, Box::new(text))))
}

/// Comma separated expressions between parentheses, possibly none.
fn arguments(expression: &Schema<Expression>) -> Schema<Vec<Expression>> {
    let next = Schema::new("argument").or(Sequence::new().word(",").again(expression).passes::<Expression>());
    Schema::new("arguments")
        .or(Sequence::new()
            .word("(")
            .again(expression)
            .repeat(&next, 0)
            .word(")")
            .returns2(|first: Expression, rest: Vec<Expression>| {
                let mut arguments = Vec::with_capacity(rest.len() + 1);
                arguments.push(first);
                arguments.extend(rest);
                arguments
            }))
        .or(Sequence::new().word("( )").returns(Vec::new()))
}

pub fn build(
    expression: &Schema<Expression>,
    factor: &Schema<Expression>,
    chunks: &Chunks,
    literals: &Literals,
) -> Schema<FunctionCall> {
    let no_argument = Schema::token("function name", |token| {
        token
            .as_word()
            .and_then(|word| NO_ARGUMENT_FUNCTIONS.get(fold(word).as_str()).copied())
    });
    let one_argument = Schema::token("function name", |token| {
        token
            .as_word()
            .and_then(|word| ONE_ARGUMENT_FUNCTIONS.get(fold(word).as_str()).copied())
    });

    let formatted = |name: &'static str, build: fn(Option<Exactness>) -> FunctionCall| {
        Sequence::new()
            .word("the")
            .maybe(&literals.exactness)
            .word(name)
            .returns_single(build)
    };

    Schema::new("function call")
        .or(formatted("date", FunctionCall::Date))
        .or(formatted("time", FunctionCall::Time))
        .or(formatted("target", FunctionCall::Target))
        .or(Sequence::new()
            .word("the number of")
            .then(&countables(factor, chunks))
            .returns_single(FunctionCall::Number))
        .or(Sequence::new()
            .maybe_word("the")
            .then(&one_argument)
            .either(OF)
            .again(factor)
            .returns2(|function, argument| FunctionCall::OneArgument(function, argument)))
        .or(Sequence::new().word("the").then(&no_argument).returns_single(FunctionCall::NoArgument))
        .or(Sequence::new()
            .then(&no_argument)
            .word("( )")
            .returns_single(FunctionCall::NoArgument))
        .or(Sequence::new()
            .then(&literals.identifier)
            .then(&arguments(expression))
            .returns2(call))
}

/// A call with its arguments in parentheses.
///
/// The arguments are parsed once whatever the function; a built-in of one
/// argument is only recognized when given exactly one.
fn call(identifier: String, mut arguments: Vec<Expression>) -> FunctionCall {
    if arguments.len() == 1
        && let Some(&function) = ONE_ARGUMENT_FUNCTIONS.get(fold(&identifier).as_str())
        && let Some(argument) = arguments.pop()
    {
        return FunctionCall::OneArgument(function, argument);
    }
    FunctionCall::Custom { identifier, arguments }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ParseOptions;
    use crate::script::grammar::with_grammar;
    use crate::script::token::tokenize;

    fn parse(text: &str) -> Expression {
        with_grammar(|grammar| grammar.expression.parse(&tokenize(text), &ParseOptions::default())).unwrap()
    }

    #[test]
    fn test_call_classification() {
        assert_eq!(
            call("ABS".to_string(), vec![Expression::integer(-1)]),
            FunctionCall::OneArgument(OneArgumentFunction::Abs, Expression::integer(-1))
        );
        assert!(matches!(
            call("max".to_string(), vec![Expression::integer(1), Expression::integer(2)]),
            FunctionCall::Custom { arguments, .. } if arguments.len() == 2
        ));
        assert!(matches!(
            call("double".to_string(), vec![Expression::integer(1)]),
            FunctionCall::Custom { .. }
        ));
    }

    #[test]
    fn test_deeply_nested_calls() {
        let depth = 12;
        let text = format!("{}1{}", "max(".repeat(depth), ", 2)".repeat(depth));
        let mut expression = parse(&text);
        for _ in 0..depth {
            let Expression::FunctionCall(call) = expression else {
                panic!("not a call: {expression:?}");
            };
            let FunctionCall::Custom { identifier, mut arguments } = *call else {
                panic!("not a custom call");
            };
            assert_eq!(identifier, "max");
            assert_eq!(arguments.len(), 2);
            expression = arguments.remove(0);
        }
        assert_eq!(expression, Expression::integer(1));
    }
}
