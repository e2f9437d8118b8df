//! Syntax tree of scripts.
//!
//! Alternative spellings of an operator (`=` and `is`, `<>`, `≠` and
//! `is not`) produce the same node.

use serde::{Deserialize, Serialize};

use super::handler::HandlerKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Boolean(bool),
    Integer(i64),
    FloatingPoint(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Literal(Literal),
    Operator(Operator),
    ContainerContent(Box<ContainerDescriptor>),
    FunctionCall(Box<FunctionCall>),
    Property(Box<PropertyDescriptor>),
    Chunk(Box<ChunkExpression>),
}

impl Expression {
    pub fn integer(value: i64) -> Self {
        Expression::Literal(Literal::Integer(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expression::Literal(Literal::String(value.into()))
    }

    pub fn variable(identifier: impl Into<String>) -> Self {
        Expression::ContainerContent(Box::new(ContainerDescriptor::Variable(identifier.into())))
    }

    pub fn arithmetic(operator: ArithmeticOperator) -> Self {
        Expression::Operator(Operator::Arithmetic(operator))
    }

    pub fn comparison(operator: ComparisonOperator) -> Self {
        Expression::Operator(Operator::Comparison(operator))
    }

    pub fn logical(operator: LogicalOperator) -> Self {
        Expression::Operator(Operator::Logical(operator))
    }

    pub fn existence(operator: ExistenceOperator) -> Self {
        Expression::Operator(Operator::Existence(operator))
    }

    pub fn string_operation(operator: StringOperator) -> Self {
        Expression::Operator(Operator::String(operator))
    }
}

/// Operators grouped by the precedence layer that parses them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operator {
    Arithmetic(ArithmeticOperator),
    Comparison(ComparisonOperator),
    Logical(LogicalOperator),
    Existence(ExistenceOperator),
    String(StringOperator),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArithmeticOperator {
    Addition(Box<Expression>, Box<Expression>),
    Subtraction(Box<Expression>, Box<Expression>),
    Multiplication(Box<Expression>, Box<Expression>),
    Division(Box<Expression>, Box<Expression>),
    Exponentiation(Box<Expression>, Box<Expression>),
    Modulo(Box<Expression>, Box<Expression>),
    IntegerDivision(Box<Expression>, Box<Expression>),
    /// Unary minus
    Opposite(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    Equal(Box<Expression>, Box<Expression>),
    Unequal(Box<Expression>, Box<Expression>),
    LesserThan(Box<Expression>, Box<Expression>),
    GreaterThan(Box<Expression>, Box<Expression>),
    LesserThanOrEqual(Box<Expression>, Box<Expression>),
    GreaterThanOrEqual(Box<Expression>, Box<Expression>),
    Contains(Box<Expression>, Box<Expression>),
    IsIn(Box<Expression>, Box<Expression>),
    IsNotIn(Box<Expression>, Box<Expression>),
    /// A point within a rectangle
    IsWithin(Box<Expression>, Box<Expression>),
    IsNotWithin(Box<Expression>, Box<Expression>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogicalOperator {
    Not(Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExistenceOperator {
    IsOfType(Box<Expression>, ExpressionType),
    ThereIs(Box<ObjectDescriptor>),
    ThereIsNot(Box<ObjectDescriptor>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StringOperator {
    /// `&`
    Concatenation(Box<Expression>, Box<Expression>),
    /// `&&`
    ConcatenationWithSpace(Box<Expression>, Box<Expression>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpressionType {
    Number,
    Integer,
    Point,
    Rectangle,
    Date,
    Logical,
}

/// Something that holds a value and can be written into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContainerDescriptor {
    Variable(String),
    Part(PartDescriptor),
    MessageBox,
    Selection,
    Chunk(Box<ChunkContainer>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkContainer {
    pub chunk: Chunk,
    pub container: ContainerDescriptor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkExpression {
    pub chunk: Chunk,
    pub expression: Expression,
}

/// Nested chunk selectors, in text order: `char 2 of word 3` is
/// `[character 2, word 3]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub elements: Vec<ChunkElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkElement {
    pub chunk_type: ChunkType,
    pub number: ChunkNumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChunkType {
    Line,
    Item,
    Word,
    Character,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChunkNumber {
    Single(Ordinal),
    Range { minimum: Expression, maximum: Expression },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Ordinal {
    Any,
    Middle,
    Last,
    Number(Box<Expression>),
}

impl Ordinal {
    pub fn number(value: i64) -> Self {
        Ordinal::Number(Box::new(Expression::integer(value)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelativeOrdinal {
    Current,
    Next,
    Previous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerType {
    Card,
    Background,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartType {
    Button,
    Field,
    /// A button or a field
    Part,
}

/// How an object is found among its siblings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Identification {
    Ordinal(Ordinal),
    Identifier(Box<Expression>),
    Name(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StackDescriptor {
    Current,
    Named(Box<Expression>),
}

/// A card or a background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerDescriptor {
    Relative(RelativeOrdinal),
    Identified(Identification),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDescriptor {
    pub card: LayerDescriptor,
    /// Background the card is counted in, the whole stack if absent
    pub background: Option<LayerDescriptor>,
}

impl CardDescriptor {
    pub fn current() -> Self {
        Self {
            card: LayerDescriptor::Relative(RelativeOrdinal::Current),
            background: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartDescriptor {
    pub part_type: PartType,
    pub layer: LayerType,
    pub identification: Identification,
    /// Card holding the part, the current card if absent
    pub card: Option<CardDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectDescriptor {
    Me,
    HyperCard,
    Stack(StackDescriptor),
    Background(LayerDescriptor),
    Card(CardDescriptor),
    Part(PartDescriptor),
}

/// Formats of the date, time and target functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Exactness {
    Long,
    Short,
    Abbreviated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoArgumentFunction {
    ClickChunk,
    ClickH,
    ClickV,
    ClickLine,
    ClickLoc,
    ClickText,
    CommandKey,
    Destination,
    DiskSpace,
    FoundChunk,
    FoundField,
    FoundLine,
    FoundText,
    HeapSpace,
    Menus,
    Mouse,
    MouseClick,
    MouseH,
    MouseV,
    MouseLoc,
    OptionKey,
    ParamCount,
    Params,
    Programs,
    Result,
    ScreenRect,
    Seconds,
    SelectedChunk,
    SelectedField,
    SelectedLine,
    SelectedLoc,
    SelectedText,
    ShiftKey,
    Sound,
    Stacks,
    StackSpace,
    SystemVersion,
    Ticks,
    Tool,
    Windows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OneArgumentFunction {
    Abs,
    Atan,
    Average,
    CharToNum,
    Cos,
    Exp,
    Exp1,
    Exp2,
    Length,
    Ln,
    Ln1,
    Log2,
    Max,
    Min,
    NumToChar,
    Param,
    Random,
    Round,
    Sin,
    Sqrt,
    Sum,
    Tan,
    Trunc,
    Value,
}

/// What `the number of ...` counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Countable {
    Buttons(LayerType),
    Fields(LayerType),
    Parts(LayerType),
    Cards,
    MarkedCards,
    Backgrounds,
    Chunks(ChunkType, Box<Expression>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FunctionCall {
    /// A function defined by a script
    Custom { identifier: String, arguments: Vec<Expression> },
    NoArgument(NoArgumentFunction),
    OneArgument(OneArgumentFunction, Expression),
    Date(Option<Exactness>),
    Time(Option<Exactness>),
    Target(Option<Exactness>),
    Number(Countable),
}

/// `the <name> of <object>`, or a global property when there is no object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub object: Option<ObjectDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub handlers: Vec<Handler>,
}

impl Script {
    /// The handler with a name, ignoring case and diacritics.
    pub fn handler(&self, name: &str) -> Option<&Handler> {
        self.handlers
            .iter()
            .find(|h| crate::common::text::equals_folded(&h.name, name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Handler {
    pub name: String,
    pub kind: HandlerKind,
    pub argument_names: Vec<String>,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Flow(FlowStatement),
    Command(Command),
    Message(MessageCall),
}

/// A call to a handler by its name, like `doMenu "Quit"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageCall {
    pub identifier: String,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub condition: Expression,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlowStatement {
    Do {
        script: Expression,
        language: Option<Expression>,
    },
    Exit(String),
    ExitRepeat,
    ExitToHyperCard,
    Global(Vec<String>),
    /// `if`, then every `else if` in order
    If {
        conditions: Vec<Condition>,
        otherwise: Vec<Statement>,
    },
    NextRepeat,
    Pass(String),
    Repeat(Vec<Statement>),
    RepeatTimes(Expression, Vec<Statement>),
    RepeatUntil {
        condition: Expression,
        statements: Vec<Statement>,
    },
    RepeatWhile {
        condition: Expression,
        statements: Vec<Statement>,
    },
    RepeatWithCounter {
        counter: String,
        start: Expression,
        end: Expression,
        statements: Vec<Statement>,
    },
    RepeatWithDownCounter {
        counter: String,
        start: Expression,
        end: Expression,
        statements: Vec<Statement>,
    },
    Return,
    ReturnExpression(Expression),
    Send {
        message: Expression,
        target: ObjectDescriptor,
    },
    SendToHyperCard(Expression),
}

/// Where `put` writes in its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerTargetPosition {
    Into,
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GoDestination {
    Card(CardDescriptor),
    Background(LayerDescriptor),
    Stack(StackDescriptor),
    Back,
    Home,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VisibleObject {
    MenuBar,
    TitleBar,
    Picture(LayerType),
    Part(PartDescriptor),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShowCommand {
    Object(VisibleObject),
    AllCards,
    MarkedCards,
    Cards(Expression),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DurationExpression {
    Seconds(Expression),
    Ticks(Expression),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WaitCommand {
    Duration(DurationExpression),
    Until(Expression),
    While(Expression),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Add {
        value: Expression,
        container: ContainerDescriptor,
    },
    Answer {
        prompt: Expression,
        replies: Vec<Expression>,
    },
    Ask {
        prompt: Expression,
        default: Option<Expression>,
        password: bool,
    },
    Beep(Option<Expression>),
    Divide {
        container: ContainerDescriptor,
        by: Expression,
    },
    Get(Expression),
    Go(GoDestination),
    Hide(VisibleObject),
    Multiply {
        container: ContainerDescriptor,
        by: Expression,
    },
    /// Without a container, the value goes to the message box
    Put {
        value: Expression,
        position: ContainerTargetPosition,
        container: ContainerDescriptor,
    },
    Set {
        property: PropertyDescriptor,
        value: Expression,
    },
    Show(ShowCommand),
    Subtract {
        value: Expression,
        container: ContainerDescriptor,
    },
    Wait(WaitCommand),
}
