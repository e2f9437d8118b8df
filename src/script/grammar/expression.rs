//! Expressions, from the loosest binding operator down to factors.
//!
//! Each precedence layer is its operand layer followed by any number of
//! operator tails, folded to the left:
//!
//! | layer          | operators                                              |
//! |----------------|--------------------------------------------------------|
//! | or             | `or`                                                   |
//! | and            | `and`                                                  |
//! | equality       | `=` `is` `<>` `≠` `is not`                             |
//! | relational     | `<` `>` `<=` `≥` `contains` `is in` `is within` `is a` |
//! | concatenation  | `&` `&&`                                               |
//! | additive       | `+` `-`                                                |
//! | multiplicative | `*` `/` `div` `mod`                                    |
//! | power          | `^`                                                    |
//! | unary          | `-` `not` `there is a`                                 |

use crate::script::ast::{
    ArithmeticOperator, ChunkExpression, ComparisonOperator, ContainerDescriptor, ExistenceOperator, Expression,
    ExpressionType, FunctionCall, LogicalOperator, ObjectDescriptor, PropertyDescriptor, StringOperator,
};
use crate::script::schema::{Branch, Schema, Sequence, Tail};

use super::chunk::Chunks;
use super::literal::Literals;
use super::object::Objects;
use super::vocabulary::{ARTICLE, OF};

type Comparison = fn(Box<Expression>, Box<Expression>) -> ComparisonOperator;

/// `<words> <operand>`, pending its left operand.
fn tail(
    words: &'static str,
    operand: &Schema<Expression>,
    build: impl Fn(Box<Expression>, Box<Expression>) -> Expression + Copy + 'static,
) -> Branch<Tail<Expression>> {
    Sequence::new()
        .word(words)
        .then(operand)
        .returns_single(move |right: Expression| Tail::new(move |left: Expression| build(Box::new(left), Box::new(right))))
}

/// `<operand> <tail>*`, folded to the left.
fn layer(
    name: &'static str,
    operand: &Schema<Expression>,
    tails: impl IntoIterator<Item = Branch<Tail<Expression>>>,
) -> Schema<Expression> {
    tails
        .into_iter()
        .fold(Schema::new(name), Schema::or)
        .fold_left(name, operand)
}

/// `is [not] a <type>`.
fn type_test(negated: bool, literals: &Literals) -> Branch<Tail<Expression>> {
    Sequence::new()
        .word(if negated { "is not" } else { "is" })
        .either(ARTICLE)
        .then(&literals.expression_type)
        .returns_single(move |expression_type: ExpressionType| {
            Tail::new(move |left: Expression| {
                let test = Expression::existence(ExistenceOperator::IsOfType(Box::new(left), expression_type));
                if negated {
                    Expression::logical(LogicalOperator::Not(Box::new(test)))
                } else {
                    test
                }
            })
        })
}

/// The operator layers, from `unary` up to `or`.
fn operators(factor: &Schema<Expression>, objects: &Objects, literals: &Literals) -> Schema<Expression> {
    let unary: Schema<Expression> = Schema::new("unary");
    unary.define(Sequence::new().word("-").again(&unary).returns_single(|e: Expression| {
        Expression::arithmetic(ArithmeticOperator::Opposite(Box::new(e)))
    }));
    unary.define(Sequence::new()
        .word("not")
        .again(&unary)
        .returns_single(|e: Expression| Expression::logical(LogicalOperator::Not(Box::new(e)))));
    unary.define(Sequence::new()
        .word("there is not")
        .either(ARTICLE)
        .then(&objects.object)
        .returns_single(|o: ObjectDescriptor| Expression::existence(ExistenceOperator::ThereIsNot(Box::new(o)))));
    unary.define(Sequence::new()
        .word("there is")
        .either(ARTICLE)
        .then(&objects.object)
        .returns_single(|o: ObjectDescriptor| Expression::existence(ExistenceOperator::ThereIs(Box::new(o)))));
    unary.define(Sequence::new().again(factor).passes());

    let power = layer("power", &unary, [tail("^", &unary, |l, r| {
        Expression::arithmetic(ArithmeticOperator::Exponentiation(l, r))
    })]);
    let multiplicative = layer("multiplicative", &power, [
        tail("*", &power, |l, r| Expression::arithmetic(ArithmeticOperator::Multiplication(l, r))),
        tail("/", &power, |l, r| Expression::arithmetic(ArithmeticOperator::Division(l, r))),
        tail("div", &power, |l, r| Expression::arithmetic(ArithmeticOperator::IntegerDivision(l, r))),
        tail("mod", &power, |l, r| Expression::arithmetic(ArithmeticOperator::Modulo(l, r))),
    ]);
    let additive = layer("additive", &multiplicative, [
        tail("+", &multiplicative, |l, r| Expression::arithmetic(ArithmeticOperator::Addition(l, r))),
        tail("-", &multiplicative, |l, r| Expression::arithmetic(ArithmeticOperator::Subtraction(l, r))),
    ]);
    let concatenation = layer("concatenation", &additive, [
        tail("&&", &additive, |l, r| {
            Expression::string_operation(StringOperator::ConcatenationWithSpace(l, r))
        }),
        tail("&", &additive, |l, r| Expression::string_operation(StringOperator::Concatenation(l, r))),
    ]);

    // Longer spellings first, `is not in` would otherwise stop at `is`
    let comparisons: [(&'static str, Comparison); 11] = [
        ("<=", ComparisonOperator::LesserThanOrEqual),
        ("≤", ComparisonOperator::LesserThanOrEqual),
        (">=", ComparisonOperator::GreaterThanOrEqual),
        ("≥", ComparisonOperator::GreaterThanOrEqual),
        ("<", ComparisonOperator::LesserThan),
        (">", ComparisonOperator::GreaterThan),
        ("contains", ComparisonOperator::Contains),
        ("is not in", ComparisonOperator::IsNotIn),
        ("is in", ComparisonOperator::IsIn),
        ("is not within", ComparisonOperator::IsNotWithin),
        ("is within", ComparisonOperator::IsWithin),
    ];
    let relational = layer(
        "relational",
        &concatenation,
        comparisons
            .into_iter()
            .map(|(words, build)| tail(words, &concatenation, move |l, r| Expression::comparison(build(l, r))))
            .chain([type_test(true, literals), type_test(false, literals)]),
    );

    let equality = layer("equality", &relational, [
        tail("=", &relational, |l, r| Expression::comparison(ComparisonOperator::Equal(l, r))),
        tail("is not", &relational, |l, r| Expression::comparison(ComparisonOperator::Unequal(l, r))),
        tail("is", &relational, |l, r| Expression::comparison(ComparisonOperator::Equal(l, r))),
        tail("<>", &relational, |l, r| Expression::comparison(ComparisonOperator::Unequal(l, r))),
        tail("≠", &relational, |l, r| Expression::comparison(ComparisonOperator::Unequal(l, r))),
    ]);
    let and = layer("and", &equality, [tail("and", &equality, |l, r| {
        Expression::logical(LogicalOperator::And(l, r))
    })]);
    layer("or", &and, [tail("or", &and, |l, r| Expression::logical(LogicalOperator::Or(l, r)))])
}

/// Define the branches of the shared `expression` and `factor` schemas.
pub fn define(
    expression: &Schema<Expression>,
    factor: &Schema<Expression>,
    container: &Schema<ContainerDescriptor>,
    functions: &Schema<FunctionCall>,
    chunks: &Chunks,
    objects: &Objects,
    literals: &Literals,
) {
    expression.define(Sequence::new().then(&operators(factor, objects, literals)).passes());

    factor.define(Sequence::new().word("(").again(expression).word(")").passes());
    factor.define(Sequence::new().then(&literals.literal).returns_single(Expression::Literal));
    factor.define(Sequence::new().then(&chunks.chunk).again(factor).returns2(|chunk, expression| {
        Expression::Chunk(Box::new(ChunkExpression { chunk, expression }))
    }));
    factor.define(Sequence::new()
        .then(functions)
        .returns_single(|call: FunctionCall| Expression::FunctionCall(Box::new(call))));
    factor.define(Sequence::new()
        .word("the")
        .then(&literals.word)
        .either(OF)
        .then(&objects.object)
        .returns2(|name, object: ObjectDescriptor| {
            Expression::Property(Box::new(PropertyDescriptor {
                name,
                object: Some(object),
            }))
        }));
    factor.define(Sequence::new()
        .word("the")
        .then(&literals.word)
        .returns_single(|name| Expression::Property(Box::new(PropertyDescriptor { name, object: None }))));
    factor.define(Sequence::new()
        .again(container)
        .returns_single(|c: ContainerDescriptor| Expression::ContainerContent(Box::new(c))));
}
