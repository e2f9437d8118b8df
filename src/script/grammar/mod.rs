//! The grammar of the scripting language.
//!
//! Rules that refer to each other in a cycle (`expression`, `factor`,
//! `container` and `statement`) are created empty first, held here, and
//! completed by the modules that define their branches. Everything else is
//! built bottom-up from them.
//!
//! Building the grammar allocates several hundred rules, so it is done once
//! per thread and shared through [`with_grammar`].

mod chunk;
mod container;
mod expression;
mod function;
mod literal;
mod object;
mod statement;
mod vocabulary;

use crate::script::ast::{ContainerDescriptor, Expression, Handler, ObjectDescriptor, Statement};
use crate::script::schema::Schema;

/// The entry points of the grammar and the shared rules they depend on.
pub(crate) struct Grammar {
    pub expression: Schema<Expression>,
    pub handler: Schema<Handler>,
    pub object: Schema<ObjectDescriptor>,
    #[allow(dead_code)]
    factor: Schema<Expression>,
    #[allow(dead_code)]
    container: Schema<ContainerDescriptor>,
    #[allow(dead_code)]
    statement: Schema<Statement>,
}

impl Grammar {
    fn new() -> Self {
        let expression = Schema::new("expression");
        let factor = Schema::new("factor");
        let container = Schema::new("container");
        let statement = Schema::new("statement");

        let literals = literal::build();
        let objects = object::build(&expression, &factor, &literals);
        let chunks = chunk::build(&expression, &literals);
        let functions = function::build(&expression, &factor, &chunks, &literals);
        container::define(&container, &chunks, &objects, &literals);
        expression::define(&expression, &factor, &container, &functions, &chunks, &objects, &literals);
        let handler = statement::define(&statement, &expression, &factor, &container, &objects, &literals);
        log::debug!("Script grammar built");

        Self {
            expression,
            handler,
            object: objects.object,
            factor,
            container,
            statement,
        }
    }
}

thread_local! {
    static GRAMMAR: Grammar = Grammar::new();
}

/// Run `f` with the grammar of the current thread.
pub(crate) fn with_grammar<R>(f: impl FnOnce(&Grammar) -> R) -> R {
    GRAMMAR.with(f)
}
