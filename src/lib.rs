/*!
A tree-walking interpreter for the Lox language.

The pipeline has four stages, each its own module:

1. [`scanner`] — bytes → tokens (comments retained as `COMMENT` tokens)
2. [`parser`] — tokens → AST ([`expr`], [`stmt`]), with error recovery
3. [`resolver`] — static analysis: binds each name use to its defining
   scope and rejects programs that break the static rules
4. [`interpreter`] — walks the resolved AST against [`environment`] frames,
   producing [`value`]s

[`error`] defines the crate-wide error hierarchy, [`ast_printer`] renders
trees for the `parse` subcommand, and [`function`] / [`class`] hold the
runtime callables.
*/

pub mod ast_printer;
pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;
pub mod value;
