//! Lisp-style AST rendering, used by the `parse` subcommand and the parser
//! tests.  `1 + 2 * 3` prints as `(+ 1 (* 2 3))`.

use crate::expr::{Expr, FunctionExpr, LiteralValue};
use crate::stmt::Stmt;

pub struct AstPrinter;

impl AstPrinter {
    pub fn print_expr(&self, expression: &Expr) -> String {
        match expression {
            Expr::Literal(literal) => match literal {
                LiteralValue::Number(n) => {
                    if n.fract() == 0.0 {
                        format!("{:.0}", n)
                    } else {
                        n.to_string()
                    }
                }
                LiteralValue::Str(s) => s.clone(),
                LiteralValue::True => "true".to_string(),
                LiteralValue::False => "false".to_string(),
                LiteralValue::Nil => "nil".to_string(),
            },

            Expr::Unary { operator, right } => {
                self.parenthesize(&operator.lexeme, &[right])
            }

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => self.parenthesize(&operator.lexeme, &[left, right]),

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => self.parenthesize("?:", &[condition, then_branch, else_branch]),

            Expr::Grouping(inner) => self.parenthesize("group", &[inner]),

            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Assign { name, value, .. } => {
                format!("(= {} {})", name.lexeme, self.print_expr(value))
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut out = format!("(call {}", self.print_expr(callee));

                for argument in arguments {
                    out.push(' ');
                    out.push_str(&self.print_expr(argument));
                }

                out.push(')');
                out
            }

            Expr::Function(function) => self.print_function("fun", function),

            Expr::Get { object, name } => {
                format!("(. {} {})", self.print_expr(object), name.lexeme)
            }

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "(= (. {} {}) {})",
                self.print_expr(object),
                name.lexeme,
                self.print_expr(value)
            ),

            Expr::This { .. } => "this".to_string(),

            Expr::Super { method, .. } => format!("(super {})", method.lexeme),
        }
    }

    pub fn print_stmt(&self, statement: &Stmt) -> String {
        match statement {
            Stmt::Expression(expr) => format!("(; {})", self.print_expr(expr)),

            Stmt::Print(expr) => format!("(print {})", self.print_expr(expr)),

            Stmt::Var { name, initializer } => match initializer {
                Some(initializer) => {
                    format!("(var {} {})", name.lexeme, self.print_expr(initializer))
                }
                None => format!("(var {})", name.lexeme),
            },

            Stmt::Block(statements) => {
                let mut out = String::from("(block");

                for statement in statements {
                    out.push(' ');
                    out.push_str(&self.print_stmt(statement));
                }

                out.push(')');
                out
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => match else_branch {
                Some(else_branch) => format!(
                    "(if {} {} {})",
                    self.print_expr(condition),
                    self.print_stmt(then_branch),
                    self.print_stmt(else_branch)
                ),
                None => format!(
                    "(if {} {})",
                    self.print_expr(condition),
                    self.print_stmt(then_branch)
                ),
            },

            Stmt::While { condition, body } => format!(
                "(while {} {})",
                self.print_expr(condition),
                self.print_stmt(body)
            ),

            Stmt::Break { .. } => "(break)".to_string(),

            Stmt::Function { name, function } => {
                self.print_function(&format!("fun {}", name.lexeme), function)
            }

            Stmt::Return { value, .. } => match value {
                Some(value) => format!("(return {})", self.print_expr(value)),
                None => "(return)".to_string(),
            },

            Stmt::Class {
                name,
                superclass,
                methods,
                class_methods,
            } => {
                let mut out = format!("(class {}", name.lexeme);

                if let Some(superclass) = superclass {
                    out.push_str(" < ");
                    out.push_str(&self.print_expr(superclass));
                }

                for method in class_methods {
                    out.push(' ');
                    out.push_str(&self.print_function(
                        &format!("class {}", method.name.lexeme),
                        &method.function,
                    ));
                }

                for method in methods {
                    out.push(' ');
                    out.push_str(&self.print_function(&method.name.lexeme, &method.function));
                }

                out.push(')');
                out
            }
        }
    }

    fn print_function(&self, head: &str, function: &FunctionExpr) -> String {
        let mut out = format!("({} (", head);

        for (i, param) in function.params.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(&param.lexeme);
        }

        out.push(')');

        for statement in &function.body {
            out.push(' ');
            out.push_str(&self.print_stmt(statement));
        }

        out.push(')');
        out
    }

    fn parenthesize(&self, name: &str, expressions: &[&Expr]) -> String {
        let mut out = format!("({}", name);

        for expression in expressions {
            out.push(' ');
            out.push_str(&self.print_expr(expression));
        }

        out.push(')');
        out
    }
}
