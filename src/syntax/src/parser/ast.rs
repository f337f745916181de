use std::fmt::{self, Display, Formatter};

#[derive(Clone, Debug, PartialEq)]
pub struct Prototype {
    pub name: String,
    pub params: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Ast {
    Number(f64),
    BinOp {
        op: String,
        lhs: Box<Ast>,
        rhs: Box<Ast>,
    },
    /// Reference to a value or parameter (no args) or a call to a def.
    Call {
        name: String,
        args: Vec<Ast>,
    },
    Value {
        name: String,
        expr: Box<Ast>,
    },
    Def {
        prototype: Prototype,
        body: Box<Ast>,
    },
    Block {
        body: Vec<Ast>,
        depth: usize,
    },
}

impl Ast {
    pub fn binop(op: impl Into<String>, lhs: Ast, rhs: Ast) -> Self {
        Ast::BinOp {
            op: op.into(),
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Whether the node produces a value, as opposed to only binding a name.
    pub fn is_expr(&self) -> bool {
        match self {
            Ast::Number(_) | Ast::BinOp { .. } | Ast::Call { .. } | Ast::Block { .. } => true,
            Ast::Value { .. } | Ast::Def { .. } => false,
        }
    }
}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Display for Ast {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Ast::Number(value) => write!(f, "{:.6}", value),
            Ast::BinOp { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op, rhs),
            Ast::Call { name, args } if args.is_empty() => write!(f, "{}", name),
            Ast::Call { name, args } => write!(f, "{}({})", name, join(args)),
            Ast::Value { name, expr } => write!(f, "val {} = {}", name, expr),
            Ast::Def { prototype: Prototype { name, params }, body } => {
                write!(f, "def {}", name)?;
                if !params.is_empty() {
                    write!(f, "({})", join(params))?;
                }
                write!(f, " = {}", body)
            },
            Ast::Block { body, depth } => {
                let indent = "  ".repeat(depth + 1);
                writeln!(f, "{{")?;
                for node in body {
                    writeln!(f, "{}{}", indent, node)?;
                }
                write!(f, "{}}}", "  ".repeat(*depth))
            },
        }
    }
}
