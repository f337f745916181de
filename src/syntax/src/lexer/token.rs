use std::fmt::{self, Display, Formatter};

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Number(f64),
    Ident(String),

    KwDef,
    KwVal,

    Assign,
    BinOp(String),
    Comma,
    Colon,

    BlockOpen,
    BlockClose,
    ParenOpen,
    ParenClose,

    Newline,
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        use self::Token::*;

        match self {
            Number(value) => write!(f, "{:.6}", value),
            Ident(name) => write!(f, "{}", name),
            KwDef => write!(f, "def"),
            KwVal => write!(f, "val"),
            Assign => write!(f, "="),
            BinOp(op) => write!(f, "{}", op),
            Comma => write!(f, ","),
            Colon => write!(f, ":"),
            BlockOpen => write!(f, "{{"),
            BlockClose => write!(f, "}}"),
            ParenOpen => write!(f, "("),
            ParenClose => write!(f, ")"),
            Newline => write!(f, "\\n"),
        }
    }
}
