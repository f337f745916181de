pub mod token;

use thiserror::Error;
use tracing::trace;

use std::fmt::{self, Display, Formatter};
use std::iter::Peekable;
use std::str::CharIndices;

use self::token::Token;

pub type Term = (Span, Token);

/// Byte range of a token in the source plus the 1-based line it starts on.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Span {
    pub lo: usize,
    pub hi: usize,
    pub line: usize,
}

impl Span {
    pub fn new(lo: usize, hi: usize, line: usize) -> Self {
        Self { lo, hi, line }
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}:{}..{}", self.line, self.lo, self.hi)
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
#[error("{message} at {span}")]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

impl LexError {
    fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

fn is_delimiter(c: char) -> bool {
    match c {
        ',' | '{' | '}' | '(' | ')' => true,
        _ => false,
    }
}

fn is_operator_char(c: char) -> bool {
    c.is_ascii_punctuation() && !is_delimiter(c)
}

/// Streaming tokenizer over a source string.
///
/// Nesting of `{}` and `()` is tracked while scanning, so a closer without a
/// matching opener fails right where it occurs. Unclosed openers at the end of
/// input are left for the parser to report. The iterator is fused after the
/// first error.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    blocks: usize,
    parens: usize,
    pending: Option<Term>,
    failed: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            line: 1,
            blocks: 0,
            parens: 0,
            pending: None,
            failed: false,
        }
    }

    fn span(&self, lo: usize, hi: usize) -> Span {
        Span::new(lo, hi, self.line)
    }

    fn end_of(&mut self) -> usize {
        self.chars.peek().map_or(self.source.len(), |&(i, _)| i)
    }

    fn take_while<P: Fn(char) -> bool>(&mut self, lo: usize, pred: P) -> &'a str {
        while let Some(&(_, c)) = self.chars.peek() {
            if !pred(c) {
                break;
            }
            self.chars.next();
        }
        let hi = self.end_of();
        let source = self.source;
        &source[lo..hi]
    }

    fn number(&mut self, lo: usize) -> Result<Term, LexError> {
        let mut has_dot = false;

        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_digit() {
                self.chars.next();
            } else if c == '.' && !has_dot {
                has_dot = true;
                self.chars.next();
            } else {
                break;
            }
        }

        let hi = self.end_of();
        let source = self.source;
        let text = &source[lo..hi];

        // `5.abs` is a number followed by a dot operator, never `5.` alone.
        let digits = if text.ends_with('.') {
            let dot = self.span(hi - 1, hi);
            self.pending = Some((dot, Token::BinOp(".".to_owned())));
            &text[..text.len() - 1]
        } else {
            text
        };

        let span = self.span(lo, lo + digits.len());
        digits
            .parse()
            .map(|value| (span, Token::Number(value)))
            .map_err(|_| LexError::new(format!("malformed number \"{}\"", digits), span))
    }

    fn word(&mut self, lo: usize) -> Term {
        let text = self.take_while(lo, |c| c.is_ascii_alphanumeric());
        let span = self.span(lo, lo + text.len());

        let token = match text {
            "def" => Token::KwDef,
            "val" => Token::KwVal,
            _ => Token::Ident(text.to_owned()),
        };

        (span, token)
    }

    fn operator(&mut self, lo: usize) -> Term {
        let text = self.take_while(lo, is_operator_char);
        let span = self.span(lo, lo + text.len());

        let token = match text {
            "=" => Token::Assign,
            ":" => Token::Colon,
            _ => Token::BinOp(text.to_owned()),
        };

        (span, token)
    }

    fn close(&mut self, lo: usize, c: char) -> Result<Term, LexError> {
        let span = self.span(lo, lo + 1);

        let (open, what, token) = if c == '}' {
            (&mut self.blocks, "block", Token::BlockClose)
        } else {
            (&mut self.parens, "parens", Token::ParenClose)
        };

        if *open == 0 {
            return Err(LexError::new(
                format!("closing {} when none is open", what),
                span,
            ));
        }

        *open -= 1;
        Ok((span, token))
    }

    fn next_term(&mut self) -> Option<Result<Term, LexError>> {
        if let Some(term) = self.pending.take() {
            return Some(Ok(term));
        }

        while let Some((lo, c)) = self.chars.next() {
            let line = self.line;
            let single = |token| Some(Ok((Span::new(lo, lo + 1, line), token)));

            return match c {
                '\n' => {
                    let term = single(Token::Newline);
                    self.line += 1;
                    term
                },
                c if c.is_whitespace() => continue,
                c if c.is_ascii_digit() => Some(self.number(lo)),
                c if c.is_ascii_alphabetic() => Some(Ok(self.word(lo))),
                ',' => single(Token::Comma),
                '{' => {
                    self.blocks += 1;
                    single(Token::BlockOpen)
                },
                '(' => {
                    self.parens += 1;
                    single(Token::ParenOpen)
                },
                '}' | ')' => Some(self.close(lo, c)),
                c if is_operator_char(c) => Some(Ok(self.operator(lo))),
                c => {
                    trace!(?c, lo, "skipping unrecognized character");
                    continue;
                },
            };
        }

        None
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Term, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let item = self.next_term();
        match &item {
            Some(Ok((span, token))) => trace!(%span, %token, "token"),
            Some(Err(_)) => self.failed = true,
            None => {},
        }
        item
    }
}

/// Lexes the whole source, stopping at the first error.
pub fn tokenize(source: &str) -> Result<Vec<Term>, LexError> {
    Lexer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::token::Token::*;

    use proptest::prelude::*;

    fn tokens(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|(_, token)| token)
            .collect()
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            tokens("def val define x1"),
            vec![KwDef, KwVal, Ident("define".into()), Ident("x1".into())]
        );
    }

    #[test]
    fn identifiers_stop_at_underscores() {
        assert_eq!(
            tokens("sum_sq"),
            vec![Ident("sum".into()), BinOp("_".into()), Ident("sq".into())]
        );
    }

    #[test]
    fn trailing_dot_becomes_operator() {
        assert_eq!(
            tokens("5.abs"),
            vec![Number(5.0), BinOp(".".into()), Ident("abs".into())]
        );
    }

    #[test]
    fn second_dot_starts_operator() {
        assert_eq!(
            tokens("1.5.2"),
            vec![Number(1.5), BinOp(".".into()), Number(2.0)]
        );
    }

    #[test]
    fn punctuation_runs_are_classified() {
        assert_eq!(
            tokens("val x = a += b : c"),
            vec![
                KwVal,
                Ident("x".into()),
                Assign,
                Ident("a".into()),
                BinOp("+=".into()),
                Ident("b".into()),
                Colon,
                Ident("c".into()),
            ]
        );
    }

    #[test]
    fn operator_runs_stop_at_delimiters() {
        assert_eq!(
            tokens("2*(3)"),
            vec![Number(2.0), BinOp("*".into()), ParenOpen, Number(3.0), ParenClose]
        );
    }

    #[test]
    fn newlines_are_kept() {
        assert_eq!(
            tokens("1\n\t2 \r\n"),
            vec![Number(1.0), Newline, Number(2.0), Newline]
        );
    }

    #[test]
    fn spans_track_lines() {
        let terms = tokenize("val x = 1\nx").unwrap();
        let (span, token) = terms.last().unwrap();
        assert_eq!(*token, Ident("x".into()));
        assert_eq!(*span, Span::new(10, 11, 2));
    }

    #[test]
    fn unmatched_closer_fails_at_its_position() {
        let err = tokenize("{ 1 }\n}").unwrap_err();
        assert_eq!(err.message, "closing block when none is open");
        assert_eq!(err.span, Span::new(6, 7, 2));

        let err = tokenize("(1))").unwrap_err();
        assert_eq!(err.message, "closing parens when none is open");
        assert_eq!(err.span.lo, 3);
    }

    #[test]
    fn unclosed_openers_are_not_a_lex_error() {
        assert!(tokenize("{ ( 1").is_ok());
    }

    #[test]
    fn lexer_is_fused_after_error() {
        let mut lexer = Lexer::new(") 1");
        assert!(matches!(lexer.next(), Some(Err(_))));
        assert!(lexer.next().is_none());
    }

    proptest! {
        #[test]
        fn numeric_literals_lex_to_one_number(int in "[0-9]{1,8}", frac in proptest::option::of("[0-9]{1,6}")) {
            let literal = match &frac {
                Some(frac) => format!("{}.{}", int, frac),
                None => int.clone(),
            };

            let expected: f64 = literal.parse().unwrap();
            prop_assert_eq!(tokens(&literal), vec![Number(expected)]);
        }

        #[test]
        fn bare_trailing_dot_is_split(int in "[0-9]{1,8}") {
            let expected: f64 = int.parse().unwrap();
            prop_assert_eq!(
                tokens(&format!("{}.", int)),
                vec![Number(expected), BinOp(".".into())]
            );
        }

        #[test]
        fn well_nested_delimiters_lex(depth in 0usize..16, parens in any::<bool>()) {
            let (open, close) = if parens { ("(", ")") } else { ("{", "}") };
            let source = format!("{}1{}", open.repeat(depth), close.repeat(depth));
            prop_assert!(tokenize(&source).is_ok());
        }

        #[test]
        fn premature_closer_fails_at_closer(depth in 0usize..8) {
            let source = format!("{}{}}}", "{".repeat(depth), "}".repeat(depth));
            let err = tokenize(&source).unwrap_err();
            prop_assert_eq!(err.span.lo, 2 * depth);
        }
    }
}
