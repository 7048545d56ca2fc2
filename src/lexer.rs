//! This module provides the lexer for the instruction language. Words are split by the
//! `pest` grammar in `grammar.pest`; the lexer then classifies each word as a keyword or
//! an integer operand and folds operands into the keyword token that owns them.

use crate::types::{Location, SanaeError, SyntaxError, SyntaxReason, Token, DEFAULT_MOVE_STEPS};
use lazy_static::lazy_static;
use pest::Parser as PestParser;
use pest_derive::Parser as PestParser;
use std::collections::HashMap;

/// Derives a `PestParser` for the command grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct SanaeParser;

/// Keywords of the instruction language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    If,
    Erase,
    Write,
    MoveRight,
    MoveLeft,
    Goto,
    Halt,
}

impl Keyword {
    /// Whether an integer following this keyword belongs to it.
    fn takes_operand(self) -> bool {
        !matches!(self, Keyword::Erase | Keyword::Halt)
    }
}

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, Keyword> = HashMap::from([
        ("if", Keyword::If),
        ("erase", Keyword::Erase),
        ("write", Keyword::Write),
        ("mover", Keyword::MoveRight),
        ("movel", Keyword::MoveLeft),
        ("goto", Keyword::Goto),
        ("halt", Keyword::Halt),
    ]);
}

/// A whitespace delimited word of source text.
#[derive(Debug, Clone, Copy)]
struct Word<'a> {
    text: &'a str,
    location: Location,
}

impl Word<'_> {
    fn error(&self, reason: SyntaxReason) -> SyntaxError {
        SyntaxError {
            word: self.text.to_string(),
            reason,
            location: self.location,
        }
    }

    /// True for an optionally signed run of decimal digits.
    fn is_integer(&self) -> bool {
        let digits = self
            .text
            .strip_prefix(|c| c == '+' || c == '-')
            .unwrap_or(self.text);
        !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
    }

    fn integer(&self) -> Result<i64, SyntaxError> {
        self.text
            .parse()
            .map_err(|_| self.error(SyntaxReason::OperandOutOfRange))
    }

    /// Parses the word as a step count or state index.
    fn count(&self) -> Result<usize, SyntaxError> {
        let value = self.integer()?;
        if value < 0 {
            return Err(self.error(SyntaxReason::NegativeOperand));
        }
        usize::try_from(value).map_err(|_| self.error(SyntaxReason::OperandOutOfRange))
    }
}

/// Tokenizes the text of a single command.
///
/// Keywords are case-insensitive. `write`, `if` and `goto` require an operand,
/// `mover` and `movel` default to a single step when it is omitted.
///
/// # Returns
///
/// * `Ok(Vec<Token>)` with the tokens in source order.
/// * `Err(SanaeError::Syntax)` naming the offending word and its location.
pub fn tokenize(text: &str) -> Result<Vec<Token>, SanaeError> {
    tokenize_line(text, 1)
}

/// Tokenizes `text` as if it started on source line `line`.
pub(crate) fn tokenize_line(text: &str, line: usize) -> Result<Vec<Token>, SanaeError> {
    let words = split_words(text, line)?;
    Ok(lex(&words)?)
}

/// Splits `text` into words using the `command` grammar rule.
fn split_words(text: &str, first_line: usize) -> Result<Vec<Word<'_>>, SanaeError> {
    let pairs = SanaeParser::parse(Rule::command, text)
        .map_err(|e| SanaeError::ParseError(Box::new(e)))?;

    Ok(pairs
        .flat_map(|command| command.into_inner())
        .filter(|pair| pair.as_rule() == Rule::word)
        .map(|pair| {
            let (line, column) = pair.as_span().start_pos().line_col();
            Word {
                text: pair.as_str(),
                location: Location {
                    line: first_line + line - 1,
                    column,
                },
            }
        })
        .collect())
}

/// Runs a single left-to-right pass over the words.
fn lex(words: &[Word<'_>]) -> Result<Vec<Token>, SyntaxError> {
    let mut tokens = Vec::with_capacity(words.len());
    let mut cursor = 0;

    while let Some(word) = words.get(cursor) {
        cursor += 1;

        if word.is_integer() {
            return Err(word.error(SyntaxReason::MisplacedOperand));
        }

        let keyword = KEYWORDS
            .get(word.text.to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| word.error(SyntaxReason::UnknownWord))?;

        let operand = match words.get(cursor) {
            Some(next) if keyword.takes_operand() && next.is_integer() => {
                cursor += 1;
                Some(next)
            }
            _ => None,
        };

        tokens.push(token(keyword, word, operand)?);
    }

    Ok(tokens)
}

/// Builds the token for `keyword`, checking its operand.
fn token(
    keyword: Keyword,
    word: &Word<'_>,
    operand: Option<&Word<'_>>,
) -> Result<Token, SyntaxError> {
    let required = || operand.ok_or_else(|| word.error(SyntaxReason::MissingOperand));
    let steps = || operand.map_or(Ok(DEFAULT_MOVE_STEPS), Word::count);

    Ok(match keyword {
        Keyword::Erase => Token::Erase,
        Keyword::Halt => Token::Halt,
        Keyword::If => Token::If(required()?.integer()?),
        Keyword::Write => Token::Write(required()?.integer()?),
        Keyword::Goto => Token::Goto(required()?.count()?),
        Keyword::MoveRight => Token::MoveRight(steps()?),
        Keyword::MoveLeft => Token::MoveLeft(steps()?),
    })
}
