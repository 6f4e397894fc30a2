//! Parser for IRRE assembly
//!
//! Walks the token stream line by line, driving the grammar actions
//! against an explicit [`ParseState`]: label definitions, the three
//! `%` directives, and instruction lines. Validation problems are
//! collected in the state; only text the grammar cannot shape at all
//! becomes a hard parse error.

use crate::error::AssemblerError;
use crate::item::{ParseState, SourceLoc, ValidationErrorKind};
use crate::lexer::{Lexer, Spanned, Token};
use crate::validate::{process_line, RawOperand};

/// Parse source text into a [`ParseState`].
///
/// Returns `Err` only for lexical/structural failures; per-instruction
/// validation errors are collected into `state.errors` so the caller
/// can report the first one at its true location.
pub fn parse_source(source: &str) -> Result<ParseState, AssemblerError> {
    let tokens = Lexer::new(source).tokenize().map_err(|e| AssemblerError::Parse {
        line: e.loc.line,
        column: e.loc.column,
        message: e.message,
    })?;

    let mut state = ParseState::new();
    let mut pos = 0;

    while pos < tokens.len() {
        // collect one line of tokens
        let line_start = pos;
        while pos < tokens.len()
            && !matches!(tokens[pos].token, Token::Newline | Token::Eof)
        {
            pos += 1;
        }
        let line = &tokens[line_start..pos];
        pos += 1; // consume the newline/eof

        parse_line(&mut state, line)?;
    }

    Ok(state)
}

fn parse_line(state: &mut ParseState, line: &[Spanned]) -> Result<(), AssemblerError> {
    let mut rest = line;

    // leading label definitions bind to the next item
    while let Some(Spanned {
        token: Token::LabelDef(name),
        loc,
    }) = rest.first()
    {
        state.emit_label(name.clone(), *loc);
        rest = &rest[1..];
    }

    let Some(first) = rest.first() else {
        return Ok(());
    };

    match &first.token {
        Token::Directive(name) => parse_directive(state, name, first.loc, &rest[1..]),
        Token::Identifier(mnemonic) => {
            parse_instruction(state, mnemonic, first.loc, &rest[1..])
        }
        other => Err(AssemblerError::Parse {
            line: first.loc.line,
            column: first.loc.column,
            message: format!("expected label, directive, or instruction, got {}", other),
        }),
    }
}

fn parse_directive(
    state: &mut ParseState,
    name: &str,
    loc: SourceLoc,
    args: &[Spanned],
) -> Result<(), AssemblerError> {
    match name {
        "entry" => {
            // %entry: LABEL
            match args {
                [Spanned {
                    token: Token::Colon,
                    ..
                }, Spanned {
                    token: Token::Identifier(label),
                    ..
                }] => {
                    state.set_entry(label.clone());
                }
                _ => {
                    state.add_error(
                        ValidationErrorKind::InvalidDirective,
                        "%entry expects ': LABEL'".to_string(),
                        loc,
                    );
                }
            }
        }

        "section" => match args {
            [Spanned {
                token: Token::Identifier(section),
                ..
            }] => {
                state.set_section(section.clone());
            }
            _ => {
                state.add_error(
                    ValidationErrorKind::InvalidDirective,
                    "%section expects a section name".to_string(),
                    loc,
                );
            }
        },

        "d" => {
            let mut bytes = Vec::new();
            let mut ok = true;
            for arg in args {
                match &arg.token {
                    // each number contributes 4 little-endian bytes
                    Token::Number(value) => bytes.extend_from_slice(&value.to_le_bytes()),
                    // string bodies contribute their literal byte sequence
                    Token::Str(body) => bytes.extend_from_slice(body),
                    other => {
                        state.add_error(
                            ValidationErrorKind::InvalidDirective,
                            format!("%d payload accepts numbers and strings, got {}", other),
                            arg.loc,
                        );
                        ok = false;
                        break;
                    }
                }
            }
            if ok {
                state.emit_data(bytes, loc);
            }
        }

        other => {
            state.add_error(
                ValidationErrorKind::InvalidDirective,
                format!("unknown directive: %{}", other),
                loc,
            );
        }
    }
    Ok(())
}

fn parse_instruction(
    state: &mut ParseState,
    mnemonic: &str,
    loc: SourceLoc,
    args: &[Spanned],
) -> Result<(), AssemblerError> {
    let mut operands = Vec::with_capacity(args.len());
    for arg in args {
        match &arg.token {
            Token::Identifier(name) => operands.push(RawOperand::Ident(name.clone())),
            Token::Number(value) => operands.push(RawOperand::Num(*value)),
            other => {
                return Err(AssemblerError::Parse {
                    line: arg.loc.line,
                    column: arg.loc.column,
                    message: format!("expected operand, got {}", other),
                });
            }
        }
    }

    process_line(state, mnemonic, &operands, loc);
    Ok(())
}
