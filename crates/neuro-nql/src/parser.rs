//! Parser for NQL
//!
//! Uses nom to parse NQL source into the parse tree of `crate::ast`.
//! Statements are separated by `;` or newlines. Inside a statement tokens are
//! separated by spaces or tabs; inside a property block any whitespace goes.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, line_ending, multispace0, none_of, satisfy, space0},
    combinator::{cut, map, opt, recognize, value},
    error::Error as NomError,
    multi::{fold_many0, many0, many0_count, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    Finish, IResult,
};

use crate::ast::{Identifier, NodeRef, Pair, PropertyBlock, Script, Statement, StatementKind};
use crate::error::NqlError;

/// Parse a script of zero or more statements.
pub fn parse_script(source: &str) -> Result<Script, NqlError> {
    let mut statements = Vec::new();
    let mut rest = skip_separators(source);

    while !rest.is_empty() {
        let start = rest;
        let (after, statement) = statement(rest)
            .finish()
            .map_err(|e| syntax_error(source, e.input))?;
        check_shape(source, start, &statement)?;
        statements.push(statement);

        let (after, _) = space0::<_, NomError<&str>>(after).unwrap_or((after, ""));
        if after.is_empty() {
            break;
        }
        match separator(after) {
            Ok((remaining, _)) => rest = skip_separators(remaining),
            Err(_) => return Err(syntax_error(source, after)),
        }
    }

    Ok(Script { statements })
}

/// Parse source holding exactly one statement.
pub fn parse_statement(source: &str) -> Result<Statement, NqlError> {
    let mut script = parse_script(source)?;
    match script.statements.len() {
        1 => Ok(script.statements.remove(0)),
        n => Err(NqlError::Syntax {
            message: format!("expected exactly one statement, found {}", n),
            line: 1,
            column: 1,
        }),
    }
}

// ============================================================================
// Error positions
// ============================================================================

/// 1-based line and column of `rest` within `source`.
fn position(source: &str, rest: &str) -> (usize, usize) {
    let offset = source.len().saturating_sub(rest.len());
    let consumed = &source[..offset];
    let line = consumed.matches('\n').count() + 1;
    let column = match consumed.rfind('\n') {
        Some(newline) => consumed[newline + 1..].chars().count() + 1,
        None => consumed.chars().count() + 1,
    };
    (line, column)
}

fn syntax_error(source: &str, rest: &str) -> NqlError {
    let (line, column) = position(source, rest);
    let message = match rest.chars().next() {
        Some('\n') => "unexpected end of line".to_string(),
        Some(c) => format!("unexpected character {:?}", c),
        None => "unexpected end of input".to_string(),
    };
    NqlError::Syntax {
        message,
        line,
        column,
    }
}

fn check_shape(source: &str, start: &str, statement: &Statement) -> Result<(), NqlError> {
    let (line, column) = position(source, start);
    let keyword = statement.kind.keyword();
    if let Some(expected) = statement.kind.arity() {
        if statement.nodes.len() != expected {
            return Err(NqlError::Syntax {
                message: format!(
                    "'{}' takes {} node reference{}, got {}",
                    keyword,
                    expected,
                    if expected == 1 { "" } else { "s" },
                    statement.nodes.len()
                ),
                line,
                column,
            });
        }
    }
    if !statement.kind.allows_properties() && statement.nodes.iter().any(|n| n.properties.is_some()) {
        return Err(NqlError::Syntax {
            message: format!("'{}' takes no property block", keyword),
            line,
            column,
        });
    }
    Ok(())
}

// ============================================================================
// Nom Parser Combinators
// ============================================================================

fn separator(input: &str) -> IResult<&str, ()> {
    value((), alt((tag(";"), line_ending)))(input)
}

/// Skips any run of whitespace and `;`.
fn skip_separators(input: &str) -> &str {
    input.trim_start_matches(|c: char| c.is_whitespace() || c == ';')
}

/// Parse a CNAME: `[A-Za-z_][A-Za-z0-9_]*`
fn cname(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        many0_count(satisfy(|c| c.is_ascii_alphanumeric() || c == '_')),
    ))(input)
}

/// Parse a backtick-quoted key; a doubled backtick stands for one.
fn escaped_key(input: &str) -> IResult<&str, String> {
    preceded(
        char('`'),
        cut(terminated(
            fold_many0(
                alt((value('`', tag("``")), none_of("`"))),
                String::new,
                |mut acc, c| {
                    acc.push(c);
                    acc
                },
            ),
            char('`'),
        )),
    )(input)
}

fn identifier(input: &str) -> IResult<&str, Identifier> {
    alt((
        map(escaped_key, Identifier::escaped),
        map(cname, |name: &str| Identifier {
            name: name.to_string(),
            escaped: false,
        }),
    ))(input)
}

fn string_char(input: &str) -> IResult<&str, char> {
    alt((
        preceded(
            char('\\'),
            alt((
                value('"', char('"')),
                value('\\', char('\\')),
                value('\n', char('n')),
                value('\t', char('t')),
                value('\r', char('r')),
            )),
        ),
        none_of("\\\""),
    ))(input)
}

/// Parse a double-quoted string with `\" \\ \n \t \r` escapes.
fn escaped_string(input: &str) -> IResult<&str, String> {
    preceded(
        char('"'),
        cut(terminated(
            fold_many0(string_char, String::new, |mut acc, c| {
                acc.push(c);
                acc
            }),
            char('"'),
        )),
    )(input)
}

fn property_pair(input: &str) -> IResult<&str, Pair> {
    map(
        tuple((
            identifier,
            cut(tuple((multispace0, char(':'), multispace0, escaped_string))),
        )),
        |(key, (_, _, _, value))| Pair { key, value },
    )(input)
}

/// Parse a property block: `{key: "value", other: "value",}`
fn property_block(input: &str) -> IResult<&str, PropertyBlock> {
    preceded(
        char('{'),
        cut(map(
            delimited(
                multispace0,
                opt(terminated(
                    separated_list1(
                        tuple((multispace0, char(','), multispace0)),
                        property_pair,
                    ),
                    opt(pair(multispace0, char(','))),
                )),
                pair(multispace0, char('}')),
            ),
            |pairs| PropertyBlock {
                pairs: pairs.unwrap_or_default(),
            },
        )),
    )(input)
}

fn node_ref(input: &str) -> IResult<&str, NodeRef> {
    map(
        pair(identifier, opt(preceded(space0, property_block))),
        |(label, properties)| NodeRef { label, properties },
    )(input)
}

fn statement(input: &str) -> IResult<&str, Statement> {
    map(
        pair(cname, many0(preceded(space0, node_ref))),
        |(keyword, nodes)| Statement {
            kind: StatementKind::from_keyword(keyword),
            nodes,
        },
    )(input)
}
