use winnow::ascii::{space0, space1, till_line_ending};
use winnow::combinator::{alt, cut_err, opt, preceded, repeat, terminated};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, none_of, one_of, take_while};

use super::error::DefinitionError;

/// What a definition line declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Formula { system: bool },
    Item { system: bool },
}

/// One parsed definition line. The body is left as raw text for the
/// expression parser.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Declaration<'i> {
    pub kind: Kind,
    pub id: &'i str,
    pub label: Option<String>,
    pub body: &'i str,
}

// -- Identifiers ------------------------------------------------------------

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)
}

// -- Labels -----------------------------------------------------------------

fn escaped(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        other => other,
    }
}

fn string_literal(input: &mut &str) -> ModalResult<String> {
    preceded(
        '"',
        cut_err(terminated(
            repeat(
                0..,
                alt((preceded('\\', any).map(escaped), none_of(['"', '\\']))),
            )
            .fold(String::new, |mut s, c| {
                s.push(c);
                s
            }),
            '"',
        ))
        .context(StrContext::Expected(StrContextValue::CharLiteral('"'))),
    )
    .parse_next(input)
}

// -- Declarations -----------------------------------------------------------

fn kind(input: &mut &str) -> ModalResult<Kind> {
    (
        opt(terminated("system", space1)),
        alt((
            terminated("formula", space1).value(true),
            terminated("item", space1).value(false),
        )),
    )
        .map(|(system, formula): (Option<&str>, bool)| {
            let system = system.is_some();
            if formula {
                Kind::Formula { system }
            } else {
                Kind::Item { system }
            }
        })
        .context(StrContext::Expected(StrContextValue::Description(
            "'formula' or 'item'",
        )))
        .parse_next(input)
}

fn declaration<'i>(input: &mut &'i str) -> ModalResult<Declaration<'i>> {
    (
        preceded(space0, cut_err(kind)),
        cut_err(ident).context(StrContext::Expected(StrContextValue::Description(
            "identifier",
        ))),
        preceded(space0, opt(terminated(string_literal, space0))),
        preceded(
            cut_err(':').context(StrContext::Expected(StrContextValue::CharLiteral(':'))),
            till_line_ending,
        ),
    )
        .map(|(kind, id, label, rest): (Kind, &'i str, Option<String>, &'i str)| {
            let body = rest.split('#').next().unwrap_or_default().trim();
            Declaration {
                kind,
                id,
                label,
                body,
            }
        })
        .parse_next(input)
}

// -- Entry points -----------------------------------------------------------

/// Parse one line of a definition file. Blank lines and `#` comments
/// yield `None`.
pub(crate) fn parse_line(
    line: &str,
    number: usize,
) -> Result<Option<Declaration<'_>>, DefinitionError> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    declaration
        .parse(line)
        .map(Some)
        .map_err(|e| DefinitionError::Syntax {
            line: number,
            column: e.offset() + 1,
            message: e.inner().to_string(),
        })
}

/// The formula id of an item body of the form `formula <id>`.
pub(crate) fn formula_reference(body: &str) -> Option<&str> {
    preceded(("formula", space1), ident).parse(body).ok()
}
