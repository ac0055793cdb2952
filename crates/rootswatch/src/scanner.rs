//! `:root` custom-property scanning.
//!
//! # Design
//!
//! This is not a general CSS parser. It answers one question: which custom
//! properties does the stylesheet's first top-level `:root` rule declare?
//!
//! Parsing happens in two passes:
//!
//! 1. A lexical check rejects text that is not syntactically valid CSS
//!    (unbalanced brackets, unterminated strings or comments). `cssparser`
//!    follows the CSS error-recovery rules and would silently close a block at
//!    end of input, so this pass is what makes malformed input an error.
//! 2. The rule list is walked with `cssparser` (the tokenizer used by Firefox),
//!    which handles comments, escapes and nested blocks for us.
//!
//! ## Rules
//!
//! - The selector text of a rule must be exactly `:root` after trimming.
//!   `html:root`, `:root, body` and `:ROOT` do not match.
//! - Only the first matching rule is read; later `:root` rules are ignored.
//! - At-rules are skipped whole, so a `:root` nested in `@media` never counts.
//! - Only declarations named `--*` are emitted, with the `--` marker removed.
//! - Values are the declared source text, trimmed, without a trailing
//!   `!important`. Nothing is validated or normalized.
//!
//! # Example
//!
//! ```css
//! :root {
//!     --accent: #ff0000;
//!     --theme-accent: "Accent";
//!     color: black; /* not a custom property, ignored */
//! }
//! ```
//!
//! yields `accent = #ff0000` and `theme-accent = "Accent"`.

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, Token,
};
use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// Selector that marks the block to scan.
pub const ROOT_SELECTOR: &str = ":root";

/// Prefix of a CSS custom-property name.
pub const CUSTOM_PROPERTY_MARKER: &str = "--";

/// A custom property found in the `:root` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDeclaration {
    /// Property name without the leading `--`.
    pub name: String,
    /// Declared value as written.
    pub value: String,
}

impl RawDeclaration {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Scans stylesheet text and returns the first `:root` block's custom
/// properties in document order.
///
/// Repeated names are all returned; consumers apply last-wins semantics.
/// A stylesheet without a `:root` rule yields an empty list.
pub fn scan(css: &str) -> Result<Vec<RawDeclaration>, ScanError> {
    check_syntax(css)?;

    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);

    let mut root_parser = RootRuleParser { declarations: None };
    let rule_list_parser = cssparser::StyleSheetParser::new(&mut parser, &mut root_parser);

    for result in rule_list_parser {
        if let Err((e, slice)) = result {
            return Err(ScanError::new(
                e.location.line + 1,
                e.location.column,
                format!("invalid rule {:?}: {:?}", slice.trim(), e.kind),
            ));
        }
    }

    Ok(root_parser.declarations.unwrap_or_default())
}

struct RootRuleParser {
    /// `Some` once the first `:root` block has been read.
    declarations: Option<Vec<RawDeclaration>>,
}

impl<'i> QualifiedRuleParser<'i> for RootRuleParser {
    type Prelude = String;
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let mut tokens = Vec::new();
        while let Ok(token) = input.next_including_whitespace_and_comments() {
            if !matches!(token, Token::Comment(_)) {
                tokens.push(token.clone());
            }
        }
        Ok(selector_text(&tokens))
    }

    fn parse_block<'t>(
        &mut self,
        selector: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        if selector != ROOT_SELECTOR || self.declarations.is_some() {
            skip_remaining(input);
            return Ok(());
        }

        let mut decl_parser = CustomPropertyParser;
        let body = RuleBodyParser::new(input, &mut decl_parser);

        // Non-custom and malformed declarations come back as errors; skip them.
        self.declarations = Some(body.flatten().collect());
        Ok(())
    }
}

impl<'i> AtRuleParser<'i> for RootRuleParser {
    type Prelude = ();
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        _name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        skip_remaining(input);
        Ok(())
    }

    fn rule_without_block(
        &mut self,
        _prelude: Self::Prelude,
        _start: &ParserState,
    ) -> Result<Self::AtRule, ()> {
        Ok(())
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        skip_remaining(input);
        Ok(())
    }
}

struct CustomPropertyParser;

impl<'i> DeclarationParser<'i> for CustomPropertyParser {
    type Declaration = RawDeclaration;
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let Some(name) = name.as_ref().strip_prefix(CUSTOM_PROPERTY_MARKER) else {
            return Err(input.new_custom_error::<(), ()>(()));
        };
        let name = name.to_string();
        let value = read_value(input)?;
        Ok(RawDeclaration { name, value })
    }
}

impl<'i> AtRuleParser<'i> for CustomPropertyParser {
    type Prelude = ();
    type AtRule = RawDeclaration;
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for CustomPropertyParser {
    type Prelude = ();
    type QualifiedRule = RawDeclaration;
    type Error = ();
}

impl<'i> RuleBodyItemParser<'i, RawDeclaration, ()> for CustomPropertyParser {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Reads a declaration value as source text, stopping before `!important`.
///
/// The whole input is consumed either way; the enclosing parser requires it.
fn read_value<'i, 't>(input: &mut Parser<'i, 't>) -> Result<String, ParseError<'i, ()>> {
    let mut start = None;
    let mut end = input.position();
    let mut important = false;

    loop {
        let before = input.position();
        let token = match input.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        if important || matches!(token, Token::WhiteSpace(_) | Token::Comment(_)) {
            continue;
        }
        if token == Token::Delim('!')
            && input
                .try_parse(|i| i.expect_ident_matching("important"))
                .is_ok()
        {
            important = true;
            continue;
        }
        start.get_or_insert(before);
        match token {
            Token::Function(_)
            | Token::ParenthesisBlock
            | Token::SquareBracketBlock
            | Token::CurlyBracketBlock => {
                input.parse_nested_block(|nested| {
                    skip_remaining(nested);
                    Ok::<(), ParseError<'i, ()>>(())
                })?;
                end = input.position();
            }
            _ => end = input.position(),
        }
    }

    match start {
        Some(start) => Ok(input.slice(start..end).trim().to_string()),
        None => Ok(String::new()),
    }
}

/// Rebuilds a selector from its tokens with comments removed.
///
/// Only the tokens that can spell `:root` are rendered; any other selector
/// collapses to text that never matches.
fn selector_text(tokens: &[Token<'_>]) -> String {
    let trimmed = {
        let is_space = |t: &Token<'_>| matches!(t, Token::WhiteSpace(_));
        let start = tokens.iter().position(|t| !is_space(t)).unwrap_or(tokens.len());
        let end = tokens.iter().rposition(|t| !is_space(t)).map_or(start, |i| i + 1);
        &tokens[start..end]
    };
    match trimmed {
        [Token::Colon, Token::Ident(name)] => format!(":{}", &**name),
        _ => String::from("*"),
    }
}

fn skip_remaining(input: &mut Parser<'_, '_>) {
    while input.next().is_ok() {}
}

/// Rejects text with unbalanced brackets or unterminated strings/comments.
fn check_syntax(css: &str) -> Result<(), ScanError> {
    let mut open: Vec<(char, u32, u32)> = Vec::new();
    let mut chars = css.chars().peekable();
    let (mut line, mut column) = (1u32, 0u32);

    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
            column = 0;
        } else {
            column += 1;
        }
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    if escaped == '\n' {
                        line += 1;
                        column = 0;
                    } else {
                        column += 1;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                let (start_line, start_column) = (line, column);
                chars.next();
                column += 1;
                let mut prev = '\0';
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                        column = 0;
                    } else {
                        column += 1;
                    }
                    if prev == '*' && c == '/' {
                        closed = true;
                        break;
                    }
                    prev = c;
                }
                if !closed {
                    return Err(ScanError::new(
                        start_line,
                        start_column,
                        "unterminated comment",
                    ));
                }
            }
            '"' | '\'' => {
                let quote = c;
                let (start_line, start_column) = (line, column);
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => {
                            column += 1;
                            if let Some(escaped) = chars.next() {
                                if escaped == '\n' {
                                    line += 1;
                                    column = 0;
                                } else {
                                    column += 1;
                                }
                            }
                        }
                        '\n' => break,
                        c if c == quote => {
                            column += 1;
                            closed = true;
                            break;
                        }
                        _ => column += 1,
                    }
                }
                if !closed {
                    return Err(ScanError::new(
                        start_line,
                        start_column,
                        "unterminated string",
                    ));
                }
            }
            '{' | '(' | '[' => open.push((c, line, column)),
            '}' | ')' | ']' => {
                let expected = match c {
                    '}' => '{',
                    ')' => '(',
                    _ => '[',
                };
                match open.pop() {
                    Some((opener, _, _)) if opener == expected => {}
                    Some((opener, open_line, open_column)) => {
                        return Err(ScanError::new(
                            line,
                            column,
                            format!(
                                "unexpected '{c}', '{opener}' opened at line {open_line}, column {open_column} is still open"
                            ),
                        ));
                    }
                    None => {
                        return Err(ScanError::new(line, column, format!("unexpected '{c}'")));
                    }
                }
            }
            _ => {}
        }
    }

    match open.pop() {
        Some((opener, open_line, open_column)) => Err(ScanError::new(
            open_line,
            open_column,
            format!("unclosed '{opener}'"),
        )),
        None => Ok(()),
    }
}
