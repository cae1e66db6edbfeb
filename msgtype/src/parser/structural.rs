use std::mem;
use std::ops::Range;

use crate::parser::error::ParseError;
use crate::parser::line::split_expression;
use crate::schema::field::{ArraySpec, FieldType};
use crate::schema::{CommentBlock, Element, Entry, TypeDefinition, WhitespaceBlock};

// ---------------------------------------------------------------------------
// Line cursor
// ---------------------------------------------------------------------------

/// A classified source line.
struct Line<'a> {
    /// 1-based line number.
    number: usize,
    /// Byte span of the line within the source.
    span: Range<usize>,
    tokens: Vec<&'a str>,
    comment: &'a str,
}

impl Line<'_> {
    fn owned_tokens(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.to_string()).collect()
    }
}

/// Strictly forward reader over the source text, classifying one line at a
/// time. Never rewinds.
struct LineCursor<'a> {
    source: &'a str,
    offset: usize,
    number: usize,
}

impl<'a> LineCursor<'a> {
    fn new(source: &'a str) -> Self {
        LineCursor {
            source,
            offset: 0,
            number: 0,
        }
    }
}

impl<'a> Iterator for LineCursor<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Line<'a>> {
        if self.offset >= self.source.len() {
            return None;
        }
        let rest = &self.source[self.offset..];
        let (text, advance) = match rest.find('\n') {
            Some(pos) => (&rest[..pos], pos + 1),
            None => (rest, rest.len()),
        };
        let span = self.offset..self.offset + text.len();
        self.offset += advance;
        self.number += 1;
        let (tokens, comment) = split_expression(text);
        Some(Line {
            number: self.number,
            span,
            tokens,
            comment,
        })
    }
}

// ---------------------------------------------------------------------------
// Element iterator
// ---------------------------------------------------------------------------

/// Pull-based state machine producing the top-level element sequence.
///
/// At most one classified line is buffered: the line that terminated an
/// entry run is re-examined as a fresh top-level line on the next pull,
/// never discarded.
pub struct Elements<'a> {
    lines: LineCursor<'a>,
    lookahead: Option<Line<'a>>,
    /// Pending run of blank lines.
    blank_lines: usize,
    /// Pending run of comment lines.
    comments: Vec<String>,
    state: State,
    file_id: usize,
}

enum State {
    /// Outside any type body.
    Scanning,
    /// Collecting entries for the open type definition.
    Entries(TypeDefinition),
    /// Input exhausted, or a fatal error was already reported.
    Finished,
}

impl<'a> Elements<'a> {
    pub(crate) fn new(source: &'a str, file_id: usize) -> Self {
        Elements {
            lines: LineCursor::new(source),
            lookahead: None,
            blank_lines: 0,
            comments: Vec::new(),
            state: State::Scanning,
            file_id,
        }
    }

    fn take_line(&mut self) -> Option<Line<'a>> {
        self.lookahead.take().or_else(|| self.lines.next())
    }

    /// Close the pending whitespace run, if any.
    fn flush_whitespace(&mut self) -> Option<Element> {
        if self.blank_lines == 0 {
            return None;
        }
        let nb_lines = mem::take(&mut self.blank_lines);
        Some(Element::Whitespace(WhitespaceBlock { nb_lines }))
    }

    /// Close the pending comment run, if any.
    fn flush_comments(&mut self) -> Option<Element> {
        if self.comments.is_empty() {
            return None;
        }
        let comments = mem::take(&mut self.comments);
        Some(Element::Comment(CommentBlock { comments }))
    }
}

impl Iterator for Elements<'_> {
    type Item = Result<Element, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match mem::replace(&mut self.state, State::Finished) {
                State::Finished => return None,

                State::Scanning => {
                    let Some(line) = self.take_line() else {
                        // Input exhausted: emit whatever run is still
                        // pending, then end the sequence normally.
                        if let Some(element) =
                            self.flush_whitespace().or_else(|| self.flush_comments())
                        {
                            self.state = State::Scanning;
                            return Some(Ok(element));
                        }
                        return None;
                    };

                    if line.tokens.is_empty() {
                        // Blank or comment-only line: extend one run, the
                        // other run (if pending) closes here.
                        let flushed = if line.comment.is_empty() {
                            let element = self.flush_comments();
                            self.blank_lines += 1;
                            element
                        } else {
                            let element = self.flush_whitespace();
                            self.comments.push(line.comment.to_string());
                            element
                        };
                        self.state = State::Scanning;
                        if let Some(element) = flushed {
                            return Some(Ok(element));
                        }
                        continue;
                    }

                    // Code line: a pending whitespace run closes before it.
                    // Buffer the line so it is classified on the next pull.
                    if let Some(element) = self.flush_whitespace() {
                        self.lookahead = Some(line);
                        self.state = State::Scanning;
                        return Some(Ok(element));
                    }

                    match type_header(&line.tokens) {
                        Some(name) => {
                            let mut docstring = mem::take(&mut self.comments);
                            if !line.comment.is_empty() {
                                docstring.push(line.comment.to_string());
                            }
                            self.state = State::Entries(TypeDefinition {
                                typename: name.to_string(),
                                docstring,
                                entries: Vec::new(),
                            });
                        }
                        None => {
                            return Some(Err(ParseError::unrecognized_line(
                                line.number,
                                line.owned_tokens(),
                                line.span,
                                self.file_id,
                            )
                            .with_note("expected a 'name:' type header")));
                        }
                    }
                }

                State::Entries(mut def) => {
                    let Some(line) = self.take_line() else {
                        // End of input closes the open definition normally,
                        // even with a partially-filled entry list.
                        return Some(Ok(Element::Type(def)));
                    };
                    if is_entry(&line.tokens) {
                        match parse_entry(&line, self.file_id) {
                            Ok(entry) => {
                                def.entries.push(entry);
                                self.state = State::Entries(def);
                            }
                            Err(err) => return Some(Err(err)),
                        }
                    } else {
                        // Anything else closes the definition; the line is
                        // re-examined as a fresh top-level line.
                        self.lookahead = Some(line);
                        self.state = State::Scanning;
                        return Some(Ok(Element::Type(def)));
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Expression classification
// ---------------------------------------------------------------------------

/// A type header is a single token ending in `:`; returns the bare name.
fn type_header<'a>(tokens: &[&'a str]) -> Option<&'a str> {
    match tokens {
        [only] => only.strip_suffix(':'),
        _ => None,
    }
}

/// An entry line is exactly `type name`, where the type token carries no `:`.
fn is_entry(tokens: &[&str]) -> bool {
    matches!(tokens, [ty, _] if !ty.contains(':'))
}

fn parse_entry(line: &Line<'_>, file_id: usize) -> Result<Entry, ParseError> {
    let field_type = parse_field_type(line.tokens[0]).ok_or_else(|| {
        malformed(line, file_id, "string length must be an unsigned integer")
    })?;
    let (name, array) = parse_field_name(line.tokens[1])
        .ok_or_else(|| malformed(line, file_id, "array capacity must be a positive integer"))?;
    Ok(Entry {
        field_type,
        name: name.to_string(),
        docstring: line.comment.to_string(),
        array,
    })
}

fn malformed(line: &Line<'_>, file_id: usize, note: &str) -> ParseError {
    ParseError::unrecognized_line(line.number, line.owned_tokens(), line.span.clone(), file_id)
        .with_note(note)
}

/// `string(N)` denotes the string base type with `str_len = N`; any other
/// token is a primitive tag or a reference to another type definition.
fn parse_field_type(token: &str) -> Option<FieldType> {
    if let Some(inner) = token.strip_prefix("string(") {
        let len = inner.strip_suffix(')')?.parse().ok()?;
        return Some(FieldType::String { len });
    }
    Some(match token {
        "int32" => FieldType::Int32,
        "float32" => FieldType::Float32,
        _ => FieldType::Custom(token.to_string()),
    })
}

/// Split an optional array suffix off a field name. `name[N]` is a fixed
/// array; `name[<=N]` and `name[<N]` are dynamic arrays with inclusive and
/// exclusive capacity bounds.
fn parse_field_name(token: &str) -> Option<(&str, Option<ArraySpec>)> {
    if !token.ends_with(']') {
        return Some((token, None));
    }
    let (name, suffix) = token.split_once('[')?;
    let bound = suffix.strip_suffix(']')?;
    let spec = if let Some(n) = bound.strip_prefix("<=") {
        ArraySpec::Dynamic(n.parse().ok()?)
    } else if let Some(n) = bound.strip_prefix('<') {
        let exclusive: u32 = n.parse().ok()?;
        ArraySpec::Dynamic(exclusive.checked_sub(1)?)
    } else {
        ArraySpec::Fixed(bound.parse().ok()?)
    };
    Some((name, Some(spec)))
}
