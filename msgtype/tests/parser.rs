use msgtype::parser::{ParseError, Parser};
use msgtype::schema::field::{ArraySpec, FieldType};
use msgtype::schema::{CommentBlock, Element, Entry, TypeDefinition, WhitespaceBlock};

fn parse(source: &str) -> Vec<Element> {
    Parser::new(source.to_string(), 0)
        .parse()
        .expect("parse failed")
        .elements
}

fn parse_err(source: &str) -> ParseError {
    match Parser::new(source.to_string(), 0).parse() {
        Ok(schema) => panic!("expected parse error, got {:?}", schema.elements),
        Err(err) => err,
    }
}

fn only_type(source: &str) -> TypeDefinition {
    let mut elements = parse(source);
    assert_eq!(elements.len(), 1, "expected a single element: {:?}", elements);
    match elements.remove(0) {
        Element::Type(def) => def,
        other => panic!("expected a type definition, got {:?}", other),
    }
}

fn scalar(field_type: FieldType, name: &str) -> Entry {
    Entry {
        field_type,
        name: name.to_string(),
        docstring: String::new(),
        array: None,
    }
}

#[test]
fn empty_input_yields_nothing() {
    assert_eq!(parse(""), vec![]);
}

#[test]
fn blank_lines_coalesce_into_one_whitespace_block() {
    assert_eq!(
        parse("\n\n\n"),
        vec![Element::Whitespace(WhitespaceBlock { nb_lines: 3 })]
    );
}

#[test]
fn comment_flushes_pending_whitespace() {
    assert_eq!(
        parse("\n\n# hi\n"),
        vec![
            Element::Whitespace(WhitespaceBlock { nb_lines: 2 }),
            Element::Comment(CommentBlock {
                comments: vec![" hi".to_string()],
            }),
        ]
    );
}

#[test]
fn blank_line_flushes_pending_comment_block() {
    assert_eq!(
        parse("# a\n# b\n\n# c\n"),
        vec![
            Element::Comment(CommentBlock {
                comments: vec![" a".to_string(), " b".to_string()],
            }),
            Element::Whitespace(WhitespaceBlock { nb_lines: 1 }),
            Element::Comment(CommentBlock {
                comments: vec![" c".to_string()],
            }),
        ]
    );
}

#[test]
fn comment_leading_space_is_preserved() {
    assert_eq!(
        parse("# text\n#text\n"),
        vec![Element::Comment(CommentBlock {
            comments: vec![" text".to_string(), "text".to_string()],
        })]
    );
}

#[test]
fn lone_hash_counts_as_blank_line() {
    assert_eq!(
        parse("#\n#\n"),
        vec![Element::Whitespace(WhitespaceBlock { nb_lines: 2 })]
    );
}

#[test]
fn simple_type() {
    assert_eq!(
        only_type("simple:\n    int32 x"),
        TypeDefinition {
            typename: "simple".to_string(),
            docstring: vec![],
            entries: vec![scalar(FieldType::Int32, "x")],
        }
    );
}

#[test]
fn type_with_no_entries() {
    assert_eq!(
        only_type("empty:"),
        TypeDefinition {
            typename: "empty".to_string(),
            docstring: vec![],
            entries: vec![],
        }
    );
}

#[test]
fn fixed_array_entry() {
    let def = only_type("points:\n    float arr[10]");
    let entry = &def.entries[0];
    assert_eq!(entry.field_type, FieldType::Custom("float".to_string()));
    assert_eq!(entry.array, Some(ArraySpec::Fixed(10)));
    assert_eq!(entry.array_sz(), Some(10));
    assert!(!entry.is_dynamic());
}

#[test]
fn dynamic_array_inclusive_bound() {
    let def = only_type("t:\n    int32 y[<=5]");
    assert_eq!(def.entries[0].array, Some(ArraySpec::Dynamic(5)));
}

#[test]
fn dynamic_array_exclusive_bound() {
    let def = only_type("t:\n    int32 y[<5]");
    assert_eq!(def.entries[0].array, Some(ArraySpec::Dynamic(4)));
}

#[test]
fn string_entry_carries_length() {
    let def = only_type("t:\n    string(10) str");
    assert_eq!(
        def.entries[0],
        scalar(FieldType::String { len: 10 }, "str")
    );
}

#[test]
fn bare_string_token_is_a_custom_type() {
    let def = only_type("t:\n    string s");
    assert_eq!(def.entries[0].field_type, FieldType::Custom("string".to_string()));
}

#[test]
fn docstrings_attach_to_type_and_entries() {
    let def = only_type("# position in the world frame\npose:   # 2D pose\n    float32 x  # meters\n");
    assert_eq!(
        def.docstring,
        vec![" position in the world frame".to_string(), " 2D pose".to_string()]
    );
    assert_eq!(def.entries[0].docstring, " meters".to_string());
}

#[test]
fn blank_line_closes_type_and_starts_whitespace_run() {
    let elements = parse("a:\n    int32 x\n\nb:\n    int32 y\n");
    assert_eq!(elements.len(), 3);
    assert!(matches!(&elements[0], Element::Type(def) if def.typename == "a"));
    assert_eq!(
        elements[1],
        Element::Whitespace(WhitespaceBlock { nb_lines: 1 })
    );
    assert!(matches!(&elements[2], Element::Type(def) if def.typename == "b"));
}

#[test]
fn comment_line_closes_type_and_starts_comment_run() {
    let elements = parse("a:\n    int32 x\n# note\n");
    assert_eq!(elements.len(), 2);
    assert_eq!(
        elements[1],
        Element::Comment(CommentBlock {
            comments: vec![" note".to_string()],
        })
    );
}

#[test]
fn end_of_input_mid_body_yields_partial_type() {
    let def = only_type("partial:\n    int32 x\n    float32 y");
    assert_eq!(def.entries.len(), 2);
}

#[test]
fn unrecognized_line_reports_number_and_tokens() {
    let err = parse_err("foo bar baz");
    assert_eq!(err.line, 1);
    assert_eq!(err.tokens, vec!["foo", "bar", "baz"]);
    assert!(err.message.contains("line 1"));
}

#[test]
fn line_closing_a_type_is_reexamined_where_it_stands() {
    let err = parse_err("a:\n    int32 x\nfoo bar baz\n");
    assert_eq!(err.line, 3);
}

#[test]
fn entry_type_token_with_colon_is_not_an_entry() {
    let err = parse_err("a:\n    int32 x\nb: c\n");
    assert_eq!(err.line, 3);
}

#[test]
fn malformed_array_capacity_is_fatal() {
    let err = parse_err("t:\n    int32 x[abc]");
    assert_eq!(err.line, 2);
}

#[test]
fn malformed_string_length_is_fatal() {
    let err = parse_err("t:\n    string(x) s");
    assert_eq!(err.line, 2);
}

#[test]
fn exclusive_bound_of_zero_is_fatal() {
    let err = parse_err("t:\n    int32 x[<0]");
    assert_eq!(err.line, 2);
}

#[test]
fn element_iterator_ends_after_exhaustion() {
    let parser = Parser::new("x:\n    int32 a".to_string(), 0);
    let mut elements = parser.elements();
    assert!(matches!(elements.next(), Some(Ok(Element::Type(_)))));
    assert!(elements.next().is_none());
    assert!(elements.next().is_none());
}

#[test]
fn element_iterator_ends_after_fatal_error() {
    let parser = Parser::new("???".to_string(), 0);
    let mut elements = parser.elements();
    assert!(matches!(elements.next(), Some(Err(_))));
    assert!(elements.next().is_none());
}

#[test]
fn elements_are_yielded_lazily() {
    // The first type is available before the bad line is reached.
    let parser = Parser::new("a:\n    int32 x\n\nfoo bar baz\n".to_string(), 0);
    let mut elements = parser.elements();
    assert!(matches!(elements.next(), Some(Ok(Element::Type(_)))));
    assert!(matches!(elements.next(), Some(Ok(Element::Whitespace(_)))));
    assert!(matches!(elements.next(), Some(Err(_))));
    assert!(elements.next().is_none());
}

#[test]
fn crlf_input_parses_cleanly() {
    let def = only_type("t:\r\n    int32 x\r\n");
    assert_eq!(def.entries[0], scalar(FieldType::Int32, "x"));
}
