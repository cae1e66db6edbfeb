/// Render a comment block as C comment lines.
///
/// The doxygen variant (`/** ... */`) is used for docstrings destined for
/// generated documentation; plain blocks reproduce free-standing schema
/// comments. Single-line blocks close on the same line.
pub fn render_comment_block(comments: &[String], doxygen: bool) -> Vec<String> {
    let Some((first, rest)) = comments.split_first() else {
        return Vec::new();
    };
    let (start, continuation) = if doxygen {
        ("/**", " * ")
    } else {
        ("/*", " *")
    };
    let mut out = vec![format!("{}{}", start, first)];
    out.extend(rest.iter().map(|c| format!("{}{}", continuation, c)));
    if out.len() > 1 {
        out.push(" */".to_string());
    } else {
        out[0].push_str(" */");
    }
    out
}
