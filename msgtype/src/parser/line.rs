/// Split one raw line into its whitespace-delimited tokens and its trailing
/// comment.
///
/// The comment is everything after the first `#`, right-trimmed; its leading
/// space, if any, is preserved (`# text` carries the body ` text`, `#text`
/// carries `text`). A line without `#` yields an empty comment, and a blank
/// line yields no tokens.
pub(crate) fn split_expression(line: &str) -> (Vec<&str>, &str) {
    match line.split_once('#') {
        Some((code, comment)) => (code.split_whitespace().collect(), comment.trim_end()),
        None => (line.split_whitespace().collect(), ""),
    }
}
