//! Decoding of quoted literals.
//!
//! Single-line strings follow JSON string rules, so a `'...'` literal matches
//! the string token but never decodes. Triple-quoted strings are not
//! unescaped; instead their line breaks and indentation collapse into single
//! spaces so a wrapped paragraph reads as one line of prose.

const TRIPLE_QUOTE: &str = "\"\"\"";

/// Decode a `"..."` literal, quotes included.
pub fn decode_string(lexeme: &str) -> Result<String, serde_json::Error> {
    serde_json::from_str(lexeme)
}

fn is_indent(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

/// Collapse a `"""..."""` literal, quotes included.
///
/// The indentation of the first line break sets how much leading
/// whitespace each following line break swallows; every break, along with
/// the whitespace before it, becomes one space. The result is trimmed.
pub fn dedent_multiline(lexeme: &str) -> String {
    let contents = lexeme
        .strip_prefix(TRIPLE_QUOTE)
        .and_then(|s| s.strip_suffix(TRIPLE_QUOTE))
        .unwrap_or(lexeme);

    let width = contents
        .find('\n')
        .map_or(0, |i| contents[i + 1..].chars().take_while(|c| is_indent(*c)).count());

    collapse_line_breaks(contents, width).trim().to_string()
}

/// Replace each whitespace run holding a line break, up to its last break
/// plus at most `width` indent characters, with one space.
fn collapse_line_breaks(contents: &str, width: usize) -> String {
    let mut collapsed = String::with_capacity(contents.len());
    let mut rest = contents;

    while let Some(start) = rest.find(char::is_whitespace) {
        collapsed.push_str(&rest[..start]);
        let tail = &rest[start..];
        let run_len = tail.find(|c: char| !c.is_whitespace()).unwrap_or(tail.len());
        let run = &tail[..run_len];

        match run.rfind('\n') {
            Some(newline) => {
                let after = &run[newline + 1..];
                // Indent characters are ASCII, so the count is a byte offset
                let indent = after.chars().take_while(|c| is_indent(*c)).take(width).count();
                collapsed.push(' ');
                collapsed.push_str(&after[indent..]);
            }
            None => collapsed.push_str(run),
        }
        rest = &tail[run_len..];
    }

    collapsed.push_str(rest);
    collapsed
}
