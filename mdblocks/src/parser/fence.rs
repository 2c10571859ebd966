use std::ops::Range;

/// A `/// name | argument` header line.
#[derive(Debug, Clone, PartialEq)]
pub struct FenceHeader<'a> {
    pub slashes: usize,
    pub name: &'a str,
    pub argument: &'a str,
}

/// A line of `source` with its byte range (newline excluded).
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    pub text: &'a str,
    pub start: usize,
    /// Offset just past the line terminator.
    pub next: usize,
}

impl Line<'_> {
    pub fn span(&self) -> Range<usize> {
        self.start..self.start + self.text.len()
    }
}

/// Split `source[range]` into lines, keeping absolute byte offsets.
pub fn lines(source: &str, range: Range<usize>) -> Vec<Line<'_>> {
    let mut out = Vec::new();
    let mut pos = range.start;
    while pos < range.end {
        let rest = &source[pos..range.end];
        let (len, next) = match rest.find('\n') {
            Some(nl) => (nl, pos + nl + 1),
            None => (rest.len(), range.end),
        };
        let text = rest[..len].strip_suffix('\r').unwrap_or(&rest[..len]);
        out.push(Line {
            text,
            start: pos,
            next,
        });
        pos = next;
    }
    out
}

fn leading_slashes(line: &str) -> usize {
    line.bytes().take_while(|&b| b == b'/').count()
}

/// Parse a block header. Closing fences (slashes only) are not headers.
pub fn parse_header(line: &str) -> Option<FenceHeader<'_>> {
    let slashes = leading_slashes(line);
    if slashes < 3 {
        return None;
    }
    let rest = line[slashes..].trim();
    let (name, argument) = match rest.split_once('|') {
        Some((name, argument)) => (name.trim(), argument.trim()),
        None => (rest, ""),
    };
    let valid_name = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid_name {
        return None;
    }
    Some(FenceHeader {
        slashes,
        name,
        argument,
    })
}

/// True when `line` closes a block opened with `slashes` slashes.
pub fn is_closing(line: &str, slashes: usize) -> bool {
    let trimmed = line.trim_end();
    leading_slashes(trimmed) == slashes && trimmed.len() == slashes
}

/// Option lines directly follow the header and are indented by four spaces.
pub fn is_option_line(line: &str) -> bool {
    line.starts_with("    ") && !line.trim().is_empty()
}

/// Toggle detection for fenced code: ``` or ~~~ after up to three spaces.
pub fn is_code_fence(line: &str) -> bool {
    let trimmed = line.trim_start_matches(' ');
    line.len() - trimmed.len() <= 3 && (trimmed.starts_with("```") || trimmed.starts_with("~~~"))
}
