use std::fmt;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

pub(super) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub(super) fn write_escaped_text(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write_escaped(f, s, false)
}

pub(super) fn write_escaped_attr(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write_escaped(f, s, true)
}

fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str, in_attr: bool) -> fmt::Result {
    let mut last = 0;
    for (i, c) in s.char_indices() {
        let replacement = match c {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            '"' if in_attr => "&quot;",
            _ => continue,
        };
        f.write_str(&s[last..i])?;
        f.write_str(replacement)?;
        last = i + c.len_utf8();
    }
    f.write_str(&s[last..])
}
