//! Positional label templates: `{arg[N]}` is replaced by the N-th
//! whitespace-separated token of the block argument.

const OPEN: &str = "{arg[";
const CLOSE: &str = "]}";

/// One piece of a parsed template.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Part<'a> {
    Literal(&'a str),
    Arg(usize),
}

fn parts(template: &str) -> Vec<Part<'_>> {
    let mut out = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find(OPEN) {
        let after = &rest[open + OPEN.len()..];
        let Some(close) = after.find(CLOSE) else {
            break;
        };
        let Ok(index) = after[..close].parse::<usize>() else {
            out.push(Part::Literal(&rest[..open + OPEN.len()]));
            rest = after;
            continue;
        };
        if open > 0 {
            out.push(Part::Literal(&rest[..open]));
        }
        out.push(Part::Arg(index));
        rest = &after[close + CLOSE.len()..];
    }
    if !rest.is_empty() {
        out.push(Part::Literal(rest));
    }
    out
}

/// Number of argument tokens `template` needs: one past its highest index.
pub fn arity(template: &str) -> usize {
    parts(template)
        .into_iter()
        .filter_map(|p| match p {
            Part::Arg(i) => Some(i + 1),
            Part::Literal(_) => None,
        })
        .max()
        .unwrap_or(0)
}

/// Substitute `args` into `template`. Indices past the end of `args`
/// render as nothing; callers check [`arity`] up front.
pub fn render(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    for part in parts(template) {
        match part {
            Part::Literal(s) => out.push_str(s),
            Part::Arg(i) => out.push_str(args.get(i).map_or("", String::as_str)),
        }
    }
    out
}
