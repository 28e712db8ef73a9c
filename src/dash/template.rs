const REPRESENTATION_ID: &str = "RepresentationID";
const NUMBER: &str = "Number";
/// Widths beyond this are treated as literal text.
const MAX_NUMBER_WIDTH: usize = 20;

/// Expands `$RepresentationID$`, `$Number$`, `$Number%0Nd$` and `$$`.
///
/// Unknown identifiers, and `$Number...$` when no number is given, are kept
/// verbatim.
#[must_use]
pub fn render_segment_template(
    template: &str,
    representation_id: &str,
    number: Option<u64>,
) -> String {
    let mut rest = template;
    let mut output = String::with_capacity(template.len());

    loop {
        let start = match rest.find('$') {
            Some(start) => start,
            None => {
                output.push_str(rest);
                break;
            }
        };
        let (before, after_start) = rest.split_at(start);
        output.push_str(before);
        let after = match after_start.strip_prefix('$') {
            Some(after) => after,
            None => {
                output.push_str(after_start);
                break;
            }
        };
        let end = match after.find('$') {
            Some(end) => end,
            None => {
                output.push('$');
                output.push_str(after);
                break;
            }
        };
        let (identifier, after_end) = after.split_at(end);
        match substitute(identifier, representation_id, number) {
            Some(value) => output.push_str(&value),
            None => {
                output.push('$');
                output.push_str(identifier);
                output.push('$');
            }
        }
        rest = match after_end.strip_prefix('$') {
            Some(remaining) => remaining,
            None => {
                output.push_str(after_end);
                break;
            }
        };
    }

    output
}

fn substitute(identifier: &str, representation_id: &str, number: Option<u64>) -> Option<String> {
    if identifier.is_empty() {
        return Some("$".to_owned());
    }
    if identifier == REPRESENTATION_ID {
        return Some(representation_id.to_owned());
    }
    let format_tag = identifier.strip_prefix(NUMBER)?;
    let number = number?;
    if format_tag.is_empty() {
        return Some(number.to_string());
    }
    let width = number_width(format_tag)?;
    Some(format!("{:0width$}", number, width = width))
}

fn number_width(format_tag: &str) -> Option<usize> {
    let digits = format_tag.strip_prefix('%')?.strip_suffix('d')?;
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    let width = digits.parse::<usize>().ok()?;
    (width <= MAX_NUMBER_WIDTH).then_some(width)
}
