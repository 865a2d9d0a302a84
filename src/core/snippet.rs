use std::fmt::Write as _;

/// Renders one espanso match entry as a YAML list item.
///
/// A single trigger uses `trigger:`, several use an inline `triggers:` list.
/// Replacements containing a newline become a literal block (`|`) with every
/// line indented six spaces; everything else is a double-quoted scalar.
///
/// The block has no explicit indentation indicator, so a first line that
/// starts with spaces sets a deeper block indent than the lines after it and
/// the result is not valid YAML.
///
/// `triggers` must not be empty.
pub fn build_yaml_snippet(triggers: &[String], replace: &str) -> String {
    debug_assert!(!triggers.is_empty(), "snippet requires at least one trigger");

    let mut out = String::from("\n  - ");
    if let [trigger] = triggers {
        out.push_str("trigger: ");
        out.push_str(&quote_scalar(trigger));
        out.push('\n');
    } else {
        let quoted: Vec<String> = triggers.iter().map(|t| quote_scalar(t)).collect();
        out.push_str("triggers: [");
        out.push_str(&quoted.join(", "));
        out.push_str("]\n");
    }

    if replace.contains('\n') {
        out.push_str("    replace: |\n");
        for line in replace.split('\n') {
            out.push_str("      ");
            out.push_str(line);
            out.push('\n');
        }
    } else {
        out.push_str("    replace: ");
        out.push_str(&quote_scalar(replace));
        out.push('\n');
    }

    out
}

/// Quotes `value` as a YAML double-quoted scalar.
pub fn quote_scalar(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0b}' => out.push_str("\\v"),
            '\u{0c}' => out.push_str("\\f"),
            '\u{1b}' => out.push_str("\\e"),
            c if (c as u32) < 0x100 && c.is_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c if c.is_control() || c == '\u{feff}' => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
