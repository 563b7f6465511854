//! `{{path}}` placeholders in display text.

use crate::collect::DataModelCollector;
use crate::parser::DataPathParser;

/// Shown in place of a placeholder whose path does not parse.
pub const PARSE_ERROR_PLACEHOLDER: &str = "<parse error>";

/// Replace every `{{path}}` in `text` with the display form of the values
/// the path matches, joined by `", "`.
///
/// Braces inside the placeholder may nest, so `{{{a,b}}}` holds the union
/// `{a,b}`. A placeholder that fails to parse renders as
/// [`PARSE_ERROR_PLACEHOLDER`]; an unclosed `{{` is kept as literal text.
pub fn fill_template(text: &str, collector: &DataModelCollector) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let body = &rest[open + 2..];
        let Some(close) = placeholder_end(body) else {
            out.push_str(&rest[open..]);
            return out;
        };
        let source = body[..close].trim();
        match DataPathParser::parse(source) {
            Ok(path) => {
                let rendered: Vec<String> = collector
                    .collect(&path)
                    .iter()
                    .map(|c| c.value.to_display_string())
                    .collect();
                out.push_str(&rendered.join(", "));
            }
            Err(err) => {
                tracing::warn!(%err, "template placeholder does not parse");
                out.push_str(PARSE_ERROR_PLACEHOLDER);
            }
        }
        rest = &body[close + 2..];
    }
    out.push_str(rest);
    out
}

/// Byte offset of the `}}` closing a placeholder body, skipping balanced
/// braces and quoted words.
fn placeholder_end(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if in_quotes => i += 1,
            b'"' => in_quotes = !in_quotes,
            _ if in_quotes => {}
            b'{' => depth += 1,
            b'}' if depth > 0 => depth -= 1,
            b'}' if bytes.get(i + 1) == Some(&b'}') => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use datapath_model::{unknown_to_data_model, ForwardPath};
    use serde_json::json;

    fn collector() -> DataModelCollector {
        DataModelCollector::new(unknown_to_data_model(&json!({
            "name": "Ada",
            "tags": ["x", "y"],
            "n": 3,
            "none": null,
            "obj": {"k": true}
        })))
    }

    #[test]
    fn fills_placeholders() {
        let c = collector();
        assert_eq!(fill_template("Hi {{name}}!", &c), "Hi Ada!");
        assert_eq!(fill_template("{{ tags/* }}", &c), "x, y");
        assert_eq!(fill_template("{{n}}/{{none}}/{{obj}}", &c), "3//{\"k\":true}");
        assert_eq!(fill_template("{{missing}}", &c), "");
        assert_eq!(fill_template("no placeholders", &c), "no placeholders");
    }

    #[test]
    fn union_braces_nest() {
        assert_eq!(fill_template("{{{name,n}}}", &collector()), "Ada, 3");
        assert_eq!(fill_template("{{\"}}\"}}", &collector()), "");
    }

    #[test]
    fn parse_errors_render_a_placeholder_and_continue() {
        let c = collector();
        assert_eq!(
            fill_template("{{a//b}} then {{name}}", &c),
            "<parse error> then Ada"
        );
    }

    #[test]
    fn unclosed_placeholder_is_literal() {
        assert_eq!(fill_template("a {{name", &collector()), "a {{name");
    }

    #[test]
    fn relative_to_origin() {
        let c = collector().with_origin(ForwardPath::from_words(["tags"]));
        assert_eq!(fill_template("{{1}} of {{../name}}", &c), "y of Ada");
    }
}
