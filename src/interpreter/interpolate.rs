use crate::variables::Variables;

/// Replaces every `{name}` reference in `template` with the bound variable.
///
/// Single left-to-right pass. Unbound references and a `{` without a closing
/// brace are kept as literal text; substituted values are never rescanned.
pub fn interpolate(template: &str, variables: &Variables) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('}') else {
            output.push_str(&rest[open..]);
            return output;
        };

        let name = &after_open[..close];
        match variables.get(name) {
            Some(value) => output.push_str(&value.to_string()),
            None => output.push_str(&rest[open..open + close + 2]),
        }
        rest = &after_open[close + 1..];
    }

    output.push_str(rest);
    output
}
