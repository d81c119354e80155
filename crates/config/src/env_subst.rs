/// Replace `${ENV_VAR}` placeholders in a config file with values from the
/// process environment.
///
/// Unresolvable variables are left as-is so a missing secret shows up as a
/// validation error instead of silently becoming an empty string.
pub fn substitute_env(input: &str) -> String {
    substitute_with(input, |name| std::env::var(name).ok())
}

/// Same as [`substitute_env`] with an explicit variable lookup.
pub fn substitute_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            result.push(ch);
            continue;
        }
        chars.next(); // '{'
        let mut var_name = String::new();
        let mut closed = false;
        for c in chars.by_ref() {
            if c == '}' {
                closed = true;
                break;
            }
            var_name.push(c);
        }
        match (closed, var_name.is_empty()) {
            (true, false) => match lookup(&var_name) {
                Some(val) => result.push_str(&val),
                None => {
                    result.push_str("${");
                    result.push_str(&var_name);
                    result.push('}');
                },
            },
            (true, true) => result.push_str("${}"),
            (false, _) => {
                result.push_str("${");
                result.push_str(&var_name);
            },
        }
    }

    result
}
