/// Replace `${ENV_VAR}` placeholders in raw config text.
///
/// Unresolvable or malformed placeholders are emitted literally, so a config
/// file can mention `${...}` in values it does not want substituted without
/// escaping.
pub fn substitute_env(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) if end > 0 => {
                let name = &after[..end];
                match std::env::var(name) {
                    Ok(val) => out.push_str(&val),
                    Err(_) => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    },
                }
                rest = &after[end + 1..];
            },
            _ => {
                // No closing brace (or empty name) — emit the rest verbatim.
                out.push_str(&rest[start..]);
                return out;
            },
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_var() {
        unsafe { std::env::set_var("CPSS_SUBST_TEST", "backend.internal") };
        assert_eq!(
            substitute_env("base_url = \"http://${CPSS_SUBST_TEST}/api\""),
            "base_url = \"http://backend.internal/api\""
        );
        unsafe { std::env::remove_var("CPSS_SUBST_TEST") };
    }

    #[test]
    fn leaves_unknown_var() {
        assert_eq!(
            substitute_env("${CPSS_NONEXISTENT_XYZ}"),
            "${CPSS_NONEXISTENT_XYZ}"
        );
    }

    #[test]
    fn leaves_unclosed_placeholder() {
        assert_eq!(substitute_env("prefix ${OOPS"), "prefix ${OOPS");
    }

    #[test]
    fn no_placeholders() {
        assert_eq!(substitute_env("plain text"), "plain text");
    }
}
