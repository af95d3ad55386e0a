//! Worker command templating.
//!
//! The command string comes from the operator's config or command line and
//! is trusted: values are spliced in verbatim and the result is handed to the
//! shell without escaping. Only `$BUFFER`, `$TEMPLATE` and `$INSTRUCTIONS`
//! are recognised; any other `$` sequence is left for the shell.

/// Values for the three placeholders. Also exported to the worker's environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVars {
    /// Path of the chunk's work unit file.
    pub buffer: String,
    pub template: String,
    pub instructions: String,
}

impl TemplateVars {
    /// `(name, value)` pairs, in placeholder order.
    pub fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            ("BUFFER", self.buffer.as_str()),
            ("TEMPLATE", self.template.as_str()),
            ("INSTRUCTIONS", self.instructions.as_str()),
        ]
    }
}

/// A shell command with `$NAME` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate(String);

impl CommandTemplate {
    pub fn new(command: impl Into<String>) -> Self {
        Self(command.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitute placeholders in one left-to-right pass. Inserted values are
    /// not rescanned, so a value containing `$BUFFER` stays literal.
    pub fn render(&self, vars: &TemplateVars) -> String {
        let pairs = vars.pairs();
        let mut out =
            String::with_capacity(self.0.len() + vars.buffer.len() + vars.instructions.len());
        let mut rest = self.0.as_str();
        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            match pairs.iter().find(|(name, _)| after.starts_with(name)) {
                Some((name, value)) => {
                    out.push_str(value);
                    rest = &after[name.len()..];
                }
                None => {
                    out.push('$');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> TemplateVars {
        TemplateVars {
            buffer: "/w/chunks/ab12.txt".into(),
            template: "chunker".into(),
            instructions: "focus on names".into(),
        }
    }

    #[test]
    fn substitutes_all_placeholders() {
        let t = CommandTemplate::new("cat \"$BUFFER\" | subd -t \"$TEMPLATE\" -i \"Summarize. $INSTRUCTIONS\"");
        assert_eq!(
            t.render(&vars()),
            "cat \"/w/chunks/ab12.txt\" | subd -t \"chunker\" -i \"Summarize. focus on names\""
        );
    }

    #[test]
    fn repeated_placeholders_and_unknown_names() {
        let t = CommandTemplate::new("echo $BUFFER $BUFFER $HOME $ $");
        assert_eq!(
            t.render(&vars()),
            "echo /w/chunks/ab12.txt /w/chunks/ab12.txt $HOME $ $"
        );
    }

    #[test]
    fn inserted_values_are_not_rescanned() {
        let v = TemplateVars {
            buffer: "b".into(),
            template: "$INSTRUCTIONS".into(),
            instructions: "$BUFFER".into(),
        };
        let t = CommandTemplate::new("$TEMPLATE|$INSTRUCTIONS");
        assert_eq!(t.render(&v), "$INSTRUCTIONS|$BUFFER");
    }

    #[test]
    fn no_placeholders_is_identity() {
        let t = CommandTemplate::new("echo ok");
        assert_eq!(t.render(&vars()), "echo ok");
    }

    #[test]
    fn multibyte_text_around_placeholders() {
        let t = CommandTemplate::new("résumé→$TEMPLATE←ü");
        assert_eq!(t.render(&vars()), "résumé→chunker←ü");
    }
}
