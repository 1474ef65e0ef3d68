//! Job configuration templating.
//!
//! Templates are plain `config.xml` text with `{{ name }}` placeholders. A
//! placeholder name is an identifier (`[A-Za-z_][A-Za-z0-9_.-]*`); any other
//! `{{ ... }}` text, such as a Go template inside a shell step, is left alone.

use crate::Error;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Ordered `name -> value` pairs substituted into a template.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Variables {
    entries: Vec<(String, String)>,
}

impl Variables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, replacing an earlier value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Build from `name=value` assignments, as given to `-D`.
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vars = Self::new();
        for raw in assignments {
            let (name, value) = parse_assignment(raw.as_ref())?;
            vars.insert(name, value);
        }
        Ok(vars)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Variables {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut vars = Self::new();
        for (name, value) in iter {
            vars.insert(name, value);
        }
        vars
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Variables {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Split `name=value` on the first `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), Error> {
    let Some((name, value)) = raw.split_once('=') else {
        return Err(Error::invalid_config(format!(
            "expected NAME=VALUE, got '{raw}'"
        )));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::invalid_config(format!("empty name in '{raw}'")));
    }
    Ok((name.to_owned(), value.to_owned()))
}

fn is_placeholder_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Substitute every `{{ name }}` with its value.
///
/// Fails with [`Error::MissingVariable`] for a placeholder that has no value.
pub fn render(text: &str, vars: &Variables) -> Result<String, Error> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find(OPEN) {
        let after_open = &rest[open + OPEN.len()..];
        let Some(close) = after_open.find(CLOSE) else {
            break;
        };

        let name = after_open[..close].trim();
        out.push_str(&rest[..open]);
        if !is_placeholder_name(name) {
            // Only the braces are literal; a placeholder may follow them.
            out.push_str(OPEN);
            rest = after_open;
            continue;
        }
        let value = vars.get(name).ok_or_else(|| Error::MissingVariable {
            name: name.into(),
        })?;
        out.push_str(value);
        rest = &after_open[close + CLOSE.len()..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Undo the `&quot;` the server wraps around placeholders that sat in
/// quoted positions of the original template.
#[must_use]
pub fn unquote_placeholders(config: &str) -> String {
    config
        .replace(">&quot;{{", ">{{")
        .replace("}}&quot;<", "}}<")
}

/// Turn every `<disabled>true</disabled>` into `<disabled>false</disabled>`.
#[must_use]
pub fn force_enabled(config: &str) -> String {
    config.replace("<disabled>true</disabled>", "<disabled>false</disabled>")
}

/// Full pipeline for a configuration fetched from a template job.
pub fn render_copy(config: &str, vars: &Variables, enable: bool) -> Result<String, Error> {
    let rendered = render(&unquote_placeholders(config), vars)?;
    Ok(if enable {
        force_enabled(&rendered)
    } else {
        rendered
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn renders_placeholders_with_and_without_spaces() {
        let vars = Variables::from([("repo", "mbf-warehouse"), ("branch", "us544_login")]);
        let out = render("<url>{{repo}}</url><b>{{ branch }}</b>", &vars).unwrap();
        assert_eq!(out, "<url>mbf-warehouse</url><b>us544_login</b>");
    }

    #[test]
    fn missing_variable_is_an_error() {
        let err = render("<a>{{ nope }}</a>", &Variables::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingVariable);
        assert_eq!(err.to_string(), "template variable 'nope' has no value");
    }

    #[test]
    fn non_identifiers_and_unterminated_braces_stay_literal() {
        let vars = Variables::from([("x", "1")]);
        assert_eq!(
            render("echo '{{.Name}}' {{x}} {{ x", &vars).unwrap(),
            "echo '{{.Name}}' 1 {{ x"
        );
    }

    #[test]
    fn stray_open_braces_do_not_hide_later_placeholders() {
        let template = "<cmd>echo {{ </cmd><url>{{repo}}</url>";
        assert_eq!(
            render(template, &Variables::from([("repo", "git://x")])).unwrap(),
            "<cmd>echo {{ </cmd><url>git://x</url>"
        );

        let err = render("<cmd>echo {{ </cmd><url>{{nope}}</url>", &Variables::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingVariable);
    }

    #[test]
    fn placeholder_inside_go_template_is_still_rendered() {
        let vars = Variables::from([("x", "1")]);
        assert_eq!(render("{{ printf {{x}} }}", &vars).unwrap(), "{{ printf 1 }}");
    }

    #[test]
    fn quote_fixup_then_render() {
        let config = "<value>&quot;{{x}}&quot;</value>";
        let out = render_copy(config, &Variables::from([("x", "2")]), false).unwrap();
        assert_eq!(out, "<value>2</value>");
        assert!(!out.contains("&quot;"));
    }

    #[test]
    fn enable_rewrite_only_when_asked() {
        let config = "<project><disabled>true</disabled></project>";
        assert_eq!(
            render_copy(config, &Variables::new(), true).unwrap(),
            "<project><disabled>false</disabled></project>"
        );
        assert_eq!(render_copy(config, &Variables::new(), false).unwrap(), config);
    }

    #[test]
    fn variables_keep_order_and_replace_in_place() {
        let mut vars = Variables::new();
        vars.insert("b", "1");
        vars.insert("a", "2");
        vars.insert("b", "3");
        let collected: Vec<_> = vars.iter().collect();
        assert_eq!(collected, vec![("b", "3"), ("a", "2")]);
    }

    #[test]
    fn assignments_split_on_first_equals() {
        let vars = Variables::from_assignments(["url=http://x/?a=b", "empty="]).unwrap();
        assert_eq!(vars.get("url"), Some("http://x/?a=b"));
        assert_eq!(vars.get("empty"), Some(""));
        assert!(Variables::from_assignments(["novalue"]).is_err());
        assert!(Variables::from_assignments(["=x"]).is_err());
    }
}
