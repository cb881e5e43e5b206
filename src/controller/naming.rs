use crate::router::Verb;

/// Derive a route from a snake_case handler name
///
/// The first word is the verb; every following word is a path segment, except
/// `by`, which inserts `{paramN}`, and `by_wildcard`, which inserts the
/// catch-all `{*paramN}` and must end the name. Returns `None` when the name
/// does not follow the convention.
///
/// ```rust,ignore
/// assert_eq!(parse_method_name("get_by"), Some((Verb::Get, "/{param1}".into())));
/// assert_eq!(parse_method_name("any_ping"), Some((Verb::Any, "/ping".into())));
/// ```
pub fn parse_method_name(name: &str) -> Option<(Verb, String)> {
    let mut words = name.split('_');
    let verb = words.next().filter(|w| is_lowercase_word(w))?.parse::<Verb>().ok()?;

    let words: Vec<&str> = words.collect();
    let mut segments: Vec<String> = Vec::with_capacity(words.len());
    let mut params = 0;
    let mut index = 0;

    while index < words.len() {
        let word = words[index];
        if !is_lowercase_word(word) {
            return None;
        }

        if word == "by" {
            params += 1;
            if words.get(index + 1) == Some(&"wildcard") {
                if index + 2 != words.len() {
                    return None;
                }
                segments.push(format!("{{*param{}}}", params));
                break;
            }
            segments.push(format!("{{param{}}}", params));
        } else {
            segments.push(word.to_string());
        }
        index += 1;
    }

    Some((verb, format!("/{}", segments.join("/"))))
}

fn is_lowercase_word(word: &str) -> bool {
    !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}
