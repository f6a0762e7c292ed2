//! Verb synonyms
//!
//! When a leaf's final path segment matches one of these verbs, the
//! synonyms become additional invocation names on that leaf, so
//! `target delete` resolves to the same command as `target remove`.

pub fn synonyms_for(verb: &str) -> &'static [&'static str] {
    match verb {
        "remove" => &["delete"],
        "create" => &["add"],
        "add" => &["create"],
        "delete" => &["remove"],
        "info" => &["describe"],
        "log" => &["logs"],
        "change" => &["update", "set"],
        "destroy" => &["remove", "delete"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_verbs_have_synonyms() {
        assert_eq!(synonyms_for("remove"), &["delete"]);
        assert_eq!(synonyms_for("change"), &["update", "set"]);
    }

    #[test]
    fn unknown_verbs_have_none() {
        assert!(synonyms_for("deploy").is_empty());
    }
}
