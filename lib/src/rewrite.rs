//! Regex-level rewriting of module declarations and config references.
//!
//! String matching over structured content is fragile by nature. Keeping
//! it behind these two functions means the matching strategy can be
//! swapped without touching the pass itself; callers only see
//! content-in/content-out.

use regex::{NoExpand, Regex};

/// Replaces the quoted identifier of a `define("<from_id>", ...)` module
/// self-declaration with `to_id`, normalizing the quote style to double
/// quotes.
///
/// Returns `None` when no declaration names `from_id`, so callers can
/// skip the write-back.
///
/// ## Examples
///
/// ```rust
/// use cachet_lib::rewrite::rewrite_declaration;
///
/// let content = "define('app', [], function(){});";
/// assert_eq!(
///     rewrite_declaration(content, "app", "app-5017e000").as_deref(),
///     Some("define(\"app-5017e000\", [], function(){});")
/// );
/// assert_eq!(rewrite_declaration(content, "other", "other-x"), None);
/// ```
pub fn rewrite_declaration(content: &str, from_id: &str, to_id: &str) -> Option<String> {
    let pattern = format!(r#"define\(("|'){}("|')"#, regex::escape(from_id));
    let re = Regex::new(&pattern).unwrap();
    if !re.is_match(content) {
        return None;
    }
    let replacement = format!("define(\"{to_id}\"");
    Some(re.replace_all(content, NoExpand(&replacement)).into_owned())
}

/// Replaces every reference to the main config file, hashed or not, with
/// `new_path`.
///
/// The pattern is the original config path with its extension stripped,
/// followed by up to `max_suffix` non-whitespace characters and a literal
/// `.js`. That covers the unhashed original as well as any hash suffix a
/// previous run may have left behind, as long as `max_suffix` is at least
/// the hash length plus the separator length.
///
/// Returns `None` when nothing matched.
pub fn replace_config_reference(
    content: &str,
    original_config_path: &str,
    new_path: &str,
    max_suffix: usize,
) -> Option<String> {
    let base = match original_config_path.rfind('.') {
        Some(idx) => &original_config_path[..idx],
        None => original_config_path,
    };
    let pattern = format!(r"{}\S{{0,{max_suffix}}}\.js", regex::escape(base));
    let re = Regex::new(&pattern).unwrap();
    if !re.is_match(content) {
        return None;
    }
    Some(re.replace_all(content, NoExpand(new_path)).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_double_quoted_declaration() {
        let content = r#"define("app", ["dep"], function(dep){});"#;
        assert_eq!(
            rewrite_declaration(content, "app", "app-5017e000").unwrap(),
            r#"define("app-5017e000", ["dep"], function(dep){});"#
        );
    }

    #[test]
    fn normalizes_single_quotes_to_double() {
        let content = "define('widgets/menu', [], function(){});";
        assert_eq!(
            rewrite_declaration(content, "widgets/menu", "widgets/menu-abc12345").unwrap(),
            "define(\"widgets/menu-abc12345\", [], function(){});"
        );
    }

    #[test]
    fn leaves_unrelated_declarations_alone() {
        let content = r#"define("appetizer", [], function(){});"#;
        assert_eq!(rewrite_declaration(content, "app", "app-x"), None);
    }

    #[test]
    fn no_declaration_returns_none() {
        assert_eq!(rewrite_declaration("var x = 1;", "app", "app-x"), None);
    }

    #[test]
    fn identifier_with_directory_prefix_is_escaped_literally() {
        let content = r#"define("widgets/menu", [], function(){});"#;
        // A dot in the identifier must not act as a regex wildcard
        assert_eq!(rewrite_declaration(content, "widgets.menu", "x"), None);
    }

    #[test]
    fn replaces_unhashed_config_reference() {
        let html = r#"<script src="/js/common.js"></script>"#;
        assert_eq!(
            replace_config_reference(html, "js/common.js", "js/common-5017e000.js", 9).unwrap(),
            r#"<script src="/js/common-5017e000.js"></script>"#
        );
    }

    #[test]
    fn replaces_previously_hashed_reference() {
        let html = r#"<script src="/js/common-old123ab.js"></script>"#;
        assert_eq!(
            replace_config_reference(html, "js/common.js", "js/common-5017e000.js", 9).unwrap(),
            r#"<script src="/js/common-5017e000.js"></script>"#
        );
    }

    #[test]
    fn replaces_every_occurrence() {
        let html = "common.js common-aaaa1111.js";
        assert_eq!(
            replace_config_reference(html, "common.js", "common-5017e000.js", 9).unwrap(),
            "common-5017e000.js common-5017e000.js"
        );
    }

    #[test]
    fn suffix_longer_than_allowance_is_not_matched() {
        // 10 non-whitespace characters between base and `.js`, allowance is 9
        let html = "common-0123456789.js";
        assert_eq!(
            replace_config_reference(html, "common.js", "common-new.js", 9),
            None
        );
    }

    #[test]
    fn unreferenced_content_returns_none() {
        assert_eq!(
            replace_config_reference("<html></html>", "js/common.js", "js/common-x.js", 9),
            None
        );
    }
}
