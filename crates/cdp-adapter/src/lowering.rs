//! Lowering of text and ARIA anchors to XPath

/// Quote `value` as an XPath string literal.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }
    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

/// Deepest elements whose text equals (`exact`) or contains `content`.
pub fn text_xpath(content: &str, exact: bool) -> String {
    let lit = xpath_literal(content);
    if exact {
        format!("//*[normalize-space(.)={lit} and not(*[normalize-space(.)={lit}])]")
    } else {
        let lower = xpath_literal(&content.to_lowercase());
        let folded = "translate(normalize-space(.), 'ABCDEFGHIJKLMNOPQRSTUVWXYZ', 'abcdefghijklmnopqrstuvwxyz')";
        format!(
            "//body//*[contains({folded}, {lower}) and not(*[contains({folded}, {lower})])]"
        )
    }
}

/// Elements with `role` (explicit or implicit) and accessible name `name`.
pub fn aria_xpath(role: &str, name: &str) -> String {
    let role = role.to_ascii_lowercase();
    let mut alternatives = vec![format!("@role={}", xpath_literal(&role))];
    alternatives.extend(
        implicit_tags(&role)
            .iter()
            .map(|tag| format!("(self::{tag} and not(@role))")),
    );
    let lit = xpath_literal(name);
    format!(
        "//*[({})][@aria-label={lit} or @alt={lit} or @placeholder={lit} or normalize-space(.)={lit}]",
        alternatives.join(" or ")
    )
}

fn implicit_tags(role: &str) -> &'static [&'static str] {
    match role {
        "button" => &["button"],
        "link" => &["a"],
        "heading" => &["h1", "h2", "h3", "h4", "h5", "h6"],
        "textbox" => &["textarea", "input"],
        "img" => &["img"],
        "list" => &["ul", "ol"],
        "listitem" => &["li"],
        "navigation" => &["nav"],
        "combobox" => &["select"],
        "form" => &["form"],
        "table" => &["table"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_survive_quotes() {
        assert_eq!(xpath_literal("Cart"), "'Cart'");
        assert_eq!(xpath_literal("Men's"), "\"Men's\"");
        assert_eq!(
            xpath_literal(r#"5" Men's"#),
            r#"concat('5" Men', "'", 's')"#
        );
    }

    #[test]
    fn text_lowering() {
        assert_eq!(
            text_xpath("Add to Cart", true),
            "//*[normalize-space(.)='Add to Cart' and not(*[normalize-space(.)='Add to Cart'])]"
        );
        let partial = text_xpath("Add to Cart", false);
        assert!(partial.starts_with("//body//*[contains(translate("));
        assert!(partial.contains("'add to cart'"));
    }

    #[test]
    fn aria_lowering_covers_implicit_roles() {
        let xpath = aria_xpath("Button", "Remove");
        assert!(xpath.contains("@role='button'"));
        assert!(xpath.contains("(self::button and not(@role))"));
        assert!(xpath.contains("@aria-label='Remove'"));
        assert!(!aria_xpath("dialog", "Cookies").contains("self::"));
    }
}
