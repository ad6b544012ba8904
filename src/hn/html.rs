use regex::Regex;
use std::sync::OnceLock;

fn paragraph_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<p(\s[^>]*)?>").expect("valid paragraph regex"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("valid tag regex"))
}

// `&amp;` must stay last so `&amp;lt;` decodes to `&lt;`, not `<`.
const ENTITIES: [(&str, &str); 5] = [
    ("&quot;", "\""),
    ("&#x27;", "'"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
];

/// Turn HN comment HTML into plain text.
pub fn clean_html(text: &str) -> String {
    let with_breaks = paragraph_re().replace_all(text, "\n");
    let mut cleaned = tag_re().replace_all(&with_breaks, "").into_owned();

    for (entity, literal) in ENTITIES {
        cleaned = cleaned.replace(entity, literal);
    }

    cleaned.trim().to_string()
}
