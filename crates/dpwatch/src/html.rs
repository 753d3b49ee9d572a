//! Minimal element lookup for scraped pages.
//!
//! Finds the first element with a given tag and class and exposes its
//! attributes and text. This is not a general HTML parser; it only needs to
//! cope with the handful of well-formed elements the fetchers look for.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    attrs: Vec<(String, String)>,
    pub inner_html: String,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|token| token == class))
            .unwrap_or(false)
    }

    /// Text content with tags removed, entities decoded and whitespace collapsed.
    pub fn text(&self) -> String {
        text_content(&self.inner_html)
    }

    /// First descendant matching `tag` and, if given, `class`.
    pub fn find(&self, tag: &str, class: Option<&str>) -> Option<Element> {
        find_element(&self.inner_html, tag, class)
    }
}

/// Any open or close tag: `(1)` is `/` for a close tag, `(2)` the name, `(3)` the attributes.
fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"(?is)<(/?)([a-z][a-z0-9-]*)([^>]*)>").expect("valid regex"))
}

/// First element in `html` with the given tag name and, if given, class token.
pub fn find_element(html: &str, tag: &str, class: Option<&str>) -> Option<Element> {
    let tag = tag.to_ascii_lowercase();

    for open in tag_regex().captures_iter(html) {
        if !open[1].is_empty() || !open[2].eq_ignore_ascii_case(&tag) {
            continue;
        }
        let whole = open.get(0)?;
        let raw_attrs = open.get(3).map(|m| m.as_str()).unwrap_or("");
        let attrs = parse_attrs(raw_attrs);

        let element = Element {
            tag: tag.clone(),
            attrs,
            inner_html: String::new(),
        };
        if let Some(class) = class {
            if !element.has_class(class) {
                continue;
            }
        }

        let self_closing = raw_attrs.trim_end().ends_with('/');
        let inner_html = if self_closing {
            String::new()
        } else {
            inner_until_close(html, whole.end(), &tag).unwrap_or_default()
        };

        return Some(Element {
            inner_html,
            ..element
        });
    }

    None
}

/// Text of an HTML fragment: tags dropped, entities decoded, whitespace collapsed.
pub fn text_content(fragment: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let tag = TAG.get_or_init(|| Regex::new(r"(?s)<!--.*?-->|<[^>]*>").expect("valid regex"));

    let stripped = tag.replace_all(fragment, "");
    decode_entities(&stripped)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn decode_entities(s: &str) -> String {
    static ENTITY: OnceLock<Regex> = OnceLock::new();
    let entity = ENTITY.get_or_init(|| {
        Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid regex")
    });

    entity
        .replace_all(s, |caps: &regex::Captures| {
            let name = &caps[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                "rsquo" => Some('\u{2019}'),
                "lsquo" => Some('\u{2018}'),
                "rdquo" => Some('\u{201d}'),
                "ldquo" => Some('\u{201c}'),
                "mdash" => Some('\u{2014}'),
                "ndash" => Some('\u{2013}'),
                _ if name.starts_with("#x") || name.starts_with("#X") => {
                    u32::from_str_radix(&name[2..], 16).ok().and_then(char::from_u32)
                }
                _ if name.starts_with('#') => name[1..].parse().ok().and_then(char::from_u32),
                _ => None,
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn parse_attrs(raw: &str) -> Vec<(String, String)> {
    static ATTR: OnceLock<Regex> = OnceLock::new();
    let attr = ATTR.get_or_init(|| {
        Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
            .expect("valid regex")
    });

    attr.captures_iter(raw)
        .map(|caps| {
            let name = caps[1].to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| decode_entities(m.as_str()))
                .unwrap_or_default();
            (name, value)
        })
        .collect()
}

/// Inner HTML from `start` up to the close tag that balances the element opened just before it.
fn inner_until_close(html: &str, start: usize, tag: &str) -> Option<String> {
    let mut depth = 1usize;

    for caps in tag_regex().captures_iter(&html[start..]) {
        if !caps[2].eq_ignore_ascii_case(tag) {
            continue;
        }
        let m = caps.get(0)?;
        if caps[1].is_empty() {
            if !caps[3].trim_end().ends_with('/') {
                depth += 1;
            }
        } else {
            depth -= 1;
            if depth == 0 {
                return Some(html[start..start + m.start()].to_string());
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <h3 class="headline">Not this one</h3>
          <H3 class="standard-link featured">
            <a href="/article/2024/03/crossword-march-15?x=1&amp;y=2" class='title'>
              Crossword: <em>Spring</em> Break
            </a>
          </H3>
          <div class="outer"><div class="inner">nested</div> tail</div>
          <img class="logo" src="logo.png" />
        </body></html>
    "#;

    #[test]
    fn test_find_by_class_token() {
        let h3 = find_element(PAGE, "h3", Some("standard-link")).unwrap();
        assert!(h3.has_class("featured"));
        let link = h3.find("a", None).unwrap();
        assert_eq!(
            link.attr("href"),
            Some("/article/2024/03/crossword-march-15?x=1&y=2")
        );
        assert_eq!(link.attr("class"), Some("title"));
        assert_eq!(link.text(), "Crossword: Spring Break");
    }

    #[test]
    fn test_first_match_without_class() {
        let h3 = find_element(PAGE, "h3", None).unwrap();
        assert_eq!(h3.text(), "Not this one");
    }

    #[test]
    fn test_nested_same_tag() {
        let outer = find_element(PAGE, "div", Some("outer")).unwrap();
        assert_eq!(outer.text(), "nested tail");
        assert_eq!(outer.find("div", Some("inner")).unwrap().text(), "nested");
    }

    #[test]
    fn test_self_closing_and_missing() {
        let img = find_element(PAGE, "img", Some("logo")).unwrap();
        assert_eq!(img.attr("src"), Some("logo.png"));
        assert_eq!(img.inner_html, "");
        assert!(find_element(PAGE, "span", Some("dateline")).is_none());
        assert!(find_element(PAGE, "h3", Some("standard")).is_none());
    }

    #[test]
    fn test_tag_names_match_whole_words() {
        let page = r#"<abbr class="x">no</abbr><DIV class="x"><div>in</div></Div><a class="x">yes</a>"#;
        assert_eq!(find_element(page, "a", Some("x")).unwrap().text(), "yes");
        let div = find_element(page, "div", Some("x")).unwrap();
        assert_eq!(div.inner_html, "<div>in</div>");
        assert!(find_element(page, "ab", None).is_none());
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(
            decode_entities("Penn&#39;s &quot;best&quot; &amp; &#x2014; &bogus;"),
            "Penn's \"best\" & \u{2014} &bogus;"
        );
    }
}
