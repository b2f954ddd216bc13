//! Inline formatting and wikilink resolution.
//!
//! Patterns run in a fixed order so later ones never see the markers that
//! earlier ones already turned into tags.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::text::unescape_html;

/// An inline rewrite rule: a pattern and its replacement template.
struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

impl Rule {
    fn new(pattern: &str, replacement: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("Invalid inline regex"),
            replacement,
        }
    }
}

static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").expect("Invalid image regex"));

static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("Invalid link regex"));

/// Stand-in for a generated tag while the emphasis rules run. User text has
/// every `<` escaped, so `<@` can only come from here.
static SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<@(\d+)@>").expect("Invalid span regex"));

/// Emphasis, code, strikethrough and highlight rules in application order.
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new(r"\*\*\*(.+?)\*\*\*", "<strong><em>${1}</em></strong>"),
        Rule::new(r"\b___(.+?)___\b", "<strong><em>${1}</em></strong>"),
        Rule::new(r"\*\*(.+?)\*\*", "<strong>${1}</strong>"),
        Rule::new(r"\b__(.+?)__\b", "<strong>${1}</strong>"),
        Rule::new(r"\*([^*\n]+)\*", "<em>${1}</em>"),
        Rule::new(r"\b_([^_\n]+)_\b", "<em>${1}</em>"),
        Rule::new(r"`([^`\n]+)`", "<code>${1}</code>"),
        Rule::new(r"~~(.+?)~~", "<del>${1}</del>"),
        Rule::new(r"==(.+?)==", "<mark>${1}</mark>"),
    ]
});

/// Apply image, link, emphasis, code, strikethrough and highlight rules.
///
/// Images run before links, since `![a](b)` contains `[a](b)`. Image tags and
/// link openings are set aside while the remaining rules run, so `src`,
/// `alt` and `href` values keep their text as written.
pub fn format(markdown: &str) -> String {
    let mut spans: Vec<String> = Vec::new();

    let text = IMAGE.replace_all(markdown, |caps: &Captures| {
        set_aside(
            &mut spans,
            format!(
                r#"<figure><img src="{}" alt="{}" loading="lazy" /></figure>"#,
                &caps[2], &caps[1]
            ),
        )
    });
    let text = LINK.replace_all(&text, |caps: &Captures| {
        let open = set_aside(&mut spans, format!(r#"<a href="{}">"#, &caps[2]));
        format!("{open}{}</a>", &caps[1])
    });

    let text = RULES.iter().fold(text.into_owned(), |text, rule| {
        rule.pattern
            .replace_all(&text, rule.replacement)
            .into_owned()
    });

    SPAN.replace_all(&text, |caps: &Captures| {
        caps[1]
            .parse::<usize>()
            .ok()
            .and_then(|index| spans.get(index))
            .cloned()
            .unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

fn set_aside(spans: &mut Vec<String>, html: String) -> String {
    spans.push(html);
    format!("<@{}@>", spans.len() - 1)
}

/// Resolve `[[Note]]` and `[[Note|Label]]` into links under `base`.
///
/// `base` is the URL prefix of post pages, e.g. `/posts/`.
pub fn wikilinks(markdown: &str, base: &str) -> String {
    static WIKILINK: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\[\[([^\[\]|]+)(?:\|([^\[\]]+))?\]\]").expect("Invalid wikilink regex")
    });

    WIKILINK
        .replace_all(markdown, |caps: &Captures| {
            let target = caps[1].trim();
            let label = caps.get(2).map_or(target, |m| m.as_str().trim());
            let slug = wiki_slug(&unescape_html(target));
            format!(r#"<a href="{base}{slug}/" class="wikilink">{label}</a>"#)
        })
        .into_owned()
}

/// Slug rule for wikilink targets.
///
/// Looser than [`crate::slugify`]: lower-case, whitespace runs become a
/// hyphen, anything that is not a word character or hyphen is dropped and
/// repeated hyphens collapse.
pub fn wiki_slug(target: &str) -> String {
    static WHITESPACE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));
    static NON_WORD: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\w-]").expect("Invalid non-word regex"));
    static HYPHENS: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"-+").expect("Invalid hyphen regex"));

    let lowered = target.to_lowercase();
    let hyphenated = WHITESPACE.replace_all(&lowered, "-");
    let cleaned = NON_WORD.replace_all(&hyphenated, "");
    HYPHENS.replace_all(&cleaned, "-").into_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn formats_emphasis() {
        assert_eq!(
            format("***both*** **bold** *italic* ___b___ __s__ _i_"),
            "<strong><em>both</em></strong> <strong>bold</strong> <em>italic</em> \
             <strong><em>b</em></strong> <strong>s</strong> <em>i</em>"
        );
    }

    #[test]
    fn underscores_inside_words_are_literal() {
        assert_eq!(format("snake_case_name"), "snake_case_name");
        assert_eq!(
            format("![photo](my_photo_1.png)"),
            r#"<figure><img src="my_photo_1.png" alt="photo" loading="lazy" /></figure>"#
        );
    }

    #[test]
    fn formats_links_and_images() {
        assert_eq!(
            format("See [the docs](https://example.com) and ![a cat](cat.png)"),
            "See <a href=\"https://example.com\">the docs</a> and \
             <figure><img src=\"cat.png\" alt=\"a cat\" loading=\"lazy\" /></figure>"
        );
    }

    #[test]
    fn attributes_are_not_formatted() {
        assert_eq!(
            format("![*x*](y.png)"),
            r#"<figure><img src="y.png" alt="*x*" loading="lazy" /></figure>"#
        );
        assert_eq!(
            format("[*see* this](https://x.test/a*b*c~~d~~)"),
            r#"<a href="https://x.test/a*b*c~~d~~"><em>see</em> this</a>"#
        );
    }

    #[test]
    fn emphasis_can_wrap_a_link() {
        assert_eq!(
            format("**read [the docs](https://example.com)**"),
            r#"<strong>read <a href="https://example.com">the docs</a></strong>"#
        );
    }

    #[test]
    fn formats_code_strike_and_highlight() {
        assert_eq!(
            format("`let x` ~~gone~~ ==look=="),
            "<code>let x</code> <del>gone</del> <mark>look</mark>"
        );
    }

    #[test]
    fn emphasis_runs_before_inline_code() {
        assert_eq!(format("`a*b*c`"), "<code>a<em>b</em>c</code>");
    }

    #[test]
    fn italic_does_not_span_lines() {
        assert_eq!(format("a * b\nc * d"), "a * b\nc * d");
    }

    #[test]
    fn resolves_wikilinks() {
        assert_eq!(
            wikilinks("[[My Note]]", "/posts/"),
            r#"<a href="/posts/my-note/" class="wikilink">My Note</a>"#
        );
        assert_eq!(
            wikilinks("[[My Note|See this]]", "/posts/"),
            r#"<a href="/posts/my-note/" class="wikilink">See this</a>"#
        );
    }

    #[test]
    fn wikilink_slug_uses_unescaped_target() {
        assert_eq!(
            wikilinks("[[Tom&#039;s Notes]]", "/blog/posts/"),
            r#"<a href="/blog/posts/toms-notes/" class="wikilink">Tom&#039;s Notes</a>"#
        );
    }

    #[test]
    fn wiki_slug_rules() {
        assert_eq!(wiki_slug("Hello   World"), "hello-world");
        assert_eq!(wiki_slug("C++ & Rust -- notes"), "c-rust-notes");
        assert_eq!(wiki_slug("snake_case"), "snake_case");
    }

    #[test]
    fn plain_brackets_are_not_links() {
        assert_eq!(format("[just brackets]"), "[just brackets]");
        assert_eq!(wikilinks("[single]", "/posts/"), "[single]");
    }
}
