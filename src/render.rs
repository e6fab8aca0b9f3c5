//! Markdown to HTML rendering.
//!
//! Uses [pulldown-cmark](https://docs.rs/pulldown-cmark) with the GitHub
//! flavoured extensions (tables, strikethrough, task lists, and optionally
//! footnotes). pulldown-cmark only links `<https://…>` in angle brackets, so
//! bare `http(s)://` URLs and `www.` hosts in text are turned into links by a
//! small pass over the event stream before HTML is emitted.
//!
//! The resulting HTML is cleaned with [ammonia](https://docs.rs/ammonia):
//! raw HTML embedded in a post can't inject scripts or event handlers. Task
//! list checkboxes, code-block language classes and footnote markup are
//! allowed through.
//!
//! Rendering is a pure function of the markdown and the options: the same
//! input always produces byte-identical output, and renders share no state,
//! so [`render_all`] runs them on the rayon pool in any order.

use crate::config::MarkdownConfig;
use crate::types::{Body, ContentItem};
use pulldown_cmark::{
    CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream, html as md_html,
};
use rayon::prelude::*;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("item `{0}` has already been rendered")]
    AlreadyRendered(String),
}

static SANITIZER: LazyLock<ammonia::Builder<'static>> = LazyLock::new(|| {
    let mut builder = ammonia::Builder::default();
    builder
        .add_tags(&["input"])
        .add_tag_attributes("input", &["type", "checked", "disabled"])
        .add_tag_attributes("code", &["class"])
        .add_tag_attributes("sup", &["class"])
        .add_tag_attributes("div", &["class"])
        .add_generic_attributes(&["id"]);
    builder
});

fn parser_options(config: &MarkdownConfig) -> Options {
    let mut options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    if config.footnotes {
        options |= Options::ENABLE_FOOTNOTES;
    }
    if config.smart_punctuation {
        options |= Options::ENABLE_SMART_PUNCTUATION;
    }
    options
}

/// Render a markdown string to sanitized HTML.
pub fn render_markdown(markdown: &str, config: &MarkdownConfig) -> String {
    let parser = TextMergeStream::new(Parser::new_ext(markdown, parser_options(config)));
    let events = autolink(parser);
    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    md_html::push_html(&mut html, events.into_iter());
    SANITIZER.clean(&html).to_string()
}

/// Replace an item's markdown body with rendered HTML.
///
/// Fails if the item was already rendered; rendering HTML as markdown would
/// double-escape it.
pub fn render_item(
    mut item: ContentItem,
    config: &MarkdownConfig,
) -> Result<ContentItem, RenderError> {
    let html = match &item.content {
        Body::Markdown(md) => render_markdown(md, config),
        Body::Html(_) => return Err(RenderError::AlreadyRendered(item.slug)),
    };
    item.content = Body::Html(html);
    Ok(item)
}

/// Render many items in parallel. Output order matches input order.
pub fn render_all(
    items: Vec<ContentItem>,
    config: &MarkdownConfig,
) -> Result<Vec<ContentItem>, RenderError> {
    items
        .into_par_iter()
        .map(|item| render_item(item, config))
        .collect()
}

/// Wrap bare `http://` / `https://` URLs in text with link events.
///
/// Text inside existing links, images and code blocks is left alone.
fn autolink<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
    let mut out = Vec::new();
    let mut link_depth = 0usize;
    let mut in_code_block = false;

    for event in events {
        match &event {
            Event::Start(Tag::Link { .. } | Tag::Image { .. }) => link_depth += 1,
            Event::End(TagEnd::Link | TagEnd::Image) => link_depth = link_depth.saturating_sub(1),
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Text(text) if link_depth == 0 && !in_code_block => {
                if find_url(text).is_some() {
                    push_linked_text(text, &mut out);
                    continue;
                }
            }
            _ => {}
        }
        out.push(event);
    }
    out
}

/// Byte range of the first URL in `text`, plus the scheme its link target needs.
///
/// `www.` hosts count as URLs when they start a word; their target gets `http://`.
fn find_url(text: &str) -> Option<(usize, usize, &'static str)> {
    let www = text.match_indices("www.").map(|(i, _)| i).find(|&i| {
        text[..i]
            .chars()
            .next_back()
            .is_none_or(|c| c.is_whitespace() || matches!(c, '(' | '*' | '_' | '~'))
    });
    let (start, scheme_len, prefix) = ["https://", "http://"]
        .iter()
        .filter_map(|scheme| text.find(scheme).map(|i| (i, scheme.len(), "")))
        .chain(www.map(|i| (i, 4, "http://")))
        .min_by_key(|&(i, _, _)| i)?;
    let rest = &text[start..];
    let mut len = rest
        .find(|c: char| c.is_whitespace() || c == '<' || c == '>')
        .unwrap_or(rest.len());

    // Trailing punctuation belongs to the sentence, not the URL. A closing
    // paren stays only if it balances one inside the URL.
    while let Some(last) = rest[..len].chars().next_back() {
        let trim = match last {
            '.' | ',' | ':' | ';' | '!' | '?' | '"' | '\'' | '*' | '_' | '~' => true,
            ')' => rest[..len].matches(')').count() > rest[..len].matches('(').count(),
            _ => false,
        };
        if !trim {
            break;
        }
        len -= last.len_utf8();
    }

    (len > scheme_len).then_some((start, start + len, prefix))
}

fn push_linked_text<'a>(text: &str, out: &mut Vec<Event<'a>>) {
    let mut rest = text;
    while let Some((start, end, prefix)) = find_url(rest) {
        if start > 0 {
            out.push(Event::Text(CowStr::from(rest[..start].to_string())));
        }
        let url = rest[start..end].to_string();
        out.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(format!("{prefix}{url}")),
            title: CowStr::from(""),
            id: CowStr::from(""),
        }));
        out.push(Event::Text(CowStr::from(url)));
        out.push(Event::End(TagEnd::Link));
        rest = &rest[end..];
    }
    if !rest.is_empty() {
        out.push(Event::Text(CowStr::from(rest.to_string())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn render(md: &str) -> String {
        render_markdown(md, &MarkdownConfig::default())
    }

    fn item(md: &str) -> ContentItem {
        ContentItem {
            slug: "post".into(),
            title: "Post".into(),
            description: None,
            date: "2024-01-01".into(),
            draft: None,
            content: Body::Markdown(md.into()),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn basic_paragraph() {
        assert_eq!(render("Hello, world!").trim(), "<p>Hello, world!</p>");
    }

    #[test]
    fn headings_lists_emphasis() {
        let html = render("# Title\n\n- **bold**\n- *italic*\n");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<li><strong>bold</strong></li>"));
        assert!(html.contains("<li><em>italic</em></li>"));
    }

    #[test]
    fn links_and_images() {
        let html = render("[site](https://example.com) ![alt](/img.png)");
        assert!(html.contains("href=\"https://example.com\""));
        assert!(html.contains(">site</a>"));
        assert!(html.contains("<img src=\"/img.png\" alt=\"alt\">"));
    }

    #[test]
    fn table() {
        let html = render("| A | B |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn strikethrough() {
        assert!(render("~~gone~~").contains("<del>gone</del>"));
    }

    #[test]
    fn task_list_checkboxes_survive_sanitizing() {
        let html = render("- [x] done\n- [ ] todo");
        assert!(html.contains("type=\"checkbox\""));
        assert!(html.contains("checked"));
    }

    #[test]
    fn bare_urls_become_links() {
        let html = render("See https://example.com/docs.");
        assert!(html.contains("href=\"https://example.com/docs\""));
        assert!(html.contains(">https://example.com/docs</a>."));
    }

    #[test]
    fn www_hosts_become_http_links() {
        let html = render("Visit www.example.com/docs, or (www.rust-lang.org).");
        assert!(html.contains("href=\"http://www.example.com/docs\""));
        assert!(html.contains(">www.example.com/docs</a>,"));
        assert!(html.contains("href=\"http://www.rust-lang.org\""));
    }

    #[test]
    fn www_inside_a_word_is_not_linked() {
        assert!(!render("awww.example is not a host").contains("<a "));
        assert!(!render("just www. alone").contains("<a "));
    }

    #[test]
    fn scheme_url_with_www_keeps_its_scheme() {
        let html = render("See https://www.example.com now");
        assert!(html.contains("href=\"https://www.example.com\""));
        assert_eq!(html.matches("<a ").count(), 1);
    }

    #[test]
    fn balanced_parens_stay_in_url() {
        let html = render("(see https://en.wikipedia.org/wiki/Rust_(language))");
        assert!(html.contains("href=\"https://en.wikipedia.org/wiki/Rust_(language)\""));
    }

    #[test]
    fn urls_in_code_are_not_linked() {
        let html = render("`https://a.example`\n\n```\nhttps://b.example\n```\n");
        assert!(!html.contains("<a "));
    }

    #[test]
    fn existing_links_are_not_nested() {
        let html = render("[https://a.example](https://a.example)");
        assert_eq!(html.matches("<a ").count(), 1);
    }

    #[test]
    fn code_block_keeps_language_class() {
        let html = render("```rust\nfn main() {}\n```");
        assert!(html.contains("class=\"language-rust\""));
        assert!(html.contains("fn main()"));
    }

    #[test]
    fn script_tags_are_stripped() {
        let html = render("hi <script>alert(1)</script>\n\n<div onclick=\"x()\">ok</div>");
        assert!(!html.contains("<script"));
        assert!(!html.contains("onclick"));
        assert!(html.contains("ok"));
    }

    #[test]
    fn footnotes_toggle() {
        let md = "Text[^1]\n\n[^1]: Note.";
        let with = render_markdown(md, &MarkdownConfig::default());
        assert!(with.contains("footnote"));

        let config = MarkdownConfig {
            footnotes: false,
            ..MarkdownConfig::default()
        };
        assert!(!render_markdown(md, &config).contains("footnote-definition"));
    }

    #[test]
    fn rendering_is_idempotent() {
        let md = "# Title\n\nSome *text* with https://example.com and a table:\n\n| a |\n|---|\n| 1 |\n";
        assert_eq!(render(md), render(md));
    }

    #[test]
    fn empty_input() {
        assert_eq!(render(""), "");
    }

    #[test]
    fn render_item_switches_body_to_html() {
        let rendered = render_item(item("**hi**"), &MarkdownConfig::default()).unwrap();
        assert_eq!(rendered.content.html(), Some("<p><strong>hi</strong></p>\n"));
    }

    #[test]
    fn render_item_twice_is_error() {
        let config = MarkdownConfig::default();
        let once = render_item(item("x"), &config).unwrap();
        assert!(matches!(
            render_item(once, &config),
            Err(RenderError::AlreadyRendered(_))
        ));
    }

    #[test]
    fn render_all_preserves_order() {
        let items: Vec<ContentItem> = (0..20)
            .map(|i| {
                let mut it = item(&format!("item {i}"));
                it.slug = format!("s{i}");
                it
            })
            .collect();
        let rendered = render_all(items, &MarkdownConfig::default()).unwrap();
        for (i, it) in rendered.iter().enumerate() {
            assert_eq!(it.slug, format!("s{i}"));
            assert_eq!(it.content.html(), Some(format!("<p>item {i}</p>\n").as_str()));
        }
    }
}
