//! HTML sanitizer for untrusted guide markup
//!
//! Pure transform: raw provider markup in, bounded safe markup out. The
//! input is parsed once and re-emitted node by node; nothing from the
//! source document is passed through without going past the rewrite
//! rules below. Output is byte-identical for identical input.

use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node};

/// Maximum images kept per section, in document order
const MAX_IMAGES: usize = 6;

/// Maximum direct item children kept per list
const MAX_LIST_ITEMS: usize = 10;

/// Elements removed entirely, subtree included
const DROP_TAGS: &[&str] = &["script", "style", "noscript", "table"];

/// Class markers for provider chrome removed entirely
const DROP_CLASSES: &[&str] = &["mw-editsection", "noprint", "thumb", "metadata"];

/// Elements serialized without a closing tag
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Sanitize one section of guide markup.
///
/// `title` anchors fragment-only links; `home_url` is the guide's home
/// domain used to absolutize site-relative URLs.
#[must_use]
pub fn sanitize_section(html: &str, title: &str, home_url: &str) -> String {
    let document = Html::parse_fragment(html);
    let mut walker = Walker {
        title,
        home: home_url.trim_end_matches('/'),
        images_kept: 0,
        out: String::with_capacity(html.len()),
    };
    walker.emit_children(*document.root_element());
    walker.out
}

struct Walker<'a> {
    title: &'a str,
    home: &'a str,
    images_kept: usize,
    out: String,
}

impl Walker<'_> {
    fn emit_children(&mut self, node: NodeRef<'_, Node>) {
        for child in node.children() {
            match child.value() {
                Node::Text(text) => push_escaped_text(&mut self.out, &text.text),
                Node::Element(_) => {
                    if let Some(element) = ElementRef::wrap(child) {
                        self.emit_element(element);
                    }
                }
                // Comments, doctypes and processing instructions are dropped
                _ => {}
            }
        }
    }

    fn emit_element(&mut self, element: ElementRef<'_>) {
        if is_dropped(element) {
            return;
        }
        match element.value().name() {
            "a" => self.emit_anchor(element),
            "img" => self.emit_image(element),
            name @ ("ul" | "ol") => self.emit_list(element, name),
            name => self.emit_generic(element, name),
        }
    }

    fn emit_generic(&mut self, element: ElementRef<'_>, name: &str) {
        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in element.value().attrs() {
            push_attr(&mut self.out, key, value);
        }
        self.out.push('>');
        if VOID_TAGS.contains(&name) {
            return;
        }
        self.emit_children(*element);
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    fn emit_anchor(&mut self, element: ElementRef<'_>) {
        let href = element.value().attr("href").filter(|h| !h.is_empty());

        let Some(href) = href else {
            // No target: keep the element and its content, minus the
            // dead href attribute.
            self.out.push_str("<a");
            for (key, value) in element.value().attrs() {
                if key != "href" {
                    push_attr(&mut self.out, key, value);
                }
            }
            self.out.push('>');
            self.emit_children(*element);
            self.out.push_str("</a>");
            return;
        };

        if is_edit_link(href) {
            // De-link, don't drop: the anchor collapses to its text.
            let text: String = element.text().collect();
            push_escaped_text(&mut self.out, &text);
            return;
        }

        let href = self.rewrite_url(href);
        self.out.push_str("<a");
        push_attr(&mut self.out, "href", &href);
        for (key, value) in element.value().attrs() {
            if !matches!(key, "href" | "target" | "rel") {
                push_attr(&mut self.out, key, value);
            }
        }
        push_attr(&mut self.out, "target", "_blank");
        push_attr(&mut self.out, "rel", "noopener noreferrer");
        self.out.push('>');
        self.emit_children(*element);
        self.out.push_str("</a>");
    }

    fn emit_image(&mut self, element: ElementRef<'_>) {
        if self.images_kept >= MAX_IMAGES {
            return;
        }
        self.images_kept += 1;

        self.out.push_str("<img");
        if let Some(src) = element.value().attr("src") {
            let src = self.rewrite_url(src);
            push_attr(&mut self.out, "src", &src);
        }
        for (key, value) in element.value().attrs() {
            if !matches!(key, "src" | "loading") {
                push_attr(&mut self.out, key, value);
            }
        }
        push_attr(&mut self.out, "loading", "lazy");
        self.out.push('>');
    }

    fn emit_list(&mut self, element: ElementRef<'_>, name: &str) {
        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in element.value().attrs() {
            push_attr(&mut self.out, key, value);
        }
        self.out.push('>');

        let mut items = 0;
        for child in element.children() {
            match child.value() {
                Node::Text(text) => push_escaped_text(&mut self.out, &text.text),
                Node::Element(_) => {
                    let Some(child_el) = ElementRef::wrap(child) else {
                        continue;
                    };
                    if is_dropped(child_el) {
                        continue;
                    }
                    if items < MAX_LIST_ITEMS {
                        self.emit_element(child_el);
                    }
                    items += 1;
                }
                _ => {}
            }
        }

        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    /// Absolutize protocol-relative, site-relative and fragment-only URLs
    /// against the guide's home domain; anything else passes through.
    fn rewrite_url(&self, url: &str) -> String {
        if let Some(rest) = url.strip_prefix("//") {
            format!("https://{rest}")
        } else if url.starts_with('/') {
            format!("{}{url}", self.home)
        } else if url.starts_with('#') {
            format!(
                "{}/wiki/{}{url}",
                self.home,
                urlencoding::encode(self.title)
            )
        } else {
            url.to_string()
        }
    }
}

fn is_dropped(element: ElementRef<'_>) -> bool {
    if DROP_TAGS.contains(&element.value().name()) {
        return true;
    }
    element
        .value()
        .classes()
        .any(|class| DROP_CLASSES.contains(&class))
}

/// Edit and special-page links are informational chrome, not content
fn is_edit_link(href: &str) -> bool {
    let lower = href.to_lowercase();
    lower.contains("action=edit") || lower.contains("special:")
}

fn push_escaped_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn push_attr(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out.push('"');
}
