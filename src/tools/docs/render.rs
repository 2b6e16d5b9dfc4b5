//! HTML to Markdown rendering of documentation pages

use super::CodeExample;
use crate::source::public_page_url;
use std::borrow::Cow;

/// Class prefixes naming the language of a code block, by priority
const LANGUAGE_PREFIXES: [&str; 3] = ["language-", "lang-", "highlight-"];

/// Render page HTML as Markdown under a header naming the page and its public URL
#[must_use]
pub fn render_page(technology: &str, path: &str, html: &str) -> String {
    let url = public_page_url(technology, path);
    let body = html_to_markdown(html);
    format!("# {path}\n\n**Source:** [{url}]({url})\n\n---\n\n{body}\n")
}

/// Convert HTML to Markdown
#[must_use]
pub fn html_to_markdown(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    let html = annotate_code_languages(html);
    collapse_blank_lines(html2md::parse_html(&html).trim())
}

/// Rewrite `<pre>` blocks so the converter sees their language
///
/// The converter only reads `language-*` on a `<code>` child. DevDocs marks
/// blocks with `data-language` on the `<pre>` itself, and other sites use
/// `lang-*` or `highlight-*` classes on either element. A block whose
/// language is known becomes `<pre><code class="language-{lang}">`.
fn annotate_code_languages(html: &str) -> Cow<'_, str> {
    if find_tag(html, "pre").is_none() {
        return Cow::Borrowed(html);
    }

    let mut out = String::with_capacity(html.len() + 64);
    let mut rest = html;

    while let Some(start) = find_tag(rest, "pre") {
        let Some(open_len) = rest[start..].find('>') else {
            break;
        };
        let body_start = start + open_len + 1;
        let Some(body_len) = rest[body_start..].find("</pre>") else {
            break;
        };
        let body_end = body_start + body_len;
        let block_end = body_end + "</pre>".len();

        out.push_str(&rest[..start]);
        match language_block(&rest[start..body_start], &rest[body_start..body_end]) {
            Some((language, code)) => {
                out.push_str("<pre><code class=\"language-");
                out.push_str(&language);
                out.push_str("\">");
                out.push_str(code);
                out.push_str("</code></pre>");
            }
            None => out.push_str(&rest[start..block_end]),
        }
        rest = &rest[block_end..];
    }

    out.push_str(rest);
    Cow::Owned(out)
}

// Language and inner code of one block. The `<code>` wrapper, when it spans
// the whole body, is unwrapped and its language wins over the `<pre>` one.
fn language_block<'a>(pre_tag: &str, body: &'a str) -> Option<(String, &'a str)> {
    let trimmed = body.trim();
    if find_tag(trimmed, "code") != Some(0) {
        return tag_language(pre_tag).map(|language| (language, body));
    }

    let open_len = trimmed.find('>')?;
    let inner = trimmed[open_len + 1..].strip_suffix("</code>")?;
    if find_tag(inner, "code").is_some() || inner.contains("</code>") {
        return None;
    }

    let language = tag_language(&trimmed[..=open_len]).or_else(|| tag_language(pre_tag))?;
    Some((language, inner))
}

fn tag_language(tag: &str) -> Option<String> {
    let from_class = attr_value(tag, "class").and_then(|class| {
        LANGUAGE_PREFIXES.iter().find_map(|prefix| {
            class
                .split_whitespace()
                .find_map(|token| token.strip_prefix(prefix))
        })
    });

    let language: String = from_class
        .or_else(|| attr_value(tag, "data-language"))?
        .chars()
        .take_while(|c| c.is_alphanumeric() || matches!(c, '_' | '+' | '#'))
        .collect();
    (!language.is_empty()).then_some(language)
}

// Byte offset of the first `<name` opening tag
fn find_tag(html: &str, name: &str) -> Option<usize> {
    let needle = format!("<{name}");
    let mut from = 0;
    while let Some(pos) = html[from..].find(&needle) {
        let at = from + pos;
        from = at + needle.len();
        match html[from..].chars().next() {
            Some(c) if c == '>' || c.is_whitespace() => return Some(at),
            _ => {}
        }
    }
    None
}

fn attr_value<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{name}=");
    let mut from = 0;
    while let Some(pos) = tag[from..].find(&needle) {
        let at = from + pos;
        from = at + needle.len();
        if !tag[..at].ends_with(char::is_whitespace) {
            continue;
        }

        let value = &tag[from..];
        return match value.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let value = &value[1..];
                value.find(quote).map(|end| &value[..end])
            }
            _ => value
                .split(|c: char| c.is_whitespace() || c == '>')
                .next(),
        };
    }
    None
}

fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.trim_end().to_string()
}

/// Fenced code blocks of a Markdown document, in order
///
/// An unterminated fence runs to the end of the document.
#[must_use]
pub fn extract_code_blocks(markdown: &str) -> Vec<CodeExample> {
    let mut examples = Vec::new();
    let mut open: Option<(String, Vec<&str>)> = None;

    for line in markdown.lines() {
        if let Some(info) = line.trim_start().strip_prefix("```") {
            if let Some((language, lines)) = open.take() {
                examples.push(CodeExample {
                    language,
                    code: lines.join("\n").trim().to_string(),
                });
            } else {
                let language = info.split_whitespace().next().unwrap_or("text");
                open = Some((language.to_string(), Vec::new()));
            }
        } else if let Some((_, lines)) = open.as_mut() {
            lines.push(line);
        }
    }

    if let Some((language, lines)) = open {
        examples.push(CodeExample {
            language,
            code: lines.join("\n").trim().to_string(),
        });
    }

    examples
}
