//! Markdown rendering with syntax highlighting

use crate::helpers::html::html_escape;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

/// A code block being buffered while its events stream by
struct CodeBuffer {
    lang: Option<String>,
    text: String,
}

/// Renders markdown bodies to HTML, highlighting fenced code blocks
/// with syntect
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    highlight: bool,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", true)
    }

    /// Create with a theme name and a highlighting toggle
    pub fn with_options(theme: &str, highlight: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            highlight,
        }
    }

    /// Render a markdown body to HTML. Code blocks come back as
    /// pre-highlighted HTML; everything else passes through
    /// pulldown-cmark untouched.
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, markdown_options());

        let mut events: Vec<Event> = Vec::new();
        let mut buffer: Option<CodeBuffer> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(token) if !token.is_empty() => {
                            Some(token.to_string())
                        }
                        _ => None,
                    };
                    buffer = Some(CodeBuffer {
                        lang,
                        text: String::new(),
                    });
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some(block) = buffer.take() {
                        let rendered = self.highlight_code(&block.text, block.lang.as_deref());
                        events.push(Event::Html(CowStr::from(rendered)));
                    }
                }
                Event::Text(text) => match buffer.as_mut() {
                    Some(block) => block.text.push_str(&text),
                    None => events.push(Event::Text(text)),
                },
                other => events.push(other),
            }
        }

        let mut out = String::new();
        html::push_html(&mut out, events.into_iter());
        out
    }

    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");
        if !self.highlight {
            return plain_code_block(code, lang);
        }

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        // An unknown theme falls back to the first bundled one; no
        // theme at all falls back to the plain block
        let Some(theme) = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
        else {
            return plain_code_block(code, lang);
        };

        // syntect emits a complete styled <pre> block
        highlighted_html_for_string(code, &self.syntax_set, syntax, theme)
            .unwrap_or_else(|_| plain_code_block(code, lang))
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Parser options. YAML metadata stays off since front-matter is split
/// away before the body reaches the renderer.
fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_SMART_PUNCTUATION
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_DEFINITION_LIST
        | Options::ENABLE_GFM
}

fn plain_code_block(code: &str, lang: &str) -> String {
    format!(
        r#"<pre><code class="language-{}">{}</code></pre>"#,
        lang,
        html_escape(code)
    )
}
