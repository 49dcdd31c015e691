//! HTML helper functions

/// Markup inserted at the end of each code block
const COPY_BUTTON: &str =
    r#"<button class="copy-button" type="button" aria-label="Copy code">Copy</button>"#;

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Add a copy button to every `<pre>` block in rendered post HTML. The
/// button markup lands just before the closing tag; blocks that already
/// carry one are left alone, so running the pass twice changes nothing.
pub fn attach_copy_buttons(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + 128);
    let mut rest = html;

    loop {
        let Some(start) = rest.find("<pre") else {
            out.push_str(rest);
            break;
        };

        // "<pre" must end the tag name, as in "<pre>" or "<pre style=...>"
        let boundary = rest[start + 4..].chars().next();
        if !matches!(boundary, Some('>') | Some(' ') | Some('\t') | Some('\n')) {
            out.push_str(&rest[..start + 4]);
            rest = &rest[start + 4..];
            continue;
        }

        let Some(end) = rest[start..].find("</pre>").map(|i| start + i) else {
            // unterminated block, pass the tail through untouched
            out.push_str(rest);
            break;
        };

        let block = &rest[start..end];
        out.push_str(block);
        if !block.contains("copy-button") {
            out.push_str(COPY_BUTTON);
        }
        out.push_str("</pre>");
        rest = &rest[end + "</pre>".len()..];
    }

    out
}
