use crate::parsers::text::normalize_lines;
use scraper::ElementRef;

/// Elements rendered on their own line
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tr", "ul",
];

/// Elements whose text is never rendered
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Approximates the rendered text of an element from static markup.
///
/// Block elements and `<br>` break lines the way a browser's `innerText`
/// does, so multi-line blocks keep their line structure.
pub fn inner_text(element: ElementRef) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    normalize_lines(&out)
}

fn collect_text(element: ElementRef, out: &mut String) {
    let name = element.value().name();
    if SKIPPED_ELEMENTS.contains(&name) {
        return;
    }
    if name == "br" {
        out.push('\n');
        return;
    }

    let block = BLOCK_ELEMENTS.contains(&name);
    if block {
        out.push('\n');
    }
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            collect_text(child, out);
        }
    }
    if block {
        out.push('\n');
    }
}

/// Whether the element or one of its ancestors is hidden by markup
pub fn is_hidden(element: ElementRef) -> bool {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .any(|el| {
            let value = el.value();
            value.attr("hidden").is_some()
                || value
                    .attr("style")
                    .map(|style| style.replace(' ', "").contains("display:none"))
                    .unwrap_or(false)
        })
}

/// Whether a control carries the `disabled` attribute
pub fn is_disabled(element: ElementRef) -> bool {
    element.value().attr("disabled").is_some()
        || element.value().attr("aria-disabled") == Some("true")
}
