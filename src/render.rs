use std::fmt::Write as _;

use crate::{escape_html, search_href, Pagination, SearchParams, SearchRecord, SearchResults, PAGE_SIZE};

pub(crate) const SITE_TITLE: &str = "Collective DAO Archive Catalog";
pub(crate) const SITE_TAGLINE: &str = "An open source index of DAO historical events.";

/// Inline tags a backend headline may use to mark matched terms.
const HEADLINE_TAGS: &[&str] = &["b", "strong", "em", "i", "mark"];

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        escape_html(title)
    )
}

pub(crate) fn landing_page() -> String {
    let body = format!(
        "<main class=\"flex min-h-screen flex-col items-center p-8 md:p-24\">\n\
         <h1 class=\"text-3xl font-bold text-center\">{SITE_TITLE}</h1>\n\
         <p class=\"text-center\">{SITE_TAGLINE}</p>\n\
         <button class=\"btn btn-primary mt-10\" disabled>Coming Soon!</button>\n\
         <p class=\"mt-4\"><a href=\"/search\">Browse the catalog</a></p>\n\
         </main>"
    );
    layout(SITE_TITLE, &body)
}

/// Escape a backend headline while keeping bare highlight tags such as `<b>`.
///
/// Allowed tags are kept balanced. A closing tag only closes a tag that is
/// still open, closing any tags opened after it first; otherwise it stays
/// escaped. Tags left open are closed at the end. Tags with attributes stay
/// escaped.
pub(crate) fn sanitize_headline(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut open: Vec<&'static str> = Vec::new();
    let mut rest = raw;
    while let Some(pos) = rest.find('<') {
        out.push_str(&escape_html(&rest[..pos]));
        rest = &rest[pos..];
        match highlight_tag(rest) {
            Some((tag, false, len)) => {
                let _ = write!(out, "<{tag}>");
                open.push(tag);
                rest = &rest[len..];
            }
            Some((tag, true, len)) if open.contains(&tag) => {
                while let Some(top) = open.pop() {
                    let _ = write!(out, "</{top}>");
                    if top == tag {
                        break;
                    }
                }
                rest = &rest[len..];
            }
            _ => {
                out.push_str("&lt;");
                rest = &rest[1..];
            }
        }
    }
    out.push_str(&escape_html(rest));
    while let Some(tag) = open.pop() {
        let _ = write!(out, "</{tag}>");
    }
    out
}

/// Match `<tag>` or `</tag>` for an allowed highlight tag at the start of
/// `s`, returning the tag, whether it closes, and the matched length.
fn highlight_tag(s: &str) -> Option<(&'static str, bool, usize)> {
    let closing = s.starts_with("</");
    let start = if closing { 2 } else { 1 };
    let end = s.find('>')?;
    let name = s.get(start..end)?;
    HEADLINE_TAGS
        .iter()
        .find(|tag| tag.eq_ignore_ascii_case(name))
        .map(|tag| (*tag, closing, end + 1))
}

fn record_card(record: &SearchRecord) -> String {
    let title = escape_html(record.title.as_deref().unwrap_or_default());
    let organization = record.organization.as_deref().unwrap_or_default();
    let headline = record.headline.as_deref().unwrap_or_default();
    let key = record
        .id
        .as_ref()
        .map(|id| format!(" data-record-id=\"{}\"", escape_html(&id.to_string())))
        .unwrap_or_default();
    let heading = match record.slug.as_deref().filter(|slug| !slug.is_empty()) {
        Some(slug) => format!(
            "<a href=\"/records/{}\"><span class=\"font-bold\">{title}</span></a>",
            escape_html(&urlencoding::encode(slug))
        ),
        None => format!("<span class=\"font-bold\">{title}</span>"),
    };
    format!(
        "<div class=\"border-t-base-200 border-t-[10px] py-6\"{key}>\n\
         <h2 class=\"text-xl mb-2\">{heading}</h2>\n\
         <p><span class=\"italic\">{}</span></p>\n\
         <p class=\"mt-4\"><span class=\"italic\">{}</span></p>\n\
         </div>",
        escape_html(organization),
        sanitize_headline(headline),
    )
}

fn pager_button(label: &str, target: Option<String>) -> String {
    match target {
        Some(href) => format!(
            "<a class=\"btn btn-primary\" href=\"{}\">{label}</a>",
            escape_html(&href)
        ),
        None => format!(
            "<button class=\"btn btn-primary cursor-not-allowed\" disabled>{label}</button>"
        ),
    }
}

fn pager(params: &SearchParams, pagination: &Pagination) -> String {
    let previous = pager_button(
        "Previous",
        pagination.previous_page().map(|page| search_href(&params.q, page)),
    );
    let next = pager_button(
        "Next",
        pagination.next_page().map(|page| search_href(&params.q, page)),
    );
    format!(
        "<div class=\"flex justify-between items-center mt-8 gap-4\">\n{previous}\n\
         <p class=\"text-gray-700 flex flex-col gap-2\">Page {} of {}</p>\n{next}\n</div>",
        pagination.current_page, pagination.total_pages
    )
}

pub(crate) fn search_page(params: &SearchParams, results: &SearchResults) -> String {
    let pagination = Pagination::new(params.page, results.total_count, PAGE_SIZE);

    let mut body = String::new();
    body.push_str("<div class=\"flex flex-col items-center p-8 md:px-24\">\n");
    let _ = write!(
        body,
        "<form class=\"flex flex-col sm:flex-row w-full mt-12\" method=\"get\" action=\"/search\">\n\
         <input type=\"text\" name=\"q\" value=\"{}\" class=\"grow p-2 px-6 border-2 border-primary\" placeholder=\"Search...\">\n\
         <button type=\"submit\" class=\"btn btn-primary rounded-none\">SEARCH</button>\n\
         </form>\n",
        escape_html(&params.q)
    );

    body.push_str("<div class=\"container mx-auto w-[1150px] max-w-[90%] mt-14\">\n");
    if let Some((first, last)) = pagination.shown_range() {
        let _ = writeln!(
            body,
            "<p class=\"text-sm mb-4\">Showing {first}\u{2013}{last} of {}</p>",
            pagination.total_count
        );
    }
    body.push_str("<div class=\"grid md:grid-cols-3 gap-8\">\n");
    for record in &results.records {
        body.push_str(&record_card(record));
        body.push('\n');
    }
    body.push_str("</div>\n</div>\n");

    body.push_str(&pager(params, &pagination));
    body.push_str("\n</div>");

    let title = if params.q.is_empty() {
        format!("Search | {SITE_TITLE}")
    } else {
        format!("{} | {SITE_TITLE}", params.q)
    };
    layout(&title, &body)
}

pub(crate) fn not_found_page(path: &str) -> String {
    let body = format!(
        "<main class=\"flex flex-col items-center p-8\">\n<h1>Not Found</h1>\n\
         <p>No page at <code>{}</code>.</p>\n<p><a href=\"/\">Home</a></p>\n</main>",
        escape_html(path)
    );
    layout("Not Found", &body)
}

pub(crate) fn method_not_allowed_page() -> String {
    layout(
        "Method Not Allowed",
        "<main class=\"flex flex-col items-center p-8\">\n<h1>Method Not Allowed</h1>\n</main>",
    )
}
