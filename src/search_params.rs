use url::form_urlencoded;

use crate::parse_page;

/// Query-string state of the catalog page: the search text and the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SearchParams {
    pub(crate) q: String,
    pub(crate) page: u64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            q: String::new(),
            page: 1,
        }
    }
}

impl SearchParams {
    /// Decode `q` and `page` from a raw query string (without the leading `?`).
    /// Repeated keys keep the first occurrence.
    pub(crate) fn from_query_string(query: &str) -> Self {
        let mut q = None;
        let mut page = None;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "q" if q.is_none() => q = Some(value.into_owned()),
                "page" if page.is_none() => page = Some(value.into_owned()),
                _ => {}
            }
        }
        Self {
            q: q.unwrap_or_default(),
            page: parse_page(page.as_deref()),
        }
    }

    /// Split a request URL into path and parsed params.
    pub(crate) fn from_url(url: &str) -> (&str, Self) {
        match url.split_once('?') {
            Some((path, query)) => (path, Self::from_query_string(query)),
            None => (url, Self::default()),
        }
    }
}

/// Link to a catalog page. The first page carries no `page` parameter,
/// matching what the search form submits.
pub(crate) fn search_href(q: &str, page: u64) -> String {
    let q = urlencoding::encode(q);
    if page <= 1 {
        format!("/search?q={q}")
    } else {
        format!("/search?q={q}&page={page}")
    }
}

pub(crate) fn backend_search_url(base: &str, q: &str, page: u64) -> String {
    format!(
        "{}/api/search?q={}&page={page}",
        base.trim_end_matches('/'),
        urlencoding::encode(q)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_query_and_page() {
        let params = SearchParams::from_query_string("q=guiding+principles&page=2");
        assert_eq!(params.q, "guiding principles");
        assert_eq!(params.page, 2);
    }

    #[test]
    fn missing_values_default() {
        assert_eq!(SearchParams::from_query_string(""), SearchParams::default());
        let params = SearchParams::from_query_string("page=oops");
        assert_eq!(params.q, "");
        assert_eq!(params.page, 1);
    }

    #[test]
    fn first_occurrence_wins() {
        let params = SearchParams::from_query_string("q=a&q=b&page=3&page=9");
        assert_eq!(params.q, "a");
        assert_eq!(params.page, 3);
    }

    #[test]
    fn percent_decoding() {
        let params = SearchParams::from_query_string("q=dao%20%26%20governance");
        assert_eq!(params.q, "dao & governance");
    }

    #[test]
    fn from_url_splits_path() {
        let (path, params) = SearchParams::from_url("/search?q=index&page=4");
        assert_eq!(path, "/search");
        assert_eq!(params.q, "index");
        assert_eq!(params.page, 4);

        let (path, params) = SearchParams::from_url("/");
        assert_eq!(path, "/");
        assert_eq!(params, SearchParams::default());
    }

    #[test]
    fn search_href_omits_first_page() {
        assert_eq!(search_href("index coop", 1), "/search?q=index%20coop");
        assert_eq!(search_href("index coop", 3), "/search?q=index%20coop&page=3");
        assert_eq!(search_href("", 2), "/search?q=&page=2");
    }

    #[test]
    fn search_href_survives_round_trip() {
        let href = search_href("a&b=c", 5);
        let (_, params) = SearchParams::from_url(&href);
        assert_eq!(params.q, "a&b=c");
        assert_eq!(params.page, 5);
    }

    #[test]
    fn backend_url_encodes_query() {
        assert_eq!(
            backend_search_url("http://backend:8000/", "conflict & resolution", 2),
            "http://backend:8000/api/search?q=conflict%20%26%20resolution&page=2"
        );
        assert_eq!(
            backend_search_url("http://backend:8000", "", 1),
            "http://backend:8000/api/search?q=&page=1"
        );
    }
}
