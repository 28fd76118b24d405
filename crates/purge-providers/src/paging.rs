use reqwest::header::{HeaderMap, LINK};

/// Page number of the `rel="next"` entry in a GitHub `Link` header.
pub(crate) fn next_page(headers: &HeaderMap) -> Option<u32> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',')
        .filter_map(|entry| {
            let (target, params) = entry.split_once(';')?;
            params
                .split(';')
                .any(|param| param.trim() == r#"rel="next""#)
                .then_some(target)
        })
        .find_map(|target| {
            let url = target.trim().trim_start_matches('<').trim_end_matches('>');
            page_param(url)
        })
}

fn page_param(url: &str) -> Option<u32> {
    let (_, query) = url.split_once('?')?;
    query.split('&').find_map(|pair| match pair.split_once('=') {
        Some(("page", value)) => value.parse().ok(),
        _ => None,
    })
}
