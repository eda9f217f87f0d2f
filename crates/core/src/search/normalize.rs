use super::RawSearchHit;
use crate::domain::search::SearchResult;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

pub const MAX_CONTENT_CHARS: usize = 1000;

fn bracketed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[[^\]]*\]|\([^)]*\)").expect("valid bracket regex"))
}

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

/// Drops `[...]` and `(...)` segments and collapses runs of whitespace.
pub fn clean_title(title: &str) -> String {
    let stripped = bracketed().replace_all(title, " ");
    whitespace().replace_all(&stripped, " ").trim().to_string()
}

pub fn truncate_content(content: &str) -> String {
    content.chars().take(MAX_CONTENT_CHARS).collect()
}

/// Host of `url` without a leading `www.`; `None` when the URL does not parse.
pub fn domain_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

pub fn normalize_hit(hit: RawSearchHit) -> SearchResult {
    SearchResult {
        title: clean_title(hit.title.as_deref().unwrap_or_default()),
        content: truncate_content(hit.text.as_deref().unwrap_or_default()),
        url: hit.url,
        published_date: hit.published_date,
        author: hit.author,
    }
}

/// Keeps the first result per URL and per domain, in input order.
pub fn dedup_results(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen_urls = HashSet::new();
    let mut seen_domains = HashSet::new();
    let mut out = Vec::with_capacity(results.len());

    for result in results {
        if seen_urls.contains(&result.url) {
            continue;
        }
        let domain = domain_of(&result.url);
        if let Some(domain) = &domain {
            if seen_domains.contains(domain) {
                continue;
            }
        }

        seen_urls.insert(result.url.clone());
        if let Some(domain) = domain {
            seen_domains.insert(domain);
        }
        out.push(result);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(url: &str, title: &str) -> SearchResult {
        SearchResult {
            url: url.to_string(),
            title: title.to_string(),
            content: String::new(),
            published_date: None,
            author: None,
        }
    }

    #[test]
    fn clean_title_strips_bracketed_segments() {
        assert_eq!(
            clean_title("TCS Q2 results [LIVE]  beat (Reuters)   estimates"),
            "TCS Q2 results beat estimates"
        );
    }

    #[test]
    fn clean_title_is_idempotent() {
        for title in [
            "  Infosys (INFY)  shares [updated] rise ",
            "((nested)) brackets ) stray [ open",
            "(a [b) c] d",
            "plain title",
            "",
        ] {
            let once = clean_title(title);
            assert_eq!(clean_title(&once), once, "title: {title:?}");
        }
    }

    #[test]
    fn truncate_content_caps_at_limit_and_handles_multibyte() {
        let long = "₹".repeat(MAX_CONTENT_CHARS + 50);
        let out = truncate_content(&long);
        assert_eq!(out.chars().count(), MAX_CONTENT_CHARS);

        assert_eq!(truncate_content("short"), "short");
        assert_eq!(truncate_content(""), "");
    }

    #[test]
    fn domain_of_ignores_www_and_case() {
        assert_eq!(
            domain_of("https://WWW.Reuters.com/markets/x").as_deref(),
            Some("reuters.com")
        );
        assert_eq!(domain_of("not a url"), None);
    }

    #[test]
    fn dedup_drops_repeated_urls_and_domains_first_wins() {
        let input = vec![
            result("https://reuters.com/a", "first"),
            result("https://reuters.com/a", "dup url"),
            result("https://www.reuters.com/b", "same domain"),
            result("https://economictimes.com/c", "other"),
        ];

        let out = dedup_results(input);
        let titles: Vec<_> = out.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["first", "other"]);

        let domains: HashSet<_> = out.iter().filter_map(|r| domain_of(&r.url)).collect();
        assert_eq!(domains.len(), out.len());
    }

    #[test]
    fn normalize_hit_cleans_and_truncates() {
        let hit = RawSearchHit {
            url: "https://example.com/x".to_string(),
            title: Some("Title (video)".to_string()),
            text: Some("x".repeat(5000)),
            published_date: Some("2026-10-01".to_string()),
            author: None,
        };
        let out = normalize_hit(hit);
        assert_eq!(out.title, "Title");
        assert_eq!(out.content.len(), MAX_CONTENT_CHARS);
        assert_eq!(out.published_date.as_deref(), Some("2026-10-01"));
    }
}
