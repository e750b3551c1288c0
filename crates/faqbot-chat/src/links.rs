//! Search links appended to every reply.
//!
//! Built from the raw user query only. The search engines are never called.

pub const ARTICLE_SITES: &str =
    "site:geeksforgeeks.org OR site:medium.com OR site:stackexchange.com";

const WEB_SEARCH_URL: &str = "https://www.google.com/search?q=";
const VIDEO_SEARCH_URL: &str = "https://www.youtube.com/results?search_query=";

/// Web search restricted to the article sites.
pub fn article_search_url(query: &str) -> String {
    let search_query = format!("{} {}", query, ARTICLE_SITES);
    format!("{}{}", WEB_SEARCH_URL, urlencoding::encode(&search_query))
}

pub fn video_search_url(query: &str) -> String {
    format!("{}{}", VIDEO_SEARCH_URL, urlencoding::encode(query))
}

/// Markdown link to related articles.
pub fn articles_link(query: &str) -> String {
    format!("[Search related articles here]({})", article_search_url(query))
}

/// Markdown link to related videos.
pub fn videos_link(query: &str) -> String {
    format!("[Watch related videos on YouTube]({})", video_search_url(query))
}
