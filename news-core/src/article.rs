use serde::{Deserialize, Serialize};

/// Outlet an article was published by, as reported by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// A single news article.
///
/// Treated as an immutable value everywhere: it is created when a response
/// is decoded or a bookmark is read back, and replaced rather than edited.
/// The URL is the identity key for both list diffing and the bookmark
/// store; full structural equality decides whether a row's content changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub source: Source,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub url_to_image: Option<String>,
    /// Publication timestamp exactly as the API sent it; opaque text,
    /// never parsed locally.
    pub published_at: Option<String>,
}

impl Article {
    /// Two articles are the same logical item when their URLs match,
    /// whatever the other fields say.
    pub fn is_same_item(&self, other: &Article) -> bool {
        self.url == other.url
    }
}

/// One page of a feed as returned by the remote API, together with the
/// status text and the result count for the whole query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsPage {
    pub status: String,
    pub total_results: u64,
    pub articles: Vec<Article>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(url: &str, title: &str) -> Article {
        Article {
            source: Source {
                id: None,
                name: "wire".into(),
            },
            title: title.into(),
            description: None,
            url: url.into(),
            url_to_image: None,
            published_at: None,
        }
    }

    #[test]
    fn identity_follows_url_only() {
        let a = article("https://example.com/1", "first");
        let b = article("https://example.com/1", "retitled");
        let c = article("https://example.com/2", "first");

        assert!(a.is_same_item(&b));
        assert!(!a.is_same_item(&c));
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn decodes_the_wire_envelope() {
        let body = r#"{
            "status": "ok",
            "totalResults": 2,
            "articles": [{
                "source": {"id": "the-wire", "name": "The Wire"},
                "title": "Headline",
                "description": null,
                "url": "https://example.com/a",
                "urlToImage": "https://example.com/a.jpg",
                "publishedAt": "2024-05-01T10:00:00Z"
            }]
        }"#;

        let page: NewsPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.status, "ok");
        assert_eq!(page.total_results, 2);
        assert_eq!(page.articles.len(), 1);
        assert_eq!(page.articles[0].source.name, "The Wire");
        assert_eq!(
            page.articles[0].published_at.as_deref(),
            Some("2024-05-01T10:00:00Z")
        );
    }
}
