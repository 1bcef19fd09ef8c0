//! Directory index pages: fetch a page and pick out the links whose text
//! matches a pattern.

use crate::error::{ProcessingError, Result};
use crate::harvester::retry::RetryPolicy;
use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Url};
use tracing::debug;

/// An anchor found on an index page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Visible link text, e.g. `2020.01.15/`
    pub label: String,
    /// Target as absolute URL once resolved against the page
    pub href: String,
}

impl Link {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Links on the page at `url` whose label matches `pattern`, in page order
    async fn fetch(&self, url: &str, pattern: &Regex) -> Result<Vec<Link>>;
}

/// Tag-level anchor scanning. Enough for Apache-style directory listings;
/// not a general HTML parser.
pub struct LinkExtractor {
    anchor: Regex,
    tag: Regex,
}

impl LinkExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            anchor: Regex::new(
                r#"(?is)<a\s[^>]*?href\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))[^>]*>(.*?)</a\s*>"#,
            )?,
            tag: Regex::new(r"(?s)<[^>]*>")?,
        })
    }

    pub fn extract(&self, html: &str, pattern: &Regex) -> Vec<Link> {
        self.anchor
            .captures_iter(html)
            .filter_map(|caps| {
                let href = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .or_else(|| caps.get(3))?
                    .as_str();
                let inner = caps.get(4).map_or("", |m| m.as_str());
                let label = decode_entities(self.tag.replace_all(inner, "").trim());

                pattern
                    .is_match(&label)
                    .then(|| Link::new(label, decode_entities(href)))
            })
            .collect()
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Resolve `href` against the page it was found on
pub fn resolve_href(page_url: &str, href: &str) -> Result<String> {
    let base = Url::parse(page_url).map_err(|e| ProcessingError::InvalidUrl {
        url: page_url.to_string(),
        message: e.to_string(),
    })?;
    let resolved = base.join(href).map_err(|e| ProcessingError::InvalidUrl {
        url: href.to_string(),
        message: e.to_string(),
    })?;
    Ok(resolved.to_string())
}

pub struct HttpPageFetcher {
    client: Client,
    credentials: Option<(String, String)>,
    retry: RetryPolicy,
    extractor: LinkExtractor,
}

impl HttpPageFetcher {
    pub fn new(
        client: Client,
        credentials: Option<(String, String)>,
        retry: RetryPolicy,
    ) -> Result<Self> {
        Ok(Self {
            client,
            credentials,
            retry,
            extractor: LinkExtractor::new()?,
        })
    }

    async fn get_page(&self, url: &str) -> Result<String> {
        let mut request = self.client.get(url);
        if let Some((user, pass)) = &self.credentials {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request.send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str, pattern: &Regex) -> Result<Vec<Link>> {
        let html = self.retry.run(url, || self.get_page(url)).await?;

        let links = self
            .extractor
            .extract(&html, pattern)
            .into_iter()
            .map(|link| {
                let href = resolve_href(url, &link.href)?;
                Ok(Link::new(link.label, href))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(url, matched = links.len(), "Fetched index page");
        Ok(links)
    }
}
