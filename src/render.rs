//! Article rendering
//!
//! Turns a stored post or comment into the header block and body a news
//! reader expects (RFC 5536 style), and into the one-line XOVER summary.

use chrono::DateTime;

use crate::config::ArticleConfig;
use crate::constants::article::DATE_FORMAT;
use crate::content::{ContentKind, ContentObject};
use crate::error::RenderError;
use crate::spool::ContentIndex;

/// A rendered article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// `Name: value` lines in wire order, without line terminators
    pub headers: Vec<String>,
    pub body: String,
    /// Fields repeated in the overview line
    pub subject: String,
    pub from: String,
    pub date: String,
    pub message_id: String,
    pub references: String,
}

impl Article {
    /// Header block, one `\n`-terminated line per header
    #[must_use]
    pub fn header_text(&self) -> String {
        let mut text = String::new();
        for header in &self.headers {
            text.push_str(header);
            text.push('\n');
        }
        text
    }

    /// Body line count as reported in `Lines:`
    #[must_use]
    pub fn lines(&self) -> usize {
        count_lines(&self.body)
    }

    #[must_use]
    pub fn bytes(&self) -> usize {
        self.body.len()
    }

    /// Tab-separated XOVER line (no terminator)
    #[must_use]
    pub fn overview(&self, number: u64) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            number,
            overview_field(&self.subject),
            overview_field(&self.from),
            self.date,
            self.message_id,
            self.references,
            self.bytes(),
            self.lines()
        )
    }
}

/// Renders content objects into articles
pub trait ContentRenderer: Send + Sync {
    /// Render `object`; `index` supplies ancestors for `References`
    fn render(&self, index: &ContentIndex, object: &ContentObject) -> Result<Article, RenderError>;

    /// Message-id announced for an object id
    fn message_id(&self, id: &str) -> String;

    /// Object id named by a bracketed message-id, `None` if not bracketed
    fn object_id<'a>(&self, message_id: &'a str) -> Option<&'a str>;
}

/// Default renderer producing `<id@domain>` message-ids
#[derive(Debug, Clone)]
pub struct RfcRenderer {
    domain: String,
    path: String,
}

impl RfcRenderer {
    #[must_use]
    pub fn new(config: &ArticleConfig) -> Self {
        Self {
            domain: config.message_id_domain.clone(),
            path: config.path.clone(),
        }
    }
}

impl Default for RfcRenderer {
    fn default() -> Self {
        Self::new(&ArticleConfig::default())
    }
}

impl ContentRenderer for RfcRenderer {
    fn render(&self, index: &ContentIndex, object: &ContentObject) -> Result<Article, RenderError> {
        let id = object.id().unwrap_or_default();
        let missing = |field: &'static str| RenderError::MissingField {
            id: id.to_string(),
            field,
        };

        let from = object.author().ok_or_else(|| missing("author"))?.to_string();
        let created = object
            .created_at()
            .ok_or_else(|| missing("created_utc"))?;
        let date = DateTime::from_timestamp(created, 0)
            .ok_or_else(|| missing("created_utc"))?
            .format(DATE_FORMAT)
            .to_string();
        let message_id = self.message_id(id);
        let title = object.title().unwrap_or_default();

        match object.kind {
            ContentKind::Comment => {
                let body = object
                    .str_field("body")
                    .ok_or_else(|| missing("body"))?
                    .to_string();
                let subject = format!("Re: {}", title);
                let references = index
                    .build_references(object)
                    .into_iter()
                    .map(|ancestor| self.message_id(ancestor))
                    .collect::<Vec<_>>()
                    .join(" ");
                let group = object.group().unwrap_or_default();

                let mut headers = vec![
                    format!("From: {}", from),
                    format!("Subject: {}", subject),
                    format!("Lines: {}", count_lines(&body)),
                    format!("Date: {}", date),
                    format!("Message-Id: {}", message_id),
                ];
                if !references.is_empty() {
                    headers.push(format!("References: {}", references));
                }
                headers.extend([
                    format!("Newsgroups: {}", group),
                    format!("Path: {}", self.path),
                    "Content-Type: text/plain; charset=UTF-8".to_string(),
                ]);

                Ok(Article {
                    headers,
                    body,
                    subject,
                    from,
                    date,
                    message_id,
                    references,
                })
            }
            ContentKind::Post => {
                let body = object
                    .str_field("selftext")
                    .filter(|text| !text.is_empty())
                    .or_else(|| object.str_field("url"))
                    .ok_or_else(|| missing("selftext"))?
                    .to_string();
                let mut groups = vec![object.group().unwrap_or_default()];
                groups.extend(object.crosspost_groups());

                let headers = vec![
                    format!("From: {}", from),
                    format!("Subject: {}", title),
                    format!("Date: {}", date),
                    format!("Lines: {}", count_lines(&body)),
                    format!("Message-Id: {}", message_id),
                    format!("Newsgroups: {}", groups.join(",")),
                    format!("Path: {}", self.path),
                    "Content-Type: text/plain; charset=UTF-8".to_string(),
                ];

                Ok(Article {
                    headers,
                    body,
                    subject: title.to_string(),
                    from,
                    date,
                    message_id,
                    references: String::new(),
                })
            }
            other => Err(RenderError::NotAnArticle {
                id: id.to_string(),
                kind: other.to_string(),
            }),
        }
    }

    fn message_id(&self, id: &str) -> String {
        format!("<{}@{}>", id, self.domain)
    }

    fn object_id<'a>(&self, message_id: &'a str) -> Option<&'a str> {
        let inner = message_id.strip_prefix('<')?.strip_suffix('>')?;
        let id = match inner.rsplit_once('@') {
            Some((id, domain)) if domain == self.domain => id,
            Some(_) => return None,
            None => inner,
        };
        (!id.is_empty()).then_some(id)
    }
}

/// `Lines:` value: newline count plus one
fn count_lines(body: &str) -> usize {
    memchr::memchr_iter(b'\n', body.as_bytes()).count() + 1
}

/// Overview fields may not contain tabs or line breaks
fn overview_field(value: &str) -> String {
    value
        .chars()
        .map(|c| if matches!(c, '\t' | '\r' | '\n') { ' ' } else { c })
        .collect()
}
