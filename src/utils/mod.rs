//! Utility functions module

use crate::error::{Error, Result};
use reqwest::Client;
use std::time::Duration;

/// HTTP client builder
pub struct HttpClientBuilder {
    timeout: Duration,
    connect_timeout: Duration,
    pool_max_idle_per_host: usize,
    user_agent: String,
    max_redirects: usize,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 10,
            user_agent: format!("DevDocsMCP/{}", crate::VERSION),
            max_redirects: 5,
        }
    }
}

impl HttpClientBuilder {
    /// Create a new HTTP client builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set connection timeout
    #[must_use]
    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Build HTTP client
    pub fn build(self) -> Result<Client> {
        Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout.min(self.timeout))
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .user_agent(&self.user_agent)
            .redirect(reqwest::redirect::Policy::limited(self.max_redirects))
            .build()
            .map_err(|e| Error::HttpRequest(e.to_string()))
    }
}

/// String utilities
pub mod string {
    /// Marker appended to truncated content
    pub const TRUNCATION_NOTE: &str = "\n\n... [content truncated]";

    /// Cut `s` to at most `max_chars` characters, preferring a word boundary
    ///
    /// The cut moves back to the last whitespace when one exists in the
    /// final fifth of the allowed length. A note is appended when anything
    /// was removed.
    #[must_use]
    pub fn truncate_at_word(s: &str, max_chars: usize) -> String {
        let Some((byte_end, _)) = s.char_indices().nth(max_chars) else {
            return s.to_string();
        };

        let head = &s[..byte_end];
        let floor = head.len() - head.len() / 5;
        let cut = match head.rfind(char::is_whitespace) {
            Some(pos) if pos >= floor => pos,
            _ => byte_end,
        };

        format!("{}{TRUNCATION_NOTE}", head[..cut].trim_end())
    }
}

/// Time utilities
pub mod time {
    use chrono::{DateTime, Utc};

    /// Format datetime
    #[must_use]
    pub fn format_datetime(dt: &DateTime<Utc>) -> String {
        dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
    }

    /// Current time, formatted
    #[must_use]
    pub fn now_formatted() -> String {
        format_datetime(&Utc::now())
    }
}

/// Validation utilities
pub mod validation {
    use crate::error::Error;

    /// Validate a technology slug such as `python~3.12`
    pub fn validate_technology(slug: &str) -> Result<(), Error> {
        if slug.is_empty() {
            return Err(Error::Other("Technology cannot be empty".to_string()));
        }

        if slug.len() > 100 {
            return Err(Error::Other("Technology is too long".to_string()));
        }

        if !slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '~'))
        {
            return Err(Error::Other(format!(
                "Technology '{slug}' contains invalid characters"
            )));
        }

        Ok(())
    }

    /// Validate a page path
    pub fn validate_page_path(path: &str) -> Result<(), Error> {
        if path.trim().is_empty() {
            return Err(Error::Other("Page path cannot be empty".to_string()));
        }

        if path.len() > 500 {
            return Err(Error::Other("Page path is too long".to_string()));
        }

        if path.split('/').any(|segment| segment == "..") {
            return Err(Error::Other(format!(
                "Page path '{path}' must not contain '..'"
            )));
        }

        Ok(())
    }

    /// Validate search query
    pub fn validate_search_query(query: &str) -> Result<(), Error> {
        if query.trim().is_empty() {
            return Err(Error::Other("Search query cannot be empty".to_string()));
        }

        if query.len() > 200 {
            return Err(Error::Other("Search query is too long".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::string::{truncate_at_word, TRUNCATION_NOTE};
    use super::validation::*;

    #[test]
    fn test_truncate_short_input_untouched() {
        assert_eq!(truncate_at_word("hello world", 50), "hello world");
        assert_eq!(truncate_at_word("", 0), "");
    }

    #[test]
    fn test_truncate_prefers_word_boundary() {
        let text = "alpha beta gamma delta epsilon";
        let cut = truncate_at_word(text, 20);
        assert!(cut.ends_with(TRUNCATION_NOTE));
        assert_eq!(cut.trim_end_matches(TRUNCATION_NOTE), "alpha beta gamma");
    }

    #[test]
    fn test_truncate_without_whitespace_cuts_hard() {
        let text = "x".repeat(30);
        let cut = truncate_at_word(&text, 10);
        assert_eq!(cut.trim_end_matches(TRUNCATION_NOTE), "x".repeat(10));
    }

    #[test]
    fn test_truncate_multibyte() {
        let text = "ééééé ééééé ééééé";
        let cut = truncate_at_word(text, 8);
        assert!(cut.starts_with("ééééé"));
    }

    #[test]
    fn test_validate_technology() {
        assert!(validate_technology("python~3.12").is_ok());
        assert!(validate_technology("vue~3").is_ok());
        assert!(validate_technology("").is_err());
        assert!(validate_technology("bad slug").is_err());
        assert!(validate_technology("../etc").is_err());
    }

    #[test]
    fn test_validate_page_path() {
        assert!(validate_page_path("library/asyncio#asyncio.run").is_ok());
        assert!(validate_page_path("  ").is_err());
        assert!(validate_page_path("../../secret").is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert!(validate_search_query("useState").is_ok());
        assert!(validate_search_query("").is_err());
        assert!(validate_search_query(&"q".repeat(201)).is_err());
    }
}
