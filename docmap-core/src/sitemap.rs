//! Sitemap entries and their serialization.
//!
//! Every route is classified into a crawl priority and change frequency by an
//! ordered rule list. The XML form follows the sitemaps.org protocol:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://docs.incerto.in</loc>
//!     <lastmod>2026-01-01T00:00:00.000Z</lastmod>
//!     <changefreq>daily</changefreq>
//!     <priority>1.0</priority>
//!   </url>
//! </urlset>
//! ```

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::route::Route;

/// XML namespace for sitemap
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Priority of the static site root entry.
pub const ROOT_PRIORITY: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    #[default]
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFrequency::Always => "always",
            ChangeFrequency::Hourly => "hourly",
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
            ChangeFrequency::Yearly => "yearly",
            ChangeFrequency::Never => "never",
        }
    }
}

impl fmt::Display for ChangeFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    #[default]
    Prefix,
}

/// One classification rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub path: String,
    #[serde(rename = "match", default)]
    pub kind: MatchKind,
    pub priority: f32,
    #[serde(default)]
    pub change_frequency: ChangeFrequency,
}

impl Rule {
    pub fn exact<S: Into<String>>(path: S, priority: f32, change_frequency: ChangeFrequency) -> Self {
        Self {
            path: path.into(),
            kind: MatchKind::Exact,
            priority,
            change_frequency,
        }
    }

    pub fn prefix<S: Into<String>>(path: S, priority: f32, change_frequency: ChangeFrequency) -> Self {
        Self {
            path: path.into(),
            kind: MatchKind::Prefix,
            priority,
            change_frequency,
        }
    }

    /// Prefix rules compare raw strings: `/get-started` also matches `/get-started-old`.
    pub fn matches(&self, path: &str) -> bool {
        match self.kind {
            MatchKind::Exact => path == self.path,
            MatchKind::Prefix => path.starts_with(&self.path),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub priority: f32,
    pub change_frequency: ChangeFrequency,
}

/// Maps route paths to crawl hints.
///
/// Exact rules are tried before prefix rules; within each kind the first
/// matching rule in list order wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Classifier {
    pub rules: Vec<Rule>,
    pub default_priority: f32,
    pub default_change_frequency: ChangeFrequency,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            rules: vec![
                Rule::exact("/get-started/quick-start", 1.0, ChangeFrequency::Daily),
                Rule::prefix("/get-started", 0.9, ChangeFrequency::Weekly),
                Rule::prefix("/AI-Basics", 0.8, ChangeFrequency::Weekly),
                Rule::prefix("/database", 0.7, ChangeFrequency::Weekly),
            ],
            default_priority: 0.6,
            default_change_frequency: ChangeFrequency::Weekly,
        }
    }
}

impl Classifier {
    pub fn classify(&self, path: &str) -> Classification {
        let exact = self.rules.iter().filter(|r| r.kind == MatchKind::Exact);
        let prefix = self.rules.iter().filter(|r| r.kind == MatchKind::Prefix);

        exact
            .chain(prefix)
            .find(|rule| rule.matches(path))
            .map(|rule| Classification {
                priority: rule.priority,
                change_frequency: rule.change_frequency,
            })
            .unwrap_or(Classification {
                priority: self.default_priority,
                change_frequency: self.default_change_frequency,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapEntry {
    pub url: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub last_modified: DateTime<Utc>,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sitemap {
    entries: Vec<SitemapEntry>,
}

impl Sitemap {
    /// Build the sitemap for `routes`: the site root first, then one entry per
    /// route in discovery order. All entries share the `generated_at` timestamp.
    pub fn from_routes(
        base_url: &str,
        routes: &[Route],
        classifier: &Classifier,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let base_url = normalize_base_url(base_url);

        let root = SitemapEntry {
            url: base_url.to_string(),
            last_modified: generated_at,
            change_frequency: ChangeFrequency::Daily,
            priority: ROOT_PRIORITY,
        };

        let pages = routes.iter().map(|route| {
            let Classification {
                priority,
                change_frequency,
            } = classifier.classify(route.path());

            SitemapEntry {
                url: route.url(base_url),
                last_modified: generated_at,
                change_frequency,
                priority,
            }
        });

        Self {
            entries: std::iter::once(root).chain(pages).collect(),
        }
    }

    pub fn entries(&self) -> &[SitemapEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Generate sitemap XML string.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.entries.len() * 192);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
        xml.push('\n');

        for entry in &self.entries {
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.url)));
            xml.push_str(&format!(
                "    <lastmod>{}</lastmod>\n",
                format_timestamp(&entry.last_modified)
            ));
            xml.push_str(&format!("    <changefreq>{}</changefreq>\n", entry.change_frequency));
            xml.push_str(&format!("    <priority>{}</priority>\n", format_priority(entry.priority)));
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }

    /// Generate the JSON array form (`url`, `lastModified`, `changeFrequency`, `priority`).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.entries)
    }
}

/// Strip trailing slashes so route paths can be appended directly.
pub fn normalize_base_url(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}

/// Priorities keep every configured digit but always show a fractional part
/// (`1.0`, `0.9`, `0.85`).
pub fn format_priority(priority: f32) -> String {
    let formatted = priority.to_string();
    if formatted.contains('.') {
        formatted
    } else {
        format!("{formatted}.0")
    }
}

/// RFC 3339 with millisecond precision and a `Z` suffix.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_timestamp<S: Serializer>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(timestamp))
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 30, 0).unwrap()
    }

    fn routes(paths: &[&str]) -> Vec<Route> {
        paths.iter().map(|p| Route::new(*p, None)).collect()
    }

    #[test]
    fn test_quick_start_is_top_priority() {
        let classification = Classifier::default().classify("/get-started/quick-start");
        assert_eq!(classification.priority, 1.0);
        assert_eq!(classification.change_frequency, ChangeFrequency::Daily);
    }

    #[test]
    fn test_default_rules() {
        let classifier = Classifier::default();
        let cases = [
            ("/get-started/other", 0.9),
            ("/get-started", 0.9),
            ("/AI-Basics/x", 0.8),
            ("/database/y", 0.7),
            ("/observability/z", 0.6),
            ("/ai-basics/lowercase", 0.6),
        ];

        for (path, priority) in cases {
            let classification = classifier.classify(path);
            assert_eq!(classification.priority, priority, "priority of {path}");
            assert_eq!(classification.change_frequency, ChangeFrequency::Weekly, "frequency of {path}");
        }
    }

    #[test]
    fn test_exact_rules_win_regardless_of_order() {
        let classifier = Classifier {
            rules: vec![
                Rule::prefix("/get-started", 0.9, ChangeFrequency::Weekly),
                Rule::exact("/get-started/quick-start", 1.0, ChangeFrequency::Daily),
            ],
            ..Classifier::default()
        };

        let classification = classifier.classify("/get-started/quick-start");
        assert_eq!(classification.priority, 1.0);
        assert_eq!(classification.change_frequency, ChangeFrequency::Daily);
    }

    #[test]
    fn test_prefix_match_is_raw_string_prefix() {
        let classification = Classifier::default().classify("/database-migrations");
        assert_eq!(classification.priority, 0.7);
    }

    #[test]
    fn test_root_entry_is_prepended() {
        let sitemap = Sitemap::from_routes(
            "https://docs.incerto.in",
            &routes(&["/database/y", "/get-started/quick-start"]),
            &Classifier::default(),
            fixed_time(),
        );

        let entries = sitemap.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].url, "https://docs.incerto.in");
        assert_eq!(entries[0].priority, 1.0);
        assert_eq!(entries[0].change_frequency, ChangeFrequency::Daily);
        assert_eq!(entries[1].url, "https://docs.incerto.in/database/y");
        assert_eq!(entries[1].priority, 0.7);
        assert_eq!(entries[2].url, "https://docs.incerto.in/get-started/quick-start");
        assert_eq!(entries[2].change_frequency, ChangeFrequency::Daily);
        assert!(entries.iter().all(|e| e.last_modified == fixed_time()));
    }

    #[test]
    fn test_trailing_slash_on_base_url() {
        let sitemap = Sitemap::from_routes(
            "https://example.com/",
            &routes(&["/a"]),
            &Classifier::default(),
            fixed_time(),
        );

        assert_eq!(sitemap.entries()[0].url, "https://example.com");
        assert_eq!(sitemap.entries()[1].url, "https://example.com/a");
    }

    #[test]
    fn test_empty_routes_still_have_root() {
        let sitemap = Sitemap::from_routes("https://example.com", &[], &Classifier::default(), fixed_time());
        assert_eq!(sitemap.len(), 1);
    }

    #[test]
    fn test_xml() {
        let sitemap = Sitemap::from_routes(
            "https://example.com",
            &routes(&["/search?q=a&b"]),
            &Classifier::default(),
            fixed_time(),
        );
        let xml = sitemap.to_xml();

        let lines: Vec<&str> = xml.lines().collect();
        assert_eq!(lines[0], r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        assert_eq!(lines[1], format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
        assert_eq!(lines.last().copied(), Some("</urlset>"));

        assert_eq!(xml.matches("<url>").count(), 2);
        assert!(xml.contains("<loc>https://example.com</loc>"));
        assert!(xml.contains("<loc>https://example.com/search?q=a&amp;b</loc>"));
        assert!(xml.contains("<lastmod>2025-01-01T12:30:00.000Z</lastmod>"));
        assert!(xml.contains("<changefreq>daily</changefreq>"));
        assert!(xml.contains("<changefreq>weekly</changefreq>"));
        assert!(xml.contains("<priority>1.0</priority>"));
        assert!(xml.contains("<priority>0.6</priority>"));
    }

    #[test]
    fn test_json() {
        let sitemap = Sitemap::from_routes(
            "https://example.com",
            &routes(&["/AI-Basics/x"]),
            &Classifier::default(),
            fixed_time(),
        );
        let json: serde_json::Value = serde_json::from_str(&sitemap.to_json().unwrap()).unwrap();

        assert_eq!(json[1]["url"], "https://example.com/AI-Basics/x");
        assert_eq!(json[1]["lastModified"], "2025-01-01T12:30:00.000Z");
        assert_eq!(json[1]["changeFrequency"], "weekly");
        assert!((json[1]["priority"].as_f64().unwrap() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_configured_priority_is_not_rounded() {
        let classifier = Classifier {
            rules: vec![Rule::prefix("/guides", 0.85, ChangeFrequency::Monthly)],
            ..Classifier::default()
        };
        let sitemap = Sitemap::from_routes(
            "https://example.com",
            &routes(&["/guides/setup"]),
            &classifier,
            fixed_time(),
        );

        assert!(sitemap.to_xml().contains("<priority>0.85</priority>"));
        let json: serde_json::Value = serde_json::from_str(&sitemap.to_json().unwrap()).unwrap();
        assert!((json[1]["priority"].as_f64().unwrap() - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("hello"), "hello");
        assert_eq!(escape_xml("<a href=\"x\">'&'</a>"), "&lt;a href=&quot;x&quot;&gt;&apos;&amp;&apos;&lt;/a&gt;");
    }

    #[test]
    fn test_format_priority() {
        assert_eq!(format_priority(1.0), "1.0");
        assert_eq!(format_priority(0.9), "0.9");
        assert_eq!(format_priority(0.6), "0.6");
        assert_eq!(format_priority(0.85), "0.85");
        assert_eq!(format_priority(0.0), "0.0");
    }

    #[test]
    fn test_rule_deserialization_defaults() {
        let rule: Rule = serde_json::from_str(r#"{"path": "/guides", "priority": 0.5}"#).unwrap();
        assert_eq!(rule.kind, MatchKind::Prefix);
        assert_eq!(rule.change_frequency, ChangeFrequency::Weekly);

        let rule: Rule =
            serde_json::from_str(r#"{"path": "/", "match": "exact", "priority": 1.0, "change_frequency": "hourly"}"#)
                .unwrap();
        assert_eq!(rule.kind, MatchKind::Exact);
        assert_eq!(rule.change_frequency, ChangeFrequency::Hourly);
    }
}
