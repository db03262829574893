use std::fmt;

use serde::Serialize;

/// A discovered documentation page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

impl Route {
    /// `path` is the URL path below the site root and always starts with `/`.
    pub fn new<S: Into<String>>(path: S, title: Option<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        Self { path, title }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Absolute URL of this page under `base_url`.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url, self.path)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.title {
            Some(title) => write!(f, "{} ({})", self.path, title),
            None => write!(f, "{}", self.path),
        }
    }
}
