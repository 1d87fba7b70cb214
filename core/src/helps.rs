//! Translation-helps articles and the links between them.
//!
//! Articles live in an explicit [`ResourcesSnapshot`] owned by the caller;
//! following a link reads from the snapshot handed in.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{CheckError, Result};
use crate::types::ContextId;

/// Parsed `<lang>/<type>/<category>/<article>` link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpsLink {
    pub lang: String,
    pub resource_type: String,
    pub category: String,
    pub article: String,
}

impl HelpsLink {
    pub fn parse(link: &str) -> Result<Self> {
        let parts: Vec<&str> = link.trim_matches('/').split('/').collect();
        match parts.as_slice() {
            [lang, resource_type, category, article]
                if parts.iter().all(|part| !part.is_empty()) =>
            {
                Ok(Self {
                    lang: (*lang).to_string(),
                    resource_type: (*resource_type).to_string(),
                    category: (*category).to_string(),
                    article: (*article).to_string(),
                })
            }
            _ => Err(CheckError::InvalidHelpsLink(link.to_string())),
        }
    }

    pub fn resource_dir(&self) -> Option<&'static str> {
        resource_dir_by_type(&self.resource_type)
    }
}

/// Resource directory for a short link type.
pub fn resource_dir_by_type(resource_type: &str) -> Option<&'static str> {
    match resource_type {
        "ta" => Some("translationAcademy"),
        "tw" => Some("translationWords"),
        "tn" => Some("translationNotes"),
        _ => None,
    }
}

/// Loaded helps articles: resource dir → article id → markdown.
#[derive(Debug, Clone, Default)]
pub struct ResourcesSnapshot {
    translation_helps: HashMap<String, HashMap<String, String>>,
}

impl ResourcesSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_article(
        &mut self,
        resource_dir: impl Into<String>,
        article_id: impl Into<String>,
        markdown: impl Into<String>,
    ) {
        self.translation_helps
            .entry(resource_dir.into())
            .or_default()
            .insert(article_id.into(), markdown.into());
    }

    pub fn article(&self, resource_dir: &str, article_id: &str) -> Option<&str> {
        self.translation_helps
            .get(resource_dir)?
            .get(article_id)
            .map(String::as_str)
    }

    /// Read `<root>/<lang>/<resourceDir>/<category>/<article>.md` into the
    /// snapshot. Returns whether an article was found.
    pub fn load_article(
        &mut self,
        root: &Path,
        resource_dir: &str,
        article_id: &str,
        lang: &str,
        category: &str,
    ) -> Result<bool> {
        let path = article_path(root, resource_dir, article_id, lang, category);
        match std::fs::read_to_string(&path) {
            Ok(markdown) => {
                self.insert_article(resource_dir, article_id, markdown);
                Ok(true)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No helps article at {}", path.display());
                Ok(false)
            }
            Err(source) => Err(CheckError::FileRead { path, source }),
        }
    }
}

fn article_path(
    root: &Path,
    resource_dir: &str,
    article_id: &str,
    lang: &str,
    category: &str,
) -> PathBuf {
    root.join(lang)
        .join(resource_dir)
        .join(category)
        .join(format!("{article_id}.md"))
}

/// Content of the expanded helps modal after following a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpsModal {
    pub show: bool,
    pub article_category: String,
    pub article: String,
}

/// Resolve a link against `resources`. A missing article still opens the
/// modal, with a notice naming the link.
pub fn follow_helps_link(link: &str, resources: &ResourcesSnapshot) -> HelpsModal {
    let not_found = |category: String| HelpsModal {
        show: true,
        article_category: category,
        article: format!("Cannot find an article for {link}"),
    };

    let parsed = match HelpsLink::parse(link) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!("{err}");
            return not_found(String::new());
        }
    };
    let article = parsed
        .resource_dir()
        .and_then(|dir| resources.article(dir, &parsed.article));
    match article {
        Some(article) => HelpsModal {
            show: true,
            article_category: parsed.category,
            article: article.to_string(),
        },
        None => not_found(parsed.category),
    }
}

/// Article for the current check: the tool's resource, keyed by group id.
pub fn article_for_context<'a>(
    resources: &'a ResourcesSnapshot,
    context_id: &ContextId,
    tool: &str,
) -> Option<&'a str> {
    resources.article(tool, &context_id.group_id)
}
