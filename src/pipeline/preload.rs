//! Module Preload - `<link rel="modulepreload">` fallback for environments without it.
//!
//! Each matching link is processed at most once and turns into a
//! [`FetchRequest`] in an outbox. The host performs the fetches; nothing here
//! touches the network.

use std::collections::HashSet;

use log::trace;

use crate::dom::Document;
use crate::types::ElementId;

const REL_MODULEPRELOAD: &str = "modulepreload";

/// Credentials mode for a preload fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Credentials {
    Include,
    Omit,
    #[default]
    SameOrigin,
}

impl Credentials {
    /// Map a `crossorigin` attribute value.
    pub fn from_cross_origin(cross_origin: Option<&str>) -> Self {
        match cross_origin {
            Some("use-credentials") => Self::Include,
            Some("anonymous") => Self::Omit,
            _ => Self::SameOrigin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchOptions {
    pub integrity: Option<String>,
    pub referrer_policy: Option<String>,
    pub credentials: Credentials,
}

impl FetchOptions {
    pub fn from_link(doc: &Document, link: ElementId) -> Self {
        let non_empty = |name: &str| {
            doc.get_attribute(link, name)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        Self {
            integrity: non_empty("integrity"),
            referrer_policy: non_empty("referrerpolicy"),
            credentials: Credentials::from_cross_origin(doc.get_attribute(link, "crossorigin")),
        }
    }
}

/// A fetch the host should perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub href: String,
    pub options: FetchOptions,
}

#[derive(Debug, Default)]
pub struct ModulePreloader {
    native: bool,
    processed: HashSet<ElementId>,
    outbox: Vec<FetchRequest>,
}

impl ModulePreloader {
    /// `native` = the environment already handles modulepreload; stay idle.
    pub fn new(native: bool) -> Self {
        Self {
            native,
            ..Self::default()
        }
    }

    pub fn is_modulepreload(doc: &Document, id: ElementId) -> bool {
        doc.tag(id) == Some("link") && doc.get_attribute(id, "rel") == Some(REL_MODULEPRELOAD)
    }

    /// Process every modulepreload link currently in the document.
    pub fn scan(&mut self, doc: &Document) {
        if self.native {
            return;
        }
        for link in doc.query_all(|el| el.tag() == "link") {
            if Self::is_modulepreload(doc, link) {
                self.process(doc, link);
            }
        }
    }

    /// Process newly added nodes. Only the nodes themselves are checked, not their subtrees.
    pub fn nodes_added(&mut self, doc: &Document, added: &[ElementId]) {
        if self.native {
            return;
        }
        for node in added {
            if Self::is_modulepreload(doc, *node) {
                self.process(doc, *node);
            }
        }
    }

    fn process(&mut self, doc: &Document, link: ElementId) {
        if !self.processed.insert(link) {
            return;
        }
        let href = doc.get_attribute(link, "href").unwrap_or_default().to_string();
        trace!("preload: {href}");
        self.outbox.push(FetchRequest {
            href,
            options: FetchOptions::from_link(doc, link),
        });
    }

    /// Take the queued requests.
    pub fn drain_requests(&mut self) -> Vec<FetchRequest> {
        std::mem::take(&mut self.outbox)
    }
}
