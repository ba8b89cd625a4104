//! Request classification.
//!
//! [`classify`] maps an intercepted request to the [`RequestClass`] the
//! strategy engine dispatches on. Rules are checked in order and the first
//! match wins:
//!
//! 1. non-`http`/`https` scheme: [`RequestClass::Passthrough`]
//! 2. path contains an API marker (`.php`, `/api/`): [`RequestClass::Api`]
//! 3. declared kind is style, script, image or font: [`RequestClass::StaticAsset`]
//! 4. declared kind is document, or path ends in `.html`: [`RequestClass::Document`]
//! 5. anything else: [`RequestClass::Default`]

use std::sync::LazyLock;

use offbox_core::{RequestClass, RequestDescriptor, ResourceKind};
use serde::{Deserialize, Serialize};

static DEFAULT_RULES: LazyLock<ClassifierRules> = LazyLock::new(ClassifierRules::default);

/// Configurable marker lists used by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierRules {
    /// Substrings of the URL path that mark an API call.
    pub api_markers: Vec<String>,
    /// Path suffixes that mark an HTML document.
    pub document_suffixes: Vec<String>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            api_markers: vec![".php".to_owned(), "/api/".to_owned()],
            document_suffixes: vec![".html".to_owned()],
        }
    }
}

impl ClassifierRules {
    /// Classifies `request` against these rules. Pure and infallible.
    pub fn classify(&self, request: &RequestDescriptor) -> RequestClass {
        let url = request.url();
        if !matches!(url.scheme(), "http" | "https") {
            return RequestClass::Passthrough;
        }

        let path = url.path();
        if self.api_markers.iter().any(|m| path.contains(m.as_str())) {
            return RequestClass::Api;
        }

        match request.kind() {
            ResourceKind::Style | ResourceKind::Script | ResourceKind::Image | ResourceKind::Font => {
                RequestClass::StaticAsset
            }
            ResourceKind::Document => RequestClass::Document,
            ResourceKind::Other
                if self
                    .document_suffixes
                    .iter()
                    .any(|s| path.ends_with(s.as_str())) =>
            {
                RequestClass::Document
            }
            ResourceKind::Other => RequestClass::Default,
        }
    }
}

/// Classifies `request` with the default rules.
pub fn classify(request: &RequestDescriptor) -> RequestClass {
    DEFAULT_RULES.classify(request)
}
