//! Request classes the strategy engine dispatches on.

use std::fmt;

/// Classification of an intercepted request.
///
/// Derived per request, never stored. `Passthrough` is the sentinel for
/// requests the cache must not intercept at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestClass {
    /// Not an `http`/`https` request; left to default handling.
    Passthrough,
    /// Server script or `/api/` call.
    Api,
    /// Stylesheet, script, image or font.
    StaticAsset,
    /// HTML page.
    Document,
    /// Anything no other rule matched.
    Default,
}

impl RequestClass {
    /// Returns the class name used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passthrough => "passthrough",
            Self::Api => "api",
            Self::StaticAsset => "static_asset",
            Self::Document => "document",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for RequestClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
