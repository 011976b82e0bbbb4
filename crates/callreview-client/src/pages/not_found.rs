//! 404 Not Found page

use crate::routes::Route;
use colored::Colorize;
use std::fmt;

/// Shown for paths no route matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFound {
    path: String,
}

impl NotFound {
    /// Page for the unmatched `path`
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Where the "Return to Dashboard" link goes
    #[must_use]
    pub const fn back_link(&self) -> Route {
        Route::Dashboard
    }
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "Page Not Found".bold())?;
        writeln!(f, "The page you are looking for does not exist: {}", self.path)?;
        writeln!(f, "Return to Dashboard -> {}", self.back_link())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        colored::control::set_override(false);
        let text = NotFound::new("/settings").to_string();
        assert!(text.contains("Page Not Found"));
        assert!(text.contains("/settings"));
        assert!(text.ends_with("Return to Dashboard -> /dashboard\n"));
    }
}
