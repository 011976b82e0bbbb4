//! Page header with the signed-in user

use callreview_core::User;
use colored::Colorize;
use std::fmt;

/// Title bar shown at the top of every signed-in page
#[derive(Debug, Clone, Copy)]
pub struct Header<'a> {
    title: &'a str,
    user: Option<&'a User>,
}

impl<'a> Header<'a> {
    /// Header for a page titled `title`
    #[must_use]
    pub const fn new(title: &'a str, user: Option<&'a User>) -> Self {
        Self { title, user }
    }
}

impl fmt::Display for Header<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title.bold())?;
        if let Some(user) = self.user {
            write!(f, "    {} ({})  [logout]", user.rep_name, user.role)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", "=".repeat(60))
    }
}
