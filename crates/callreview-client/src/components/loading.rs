//! Loading component for displaying loading states

use std::fmt;

/// Loading indicator shown while a view waits on the backend
#[derive(Debug, Clone, Copy, Default)]
pub struct Loading;

impl fmt::Display for Loading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Loading...")
    }
}
