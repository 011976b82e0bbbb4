//! Reusable view components

pub mod call_list;
pub mod chat;
pub mod header;
pub mod loading;

pub use call_list::CallList;
pub use chat::ChatWidget;
pub use header::Header;
pub use loading::Loading;
