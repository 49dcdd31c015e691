//! Helper functions for URLs and rendered HTML

pub mod html;
pub mod url;

pub use html::{attach_copy_buttons, html_escape};
pub use url::{encode_segment, full_url_for, url_for};
