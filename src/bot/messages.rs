//! User-facing texts. All of them are sent with HTML parse mode.

use teloxide::utils::html::escape;

pub fn welcome() -> String {
    "<b>Welcome!</b> ✨\n<i>Send a VSCO username or profile link to get recent posts.</i>"
        .to_string()
}

pub fn groups_unsupported() -> String {
    "<b>Channels and groups are not supported presently.</b>".to_string()
}

pub fn help(limit: usize) -> String {
    format!(
        "<b>VSCO media bot.</b>\n\n<i>This bot gets the {limit} most recent media posts from a VSCO profile.\nSend a username or profile link to try it out!</i>"
    )
}

pub fn invalid_link() -> String {
    "<b>Send a valid VSCO profile link.</b>".to_string()
}

pub fn invalid_username() -> String {
    "<b>Send a valid VSCO username.</b>".to_string()
}

pub fn downloading() -> String {
    "<b>Downloading</b>".to_string()
}

pub fn send_failed() -> String {
    "<b>Error contacting VSCO or Telegram API limit was hit.</b>".to_string()
}

pub fn platform_error(description: &str) -> String {
    format!("<b>An error occurred: {}</b>", escape(description))
}

pub fn fetch_failed(error: &str) -> String {
    format!(
        "<b>An error occurred. Are you sure you sent a valid VSCO username?</b>\n<i>Error: {}</i>",
        escape(error)
    )
}

pub fn generic_error() -> String {
    "An error occurred".to_string()
}
