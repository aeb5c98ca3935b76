use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, WebAppInfo};
use url::Url;

use crate::broadcast::content::{ButtonKind, PostButton};
use crate::localization::Lang;

// callback data for the mailing dialog
pub const CB_BUTTON_YES: &str = "mailing_button_yes";
pub const CB_BUTTON_NO: &str = "mailing_button_no";
pub const CB_KIND_LINK: &str = "mailing_kind_link";
pub const CB_KIND_APP: &str = "mailing_kind_app";
pub const CB_CONFIRM: &str = "mailing_confirm";
pub const CB_CANCEL: &str = "mailing_cancel";

/// the shop entry button shown to every user on /start
pub fn app_link(lang: Lang, app_url: &Url) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::web_app(
        lang.btn_open_app(),
        WebAppInfo {
            url: app_url.clone(),
        },
    )]])
}

/// "attach a button?" prompt after content is captured
pub fn button_choice(lang: Lang) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(lang.btn_add_button(), CB_BUTTON_YES),
        InlineKeyboardButton::callback(lang.btn_skip_button(), CB_BUTTON_NO),
    ]])
}

/// link vs in-app choice for the post button
pub fn button_kind(lang: Lang) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(lang.btn_kind_link(), CB_KIND_LINK),
        InlineKeyboardButton::callback(lang.btn_kind_app(), CB_KIND_APP),
    ]])
}

/// final confirm/cancel control pair under the preview
pub fn confirm(lang: Lang) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(lang.btn_confirm(), CB_CONFIRM),
        InlineKeyboardButton::callback(lang.btn_cancel(), CB_CANCEL),
    ]])
}

/// the interactive button attached to an outgoing broadcast post
pub fn post_button(button: &PostButton) -> InlineKeyboardMarkup {
    let key = match button.kind {
        ButtonKind::Link => InlineKeyboardButton::url(button.label.clone(), button.target.clone()),
        ButtonKind::InAppView => InlineKeyboardButton::web_app(
            button.label.clone(),
            WebAppInfo {
                url: button.target.clone(),
            },
        ),
    };
    InlineKeyboardMarkup::new(vec![vec![key]])
}
