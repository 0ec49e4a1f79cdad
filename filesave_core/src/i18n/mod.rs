//! Message catalog for upload error codes.
//!
//! Classification never depends on the locale: callers get a stable numeric code
//! plus interpolation params, and turn them into text here.

mod en;
mod zh;

use parking_lot::RwLock;
use std::collections::BTreeMap;

pub type MessageParams = BTreeMap<&'static str, String>;

pub const DEFAULT_LOCALE: &str = "en";

pub const SUPPORTED_LOCALES: [&str; 2] = ["en", "zh"];

/// Generic failure code used by the HTTP glue when a file could not be stored.
pub const UPLOAD_FAILED: u16 = 1008;

pub trait Translate: Send + Sync {
    fn translate(&self, code: u16, params: &MessageParams) -> String;

    fn current_locale(&self) -> String;

    fn switch_locale(&self, lang: &str);
}

/// Built-in English and Simplified Chinese tables with English fallback.
#[derive(Debug)]
pub struct MessageCatalog {
    locale: RwLock<String>,
}

impl MessageCatalog {
    pub fn new(locale: &str) -> Self {
        Self {
            locale: RwLock::new(locale.to_string()),
        }
    }

    pub fn supports(locale: &str) -> bool {
        table(locale).is_some()
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

impl Translate for MessageCatalog {
    fn translate(&self, code: u16, params: &MessageParams) -> String {
        render(&self.locale.read(), code, params)
    }

    fn current_locale(&self) -> String {
        self.locale.read().clone()
    }

    fn switch_locale(&self, lang: &str) {
        let mut locale = self.locale.write();
        if *locale != lang {
            tracing::debug!(from = %*locale, to = %lang, "switching message locale");
            *locale = lang.to_string();
        }
    }
}

/// Renders `code` in `locale`, falling back to English, then to the bare code.
pub fn render(locale: &str, code: u16, params: &MessageParams) -> String {
    let template = lookup(locale, code).or_else(|| lookup(DEFAULT_LOCALE, code));

    match template {
        Some(template) => interpolate(template, params),
        None => code.to_string(),
    }
}

fn lookup(locale: &str, code: u16) -> Option<&'static str> {
    table(locale)?
        .iter()
        .find(|(entry, _)| *entry == code)
        .map(|(_, template)| *template)
}

// "zh-CN" and "zh_TW" resolve to the "zh" table.
fn table(locale: &str) -> Option<&'static [(u16, &'static str)]> {
    let primary = locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    match primary.as_str() {
        "en" => Some(en::MESSAGES),
        "zh" => Some(zh::MESSAGES),
        _ => None,
    }
}

fn interpolate(template: &str, params: &MessageParams) -> String {
    params.iter().fold(template.to_string(), |message, (name, value)| {
        message.replace(&format!("{{{{{}}}}}", name), value)
    })
}
