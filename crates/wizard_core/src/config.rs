use url::Url;

use crate::{ItemId, TransitionSettings};

/// Thumbnail endpoint; `{id}` is replaced by the item id.
pub const DEFAULT_THUMBNAIL_URL_TEMPLATE: &str =
    "https://placehold.co/128x96/222/FFF.png?text=Item+{id}";

#[derive(Debug, Clone, PartialEq)]
pub struct WizardConfig {
    pub thumbnail_url_template: String,
    pub transition: TransitionSettings,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            thumbnail_url_template: DEFAULT_THUMBNAIL_URL_TEMPLATE.to_string(),
            transition: TransitionSettings::default(),
        }
    }
}

/// Expands the template for one item. Returns `None` unless the result is an
/// absolute http(s) URL.
pub fn thumbnail_url(template: &str, item_id: ItemId) -> Option<String> {
    let raw = template.replace("{id}", &item_id.to_string());
    let url = Url::parse(&raw).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.into())
}

#[cfg(test)]
mod tests {
    use super::{thumbnail_url, DEFAULT_THUMBNAIL_URL_TEMPLATE};

    #[test]
    fn default_template_expands_item_id() {
        assert_eq!(
            thumbnail_url(DEFAULT_THUMBNAIL_URL_TEMPLATE, 2).as_deref(),
            Some("https://placehold.co/128x96/222/FFF.png?text=Item+2")
        );
    }

    #[test]
    fn relative_or_foreign_scheme_is_rejected() {
        assert_eq!(thumbnail_url("thumbs/{id}.png", 1), None);
        assert_eq!(thumbnail_url("file:///tmp/{id}.png", 1), None);
    }
}
