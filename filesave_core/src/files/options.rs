//! Upload options and their layered resolution.
//!
//! Options arrive as partial layers (call site, configured module defaults) and
//! resolve into an [`UploadConstraint`] where every field is set.

use serde::{Deserialize, Serialize};

pub const DEFAULT_FORM_KEY: &str = "files";
pub const DEFAULT_LANG: &str = "en";

/// How many files a single submission may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MultipleRepr", into = "MultipleRepr")]
pub enum Multiple {
    /// `false`: exactly one file.
    Single,
    /// `true`: no upper bound.
    Unbounded,
    /// `N`: at most N files.
    AtMost(u32),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum MultipleRepr {
    Flag(bool),
    Limit(u32),
}

impl From<MultipleRepr> for Multiple {
    fn from(repr: MultipleRepr) -> Self {
        match repr {
            MultipleRepr::Flag(true) => Multiple::Unbounded,
            MultipleRepr::Flag(false) => Multiple::Single,
            MultipleRepr::Limit(limit) => Multiple::AtMost(limit),
        }
    }
}

impl From<Multiple> for MultipleRepr {
    fn from(multiple: Multiple) -> Self {
        match multiple {
            Multiple::Single => MultipleRepr::Flag(false),
            Multiple::Unbounded => MultipleRepr::Flag(true),
            Multiple::AtMost(limit) => MultipleRepr::Limit(limit),
        }
    }
}

impl From<bool> for Multiple {
    fn from(flag: bool) -> Self {
        MultipleRepr::Flag(flag).into()
    }
}

impl From<u32> for Multiple {
    fn from(limit: u32) -> Self {
        Multiple::AtMost(limit)
    }
}

/// Per-file requirements checked by [`ensure`](super::validation::ensure).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnsureOptions {
    /// Size expression such as `"50MB"`.
    #[serde(default, alias = "maxSize", alias = "maxsize", skip_serializing_if = "Option::is_none")]
    pub max_size: Option<String>,
    /// Accepted tokens: full MIME type, MIME top-level type, subtype or extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
}

impl EnsureOptions {
    pub fn is_empty(&self) -> bool {
        self.size_limit().is_none() && self.allowed_types().is_empty()
    }

    /// The configured size expression; an empty string counts as unset.
    pub fn size_limit(&self) -> Option<&str> {
        self.max_size.as_deref().filter(|size| !size.is_empty())
    }

    pub fn allowed_types(&self) -> &[String] {
        self.types.as_deref().unwrap_or_default()
    }

    /// First-defined-wins merge with a lower priority layer.
    pub fn merge(self, lower: &EnsureOptions) -> EnsureOptions {
        EnsureOptions {
            max_size: self.max_size.or_else(|| lower.max_size.clone()),
            types: self.types.or_else(|| lower.types.clone()),
        }
    }
}

/// One partial layer of upload options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOptions {
    #[serde(default, alias = "formKey", alias = "formkey", skip_serializing_if = "Option::is_none")]
    pub form_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple: Option<Multiple>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ensure: Option<EnsureOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl UploadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form_key(mut self, form_key: impl Into<String>) -> Self {
        self.form_key = Some(form_key.into());
        self
    }

    pub fn multiple(mut self, multiple: impl Into<Multiple>) -> Self {
        self.multiple = Some(multiple.into());
        self
    }

    pub fn max_size(mut self, max_size: impl Into<String>) -> Self {
        self.ensure.get_or_insert_with(EnsureOptions::default).max_size = Some(max_size.into());
        self
    }

    pub fn types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ensure.get_or_insert_with(EnsureOptions::default).types =
            Some(types.into_iter().map(Into::into).collect());
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// First-defined-wins merge with a lower priority layer, recursing into `ensure`.
    pub fn merge(self, lower: &UploadOptions) -> UploadOptions {
        let ensure = match (self.ensure, &lower.ensure) {
            (Some(ensure), Some(lower_ensure)) => Some(ensure.merge(lower_ensure)),
            (Some(ensure), None) => Some(ensure),
            (None, lower_ensure) => lower_ensure.clone(),
        };

        UploadOptions {
            form_key: self.form_key.or_else(|| lower.form_key.clone()),
            multiple: self.multiple.or(lower.multiple),
            ensure,
            lang: self.lang.or_else(|| lower.lang.clone()),
        }
    }
}

/// Fully resolved options for one validation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadConstraint {
    pub form_key: String,
    pub multiple: Multiple,
    pub ensure: EnsureOptions,
    pub lang: String,
}

impl Default for UploadConstraint {
    fn default() -> Self {
        UploadOptions::default().into()
    }
}

impl From<UploadOptions> for UploadConstraint {
    fn from(options: UploadOptions) -> Self {
        Self {
            form_key: options.form_key.unwrap_or_else(|| DEFAULT_FORM_KEY.to_string()),
            multiple: options.multiple.unwrap_or(Multiple::Unbounded),
            ensure: options.ensure.unwrap_or_default(),
            lang: options.lang.unwrap_or_else(|| DEFAULT_LANG.to_string()),
        }
    }
}

/// Merges layers ordered from highest to lowest priority, then applies the
/// built-in defaults (`form_key = "files"`, `multiple = true`, `lang = "en"`).
pub fn resolve_options<'a, I>(layers: I) -> UploadConstraint
where
    I: IntoIterator<Item = &'a UploadOptions>,
{
    layers
        .into_iter()
        .fold(UploadOptions::default(), |merged, layer| merged.merge(layer))
        .into()
}
