/// Alfred Script Filter feedback types.
///
/// These are what gets written to stdout. Absent fields are skipped so the
/// payload stays the shape Alfred expects.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Icon Alfred shows next to error items.
pub const ERROR_ICON: &str =
    "/System/Library/CoreServices/CoreTypes.bundle/Contents/Resources/AlertStopIcon.icns";

/// The full Script Filter response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub items: Vec<Item>,
}

impl Feedback {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Add an informational, non-actionable item if there are no items yet.
    pub fn warn_empty(&mut self, title: &str, subtitle: &str) {
        if self.items.is_empty() {
            self.items.push(Item::new(title).subtitle(subtitle).valid(false));
        }
    }

    /// Strip every UID so Alfred keeps the emitted order instead of
    /// re-ranking by past usage.
    pub fn suppress_uids(&mut self) {
        for item in &mut self.items {
            item.uid = None;
        }
    }

    /// A response holding a single error item.
    #[must_use]
    pub fn error(message: &str) -> Self {
        Self {
            items: vec![
                Item::new(message)
                    .subtitle("Check the workflow log for details")
                    .valid(false)
                    .icon(Icon::file_icon(ERROR_ICON)),
            ],
        }
    }
}

/// One selectable result row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subtitle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Whether actioning the item runs the workflow (otherwise it autocompletes).
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    /// Workflow variables set when the item is actioned.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Mods::is_empty")]
    pub mods: Mods,
}

impl Item {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.arg = Some(arg.into());
        self
    }

    #[must_use]
    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    #[must_use]
    pub fn valid(mut self, valid: bool) -> Self {
        self.valid = valid;
        self
    }

    #[must_use]
    pub fn autocomplete(mut self, text: impl Into<String>) -> Self {
        self.autocomplete = Some(text.into());
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    #[must_use]
    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Alternate action while ⌘ is held.
    #[must_use]
    pub fn cmd(mut self, action: Modifier) -> Self {
        self.mods.cmd = Some(action);
        self
    }

    /// Alternate action while ⌥ is held.
    #[must_use]
    pub fn alt(mut self, action: Modifier) -> Self {
        self.mods.alt = Some(action);
        self
    }
}

/// Alternate actions keyed by modifier key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mods {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<Modifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<Modifier>,
}

impl Mods {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cmd.is_none() && self.alt.is_none()
    }

    /// Number of alternate actions set.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.cmd.is_some()) + usize::from(self.alt.is_some())
    }
}

/// An alternate action: overrides subtitle, arg and variables of its item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subtitle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,
    pub valid: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
}

impl Modifier {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subtitle: String::new(),
            arg: None,
            valid: true,
            variables: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.arg = Some(arg.into());
        self
    }

    #[must_use]
    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }
}

impl Default for Modifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Item icon. Without a type, `path` is an image file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<IconKind>,
    pub path: String,
}

impl Icon {
    /// An image file, relative to the workflow directory or absolute.
    #[must_use]
    pub fn image(path: impl Into<String>) -> Self {
        Self {
            kind: None,
            path: path.into(),
        }
    }

    /// The Finder icon of the file at `path`.
    #[must_use]
    pub fn file_icon(path: impl Into<String>) -> Self {
        Self {
            kind: Some(IconKind::FileIcon),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconKind {
    FileIcon,
}
