//! One-shot user-facing notifications.

use crate::action::BoardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoticeVariant {
    #[default]
    Default,
    Destructive,
}

/// A toast shown once to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    #[must_use]
    pub fn info(title: &str, description: &str) -> Self {
        Self { title: title.to_owned(), description: description.to_owned(), variant: NoticeVariant::Default }
    }

    #[must_use]
    pub fn destructive(title: &str, description: &str) -> Self {
        Self { title: title.to_owned(), description: description.to_owned(), variant: NoticeVariant::Destructive }
    }

    #[must_use]
    pub fn song_added() -> Self {
        Self::info("Song Added", "Your song has been added to the scrapbook!")
    }

    #[must_use]
    pub fn image_added() -> Self {
        Self::info("Image Added", "Your custom image has been added to the scrapbook!")
    }

    #[must_use]
    pub fn board_cleared() -> Self {
        Self::info("Scrapbook Cleared", "Your scrapbook has been cleared.")
    }

    #[must_use]
    pub fn camera_error() -> Self {
        Self::destructive("Camera Error", "Could not access your camera. Please check permissions.")
    }
}

impl From<&BoardError> for Notice {
    fn from(err: &BoardError) -> Self {
        match err {
            BoardError::Capture(_) => Self::camera_error(),
            other => Self::destructive("Something went wrong", &other.to_string()),
        }
    }
}
