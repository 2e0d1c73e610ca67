//! Competence grading.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest grade a competence can receive.
pub const NOTE_MIN: i32 = 0;
/// Highest grade a competence can receive.
pub const NOTE_MAX: i32 = 5;

/// A competence grade, always within `NOTE_MIN..=NOTE_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Note(u8);

/// Error returned for a grade outside `NOTE_MIN..=NOTE_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("note {0} is outside {NOTE_MIN}..={NOTE_MAX}")]
pub struct NoteOutOfRange(pub i32);

impl Note {
    pub fn new(value: i32) -> Result<Self, NoteOutOfRange> {
        if (NOTE_MIN..=NOTE_MAX).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(NoteOutOfRange(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i32> for Note {
    type Error = NoteOutOfRange;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Note> for i32 {
    fn from(note: Note) -> Self {
        i32::from(note.0)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{NOTE_MAX}", self.0)
    }
}
