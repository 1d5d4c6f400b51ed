//! Attendance intake: option tables, validation, and message rendering.
//!
//! A raw submission carries two enumerated option codes. Both must resolve
//! through the fixed mapping tables before a record exists at all; the
//! record is immutable afterwards and renders into the notification
//! template via `Display`.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;

/// Raw form submission as received from the HTTP boundary.
///
/// Missing fields deserialize to empty strings. Name and comment are
/// passed through verbatim — empty values are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttendanceSubmission {
    pub name: String,
    pub attendance: String,
    pub accommodation: String,
    pub comment: String,
}

/// Canonical phrase for an attendance option code.
fn attendance_phrase(code: &str) -> Option<&'static str> {
    match code {
        "1" => Some("Так, зможу"),
        "2" => Some("Вагаюсь з відповіддю, повідомлю пізніше"),
        "3" => Some("Не зможу прийти"),
        _ => None,
    }
}

/// Canonical phrase for an accommodation option code.
fn accommodation_phrase(code: &str) -> Option<&'static str> {
    match code {
        "1" => Some("Маю де заночувати"),
        "2" => Some("Не знаю, мені потрібна допомога"),
        "3" => Some("Вагаюсь, повідомлю пізніше"),
        _ => None,
    }
}

/// Resolve an attendance code or fail naming the attendance domain.
pub fn resolve_attendance(code: &str) -> Result<&'static str> {
    attendance_phrase(code).ok_or_else(|| Error::UnknownOption {
        field: "attendance",
        code: code.to_string(),
    })
}

/// Resolve an accommodation code or fail naming the accommodation domain.
pub fn resolve_accommodation(code: &str) -> Result<&'static str> {
    accommodation_phrase(code).ok_or_else(|| Error::UnknownOption {
        field: "accommodation",
        code: code.to_string(),
    })
}

/// Validated attendance record.
///
/// Construction resolves both option codes; fields are private so the
/// record cannot be mutated once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    name: String,
    attendance_code: String,
    attendance_phrase: &'static str,
    accommodation_code: String,
    accommodation_phrase: &'static str,
    comment: String,
}

impl AttendanceRecord {
    /// Validate a raw submission into a record.
    ///
    /// The attendance code is resolved before the accommodation code; the
    /// first unknown code wins and nothing is constructed.
    pub fn from_submission(submission: AttendanceSubmission) -> Result<Self> {
        let attendance_phrase = resolve_attendance(&submission.attendance)?;
        let accommodation_phrase = resolve_accommodation(&submission.accommodation)?;

        Ok(Self {
            name: submission.name,
            attendance_code: submission.attendance,
            attendance_phrase,
            accommodation_code: submission.accommodation,
            accommodation_phrase,
            comment: submission.comment,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attendance_code(&self) -> &str {
        &self.attendance_code
    }

    pub fn attendance_phrase(&self) -> &'static str {
        self.attendance_phrase
    }

    pub fn accommodation_code(&self) -> &str {
        &self.accommodation_code
    }

    pub fn accommodation_phrase(&self) -> &'static str {
        self.accommodation_phrase
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }
}

impl fmt::Display for AttendanceRecord {
    /// Render the four-section notification template. User-supplied name
    /// and comment are not escaped; markdown control characters pass
    /// through to the rendered notification.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\n*Імʼя:*\n{}\n*Присутність:*\n{}\n*Проживання:*\n{}\n*Коментарі:*\n{}\n",
            self.name, self.attendance_phrase, self.accommodation_phrase, self.comment
        )
    }
}
