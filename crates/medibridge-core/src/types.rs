use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Which side of the consultation sent a message.
///
/// Validated as a closed set in the core, not just by the storage layer's
/// CHECK constraint, so bad input fails before any remote call is made.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderRole {
    Doctor,
    Patient,
}

impl SenderRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Doctor => "doctor",
            Self::Patient => "patient",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "doctor" => Some(Self::Doctor),
            "patient" => Some(Self::Patient),
            _ => None,
        }
    }

    /// Speaker label used in transcripts ("Doctor" / "Patient").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Doctor => "Doctor",
            Self::Patient => "Patient",
        }
    }
}

// =============================================================================
// Entities
// =============================================================================

/// A bilingual consultation session between a doctor and a patient.
///
/// Both language codes are set at creation and never change. `updated_at`
/// is refreshed whenever a message is inserted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub doctor_language: String,
    pub patient_language: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One immutable utterance within a conversation.
///
/// `original_text` is absent for audio-only messages; `translated_text` is
/// absent when translation was skipped (e.g. empty input). Messages are
/// never edited after commit; they only disappear when their conversation
/// is deleted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_role: SenderRole,
    pub original_text: Option<String>,
    pub translated_text: Option<String>,
    pub audio_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A fully assembled message awaiting commit. The storage layer assigns the
/// identity and commit timestamp.
#[derive(Clone, Debug)]
pub struct NewMessage {
    pub conversation_id: Uuid,
    pub sender_role: SenderRole,
    pub original_text: Option<String>,
    pub translated_text: Option<String>,
    pub audio_url: Option<String>,
}

// =============================================================================
// Derived values
// =============================================================================

/// Structured clinical summary derived from a conversation transcript.
///
/// Not persisted; recomputed on demand. All five fields are required when
/// parsing model output — a response missing any of them is treated as
/// malformed and degraded to a narrative-only summary.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsultationSummary {
    pub symptoms: Vec<String>,
    pub diagnoses: Vec<String>,
    pub medications: Vec<String>,
    pub followup_actions: Vec<String>,
    pub full_text: String,
}

impl ConsultationSummary {
    /// Summary with no structured fields and the given narrative text.
    pub fn narrative_only(full_text: impl Into<String>) -> Self {
        Self {
            full_text: full_text.into(),
            ..Self::default()
        }
    }
}
