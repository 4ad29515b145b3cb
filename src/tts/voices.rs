//! Voice catalogue and legacy voice-name migration.
//!
//! Voice identifiers follow the piper naming scheme (`es_ES-davefx`). Older
//! job payloads may still carry edge-tts neural voice names; those are
//! migrated to their closest piper equivalent. Unknown voices fall back to
//! the default rather than failing the job.

/// Voice used when a job omits `voice` or names an unknown one.
pub const DEFAULT_VOICE: &str = "es_ES-davefx";

/// Known piper voices and their ONNX model file names.
pub const PIPER_VOICES: &[(&str, &str)] = &[
    ("es_ES-davefx", "es_ES-davefx-medium.onnx"),
    ("es_ES-mls_10246", "es_ES-mls_10246-low.onnx"),
    ("es_MX-ald", "es_MX-ald-medium.onnx"),
    ("es_MX-claude", "es_MX-claude-high.onnx"),
];

/// Legacy edge-tts voice names mapped to current piper voices.
pub const VOICE_MIGRATION: &[(&str, &str)] = &[
    ("es-ES-AlvaroNeural", "es_ES-davefx"),
    ("es-ES-ElviraNeural", "es_ES-mls_10246"),
    ("es-MX-JorgeNeural", "es_MX-ald"),
    ("es-MX-DaliaNeural", "es_MX-claude"),
    ("es-AR-TomasNeural", "es_ES-davefx"),
    ("es-AR-ElenaNeural", "es_ES-mls_10246"),
    ("es-CO-GonzaloNeural", "es_ES-davefx"),
    ("es-CO-SalomeNeural", "es_ES-mls_10246"),
];

/// Normalize a requested voice: migrate legacy names, then fall back to the
/// default for anything not in the catalogue.
pub fn normalize_voice(voice: &str) -> &'static str {
    let migrated = VOICE_MIGRATION
        .iter()
        .find(|(old, _)| *old == voice)
        .map(|(_, new)| *new)
        .unwrap_or(voice);

    PIPER_VOICES
        .iter()
        .find(|(id, _)| *id == migrated)
        .map(|(id, _)| *id)
        .unwrap_or(DEFAULT_VOICE)
}

/// ONNX model file name for a catalogue voice.
pub fn model_file(voice: &str) -> Option<&'static str> {
    PIPER_VOICES
        .iter()
        .find(|(id, _)| *id == voice)
        .map(|(_, file)| *file)
}
