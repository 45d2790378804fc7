//! Language name → language-region tag mapping.

/// Tag used when a language name is not recognized.
pub const DEFAULT_LANGUAGE_TAG: &str = "en-US";

const LANGUAGE_TAGS: &[(&str, &str)] = &[
    ("English", "en-US"),
    ("Spanish", "es-ES"),
    ("French", "fr-FR"),
    ("German", "de-DE"),
    ("Italian", "it-IT"),
    ("Portuguese", "pt-BR"),
    ("Japanese", "ja-JP"),
    ("Chinese", "zh-CN"),
    ("Korean", "ko-KR"),
    ("Russian", "ru-RU"),
    ("Arabic", "ar-SA"),
    ("Hindi", "hi-IN"),
    ("Dutch", "nl-NL"),
    ("Swedish", "sv-SE"),
    ("Norwegian", "no-NO"),
    ("Danish", "da-DK"),
];

/// Map a language name (case-insensitive) to its tag, e.g. `"spanish"` → `"es-ES"`.
pub fn language_tag(language: &str) -> &'static str {
    let language = language.trim();
    LANGUAGE_TAGS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(language))
        .map_or(DEFAULT_LANGUAGE_TAG, |(_, tag)| tag)
}

/// Language names that have a known tag, in display order.
pub fn supported_languages() -> Vec<&'static str> {
    LANGUAGE_TAGS.iter().map(|(name, _)| *name).collect()
}

/// Primary language subtag: `"en-US"` → `"en"`. Accepts `_` separators too.
pub fn base_subtag(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}
