//! Dialogue language codes

use std::collections::BTreeSet;

/// Language code and the output folder its dialogue is written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub folder: &'static str,
}

/// Code used when no language tag could be read
pub const UNKNOWN_CODE: &str = "UNK";

/// Folder for codes missing from [`LANGUAGES`]
pub const UNKNOWN_FOLDER: &str = "UNKNOWN";

/// All known dialogue languages
pub const LANGUAGES: &[Language] = &[
    Language { code: "ENG", folder: "ENGLISH" },
    Language { code: "MEX", folder: "MEXICAN" },
    Language { code: "BRA", folder: "BRAZILIAN" },
    Language { code: "FRE", folder: "FRENCH" },
    Language { code: "ARA", folder: "ARABIC" },
    Language { code: "RUS", folder: "RUSSIAN" },
    Language { code: "POL", folder: "POLISH" },
    Language { code: "POR", folder: "PORTUGUESE" },
    Language { code: "ITA", folder: "ITALIAN" },
    Language { code: "GER", folder: "GERMAN" },
    Language { code: "SPA", folder: "SPANISH" },
    Language { code: "JPN", folder: "JAPANESE" },
    Language { code: UNKNOWN_CODE, folder: UNKNOWN_FOLDER },
];

/// Get language by code (case-insensitive)
pub fn language_by_code(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.code.eq_ignore_ascii_case(code))
}

/// Output folder for a language code, `UNKNOWN` if unrecognised
pub fn folder_for(code: &str) -> &'static str {
    language_by_code(code).map_or(UNKNOWN_FOLDER, |l| l.folder)
}

/// Case-insensitive set of language codes chosen for extraction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageSelection {
    codes: BTreeSet<String>,
}

impl LanguageSelection {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            codes: codes
                .into_iter()
                .map(|c| c.as_ref().trim().to_ascii_uppercase())
                .filter(|c| !c.is_empty())
                .collect(),
        }
    }

    /// Every code in [`LANGUAGES`], `UNK` included
    pub fn all() -> Self {
        Self::new(LANGUAGES.iter().map(|l| l.code))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(&code.to_ascii_uppercase())
    }

    /// Whether dialogue tagged `code` is extracted. Codes missing from
    /// [`LANGUAGES`] are selected through `UNK`.
    pub fn accepts(&self, code: &str) -> bool {
        self.contains(code) || (language_by_code(code).is_none() && self.contains(UNKNOWN_CODE))
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_lookup() {
        assert_eq!(folder_for("ENG"), "ENGLISH");
        assert_eq!(folder_for("jpn"), "JAPANESE");
        assert_eq!(folder_for("UNK"), "UNKNOWN");
        assert_eq!(folder_for("XYZ"), "UNKNOWN");
        assert!(language_by_code("GER").is_some());
        assert!(language_by_code("DEU").is_none());
    }

    #[test]
    fn test_language_codes_unique() {
        let codes: BTreeSet<_> = LANGUAGES.iter().map(|l| l.code).collect();
        assert_eq!(codes.len(), LANGUAGES.len());
        assert!(LANGUAGES.iter().all(|l| l.code.len() == 3));
    }

    #[test]
    fn test_selection_case_insensitive() {
        let selection = LanguageSelection::new(["eng", " Fre ", ""]);
        assert_eq!(selection.len(), 2);
        assert!(selection.contains("ENG"));
        assert!(selection.contains("fre"));
        assert!(!selection.contains("GER"));
    }

    #[test]
    fn test_selection_all() {
        let selection = LanguageSelection::all();
        assert_eq!(selection.len(), LANGUAGES.len());
        assert!(selection.contains("UNK"));
        assert!(LanguageSelection::default().is_empty());
    }

    #[test]
    fn test_unrecognised_codes_follow_unk() {
        assert!(LanguageSelection::all().accepts("XYZ"));
        assert!(LanguageSelection::new(["UNK"]).accepts("xyz"));
        assert!(!LanguageSelection::new(["UNK"]).accepts("ENG"));
        assert!(!LanguageSelection::new(["ENG"]).accepts("XYZ"));
    }
}
