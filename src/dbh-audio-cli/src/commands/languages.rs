//! Languages command handler

use dbh_audio::LANGUAGES;

/// Print the language code table
pub fn handle() {
    println!("{:<6} Folder", "Code");
    for language in LANGUAGES {
        println!("{:<6} {}", language.code, language.folder);
    }
}
