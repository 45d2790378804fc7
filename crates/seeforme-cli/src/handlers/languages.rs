//! Languages command handler.

use seeforme_speech::{language_tag, supported_languages};

/// Print every supported language with its voice tag.
pub fn execute() {
    for line in language_table() {
        println!("{line}");
    }
}

fn language_table() -> Vec<String> {
    supported_languages()
        .into_iter()
        .map(|name| format!("{name:<12} {}", language_tag(name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_pairs_names_with_tags() {
        let table = language_table();
        assert_eq!(table.len(), 16);
        assert_eq!(table[0], "English      en-US");
        assert!(table.iter().any(|line| line.ends_with("pt-BR")));
    }
}
