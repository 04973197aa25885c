use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

static WORDS_DIR: Dir = include_dir!("src/words");

const SOUND_EXTENSION: &str = ".mp3";

/// Categories of words the player can practice. Each maps to one folder of
/// audio clips (or an embedded fallback list when no folder exists).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, ValueEnum, strum_macros::Display)]
pub enum WordType {
    Names,
    Addresses,
}

impl WordType {
    pub const ALL: [WordType; 2] = [WordType::Names, WordType::Addresses];

    /// Stable identifier used for folder names and persisted results.
    pub fn slug(&self) -> &'static str {
        match self {
            WordType::Names => "names",
            WordType::Addresses => "addresses",
        }
    }
}

/// One practice word: where its audio lives and the spelling to match.
#[derive(Clone, Debug, PartialEq)]
pub struct Word {
    pub path: String,
    pub name: String,
}

#[allow(dead_code)]
#[derive(Deserialize, Clone, Debug)]
struct WordList {
    name: String,
    size: u32,
    words: Vec<String>,
}

/// Word lists keyed by type, loaded once at startup.
#[derive(Debug, Clone)]
pub struct WordCatalog {
    words: HashMap<WordType, Vec<Word>>,
}

impl WordCatalog {
    /// Load every word type, preferring audio folders under `words_dir`
    /// (`<dir>/<slug>/*.mp3`, file stem = spelling) and falling back to the
    /// embedded lists when a folder is missing or empty.
    pub fn load(words_dir: Option<&Path>) -> Self {
        let mut words = HashMap::new();

        for word_type in WordType::ALL {
            let scanned = words_dir.and_then(|dir| scan_sound_folder(&dir.join(word_type.slug())));

            let list = match scanned {
                Some(list) if !list.is_empty() => list,
                _ => embedded_words(word_type),
            };

            words.insert(word_type, list);
        }

        Self { words }
    }

    /// Build a catalog from explicit word lists. Used by tests and callers
    /// that source words elsewhere.
    pub fn from_words(words: HashMap<WordType, Vec<Word>>) -> Self {
        Self { words }
    }

    /// All words of the selected types, concatenated in selection order.
    pub fn words_for(&self, types: &[WordType]) -> Vec<Word> {
        types
            .iter()
            .flat_map(|t| self.words.get(t).cloned().unwrap_or_default())
            .collect()
    }
}

fn scan_sound_folder(dir: &Path) -> Option<Vec<Word>> {
    let entries = fs::read_dir(dir).ok()?;

    let mut words = Vec::new();
    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();

        if let Some(stem) = file_name.strip_suffix(SOUND_EXTENSION) {
            words.push(Word {
                path: entry.path().to_string_lossy().into_owned(),
                name: stem.to_lowercase(),
            });
        }
    }

    // Stable order so the catalog is deterministic; shuffling is the
    // sequencer's job.
    words.sort_by(|a, b| a.name.cmp(&b.name));
    Some(words)
}

fn embedded_words(word_type: WordType) -> Vec<Word> {
    let slug = word_type.slug();
    let file = WORDS_DIR
        .get_file(format!("{}.json", slug))
        .expect("embedded word list not found");

    let contents = file
        .contents_utf8()
        .expect("embedded word list is not valid utf-8");

    let list: WordList = from_str(contents).expect("unable to deserialize embedded word list");

    list.words
        .into_iter()
        .map(|name| Word {
            path: format!("words/{}/{}{}", slug, name, SOUND_EXTENSION),
            name,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_slugs_are_lowercase() {
        for word_type in WordType::ALL {
            let slug = word_type.slug();
            assert!(slug.chars().all(|c| c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn test_embedded_words_available_for_all_types() {
        for word_type in WordType::ALL {
            let words = embedded_words(word_type);
            assert!(!words.is_empty());

            for word in &words {
                assert!(word.path.ends_with(SOUND_EXTENSION));
                assert!(word.name.chars().all(|c| c.is_ascii_lowercase()));
            }
        }
    }

    #[test]
    fn test_load_without_dir_uses_embedded_lists() {
        let catalog = WordCatalog::load(None);

        for word_type in WordType::ALL {
            assert!(!catalog.words_for(&[word_type]).is_empty());
        }
    }

    #[test]
    fn test_words_for_concatenates_in_selection_order() {
        let mut words = HashMap::new();
        words.insert(
            WordType::Names,
            vec![Word {
                path: "names/maria.mp3".into(),
                name: "maria".into(),
            }],
        );
        words.insert(
            WordType::Addresses,
            vec![Word {
                path: "addresses/oakridge.mp3".into(),
                name: "oakridge".into(),
            }],
        );
        let catalog = WordCatalog::from_words(words);

        let combined = catalog.words_for(&[WordType::Addresses, WordType::Names]);
        assert_eq!(combined.len(), 2);
        assert_eq!(combined[0].name, "oakridge");
        assert_eq!(combined[1].name, "maria");
    }

    #[test]
    fn test_scan_sound_folder_reads_stems() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("names");
        fs::create_dir_all(&folder).unwrap();

        for name in ["Maria.mp3", "john.mp3", "notes.txt"] {
            File::create(folder.join(name))
                .unwrap()
                .write_all(b"")
                .unwrap();
        }

        let words = scan_sound_folder(&folder).unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].name, "john");
        assert_eq!(words[1].name, "maria");
    }

    #[test]
    fn test_load_prefers_on_disk_folder() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("names");
        fs::create_dir_all(&folder).unwrap();
        File::create(folder.join("zelda.mp3")).unwrap();

        let catalog = WordCatalog::load(Some(dir.path()));

        let names = catalog.words_for(&[WordType::Names]);
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].name, "zelda");

        // Addresses folder is absent, so the embedded list is used.
        assert!(!catalog.words_for(&[WordType::Addresses]).is_empty());
    }

    #[test]
    fn test_scan_missing_folder_is_none() {
        let dir = tempdir().unwrap();
        assert!(scan_sound_folder(&dir.path().join("missing")).is_none());
    }
}
