//! Knowledge base: OPDL types, objects and their lexical index.
//!
//! A knowledge base is loaded from OPDL source (and whatever it imports),
//! then queried read-only. Loading is all-or-nothing: declarations go into a
//! scratch copy that replaces the live one only when the whole load,
//! imports included, has succeeded.
//!
//! ```text
//! (type Animal :nouns (animal))
//! (type Dog :bases (Animal) :nouns (dog hound))
//! (object rex :type (Dog))
//! ```

pub mod decl;
pub mod error;
pub mod query;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

pub use decl::{LexicalCategory, OpdlObject, OpdlType};
pub use error::{KbError, KbResult};
pub use query::Grounding;

use crate::config::QueryConfig;
use crate::nlp::normalize;
use crate::opdl::{self, SExpr};

/// Types, objects and the word → type index built from them.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    types: BTreeMap<String, OpdlType>,
    objects: BTreeMap<String, OpdlObject>,
    /// category → normalized word → names of types declaring it.
    baserefs: BTreeMap<LexicalCategory, BTreeMap<String, BTreeSet<String>>>,
    imports: Vec<PathBuf>,
    config: QueryConfig,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty knowledge base with custom `query_is` discounts.
    pub fn with_config(config: QueryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Build from source text with no file context (imports fail).
    pub fn from_source(source: &str) -> KbResult<Self> {
        let mut kb = Self::new();
        kb.load(source, None)?;
        Ok(kb)
    }

    /// Build from a file; its imports resolve against its directory.
    pub fn from_file(path: impl AsRef<Path>) -> KbResult<Self> {
        let mut kb = Self::new();
        kb.load_file(path)?;
        Ok(kb)
    }

    /// Load declarations from `source`.
    ///
    /// `base_path` is the directory `import` targets resolve against,
    /// normally the one holding the file the text came from. Without one,
    /// any `import` fails. On error the knowledge base is left exactly as it
    /// was.
    pub fn load(&mut self, source: &str, base_path: Option<&Path>) -> KbResult<()> {
        let mut scratch = self.clone();
        scratch.load_source(source, base_path)?;
        tracing::info!(
            types = scratch.types.len(),
            objects = scratch.objects.len(),
            imports = scratch.imports.len(),
            "knowledge base loaded"
        );
        *self = scratch;
        Ok(())
    }

    /// Load an OPDL file. A file already loaded into this knowledge base is
    /// skipped.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> KbResult<()> {
        let mut scratch = self.clone();
        scratch.import_file(path.as_ref())?;
        tracing::info!(
            path = %path.as_ref().display(),
            types = scratch.types.len(),
            objects = scratch.objects.len(),
            imports = scratch.imports.len(),
            "knowledge base loaded"
        );
        *self = scratch;
        Ok(())
    }

    pub fn types(&self) -> impl Iterator<Item = &OpdlType> {
        self.types.values()
    }

    pub fn objects(&self) -> impl Iterator<Item = &OpdlObject> {
        self.objects.values()
    }

    pub fn get_type(&self, name: &str) -> Option<&OpdlType> {
        self.types.get(name)
    }

    pub fn get_object(&self, name: &str) -> Option<&OpdlObject> {
        self.objects.get(name)
    }

    /// Names of the types that declare `word` under `category`.
    pub fn baserefs(&self, category: LexicalCategory, word: &str) -> impl Iterator<Item = &str> {
        self.baserefs
            .get(&category)
            .and_then(|words| words.get(&normalize(word)))
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Categories under which some type declares `word`.
    pub fn categories_of(&self, word: &str) -> Vec<LexicalCategory> {
        let word = normalize(word);
        LexicalCategory::ALL
            .into_iter()
            .filter(|c| {
                self.baserefs
                    .get(c)
                    .is_some_and(|words| words.contains_key(&word))
            })
            .collect()
    }

    /// Canonical paths of every file loaded so far, in load order.
    pub fn imports(&self) -> &[PathBuf] {
        &self.imports
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    fn load_source(&mut self, source: &str, base_path: Option<&Path>) -> KbResult<()> {
        for expr in opdl::OpdlParser::new(source) {
            self.declare(&expr?, base_path)?;
        }
        Ok(())
    }

    fn declare(&mut self, expr: &SExpr, base_path: Option<&Path>) -> KbResult<()> {
        match expr.head() {
            Some("import") => {
                let target = decl::declared_name(expr)?;
                let Some(dir) = base_path else {
                    return Err(KbError::ImportWithoutPath { target });
                };
                self.import_file(&dir.join(&target))
            }
            Some("type") => {
                let ty = OpdlType::from_sexpr(expr)?;
                self.add_type(ty);
                Ok(())
            }
            Some("object") => {
                let object = OpdlObject::from_sexpr(expr)?;
                self.objects.insert(object.name.clone(), object);
                Ok(())
            }
            Some(other) => Err(KbError::UnknownDeclaration {
                head: other.to_string(),
            }),
            None => Err(KbError::UnknownDeclaration {
                head: expr.to_string(),
            }),
        }
    }

    fn import_file(&mut self, path: &Path) -> KbResult<()> {
        let canonical = std::fs::canonicalize(path).map_err(|source| KbError::ImportIo {
            path: path.to_path_buf(),
            source,
        })?;
        if self.imports.contains(&canonical) {
            tracing::debug!(path = %canonical.display(), "already imported, skipping");
            return Ok(());
        }
        let source = std::fs::read_to_string(&canonical).map_err(|source| KbError::ImportIo {
            path: canonical.clone(),
            source,
        })?;
        tracing::debug!(path = %canonical.display(), "importing");
        self.imports.push(canonical.clone());
        let dir = canonical.parent().unwrap_or_else(|| Path::new("."));
        self.load_source(&source, Some(dir))
    }

    /// Register a type, replacing any earlier declaration of the same name.
    fn add_type(&mut self, ty: OpdlType) {
        if let Some(old) = self.types.remove(&ty.name) {
            for category in LexicalCategory::ALL {
                let Some(words) = self.baserefs.get_mut(&category) else {
                    continue;
                };
                for word in old.words(category) {
                    if let Some(names) = words.get_mut(&normalize(word)) {
                        names.remove(&old.name);
                        if names.is_empty() {
                            words.remove(&normalize(word));
                        }
                    }
                }
            }
        }
        for category in LexicalCategory::ALL {
            for word in ty.words(category) {
                self.baserefs
                    .entry(category)
                    .or_default()
                    .entry(normalize(word))
                    .or_default()
                    .insert(ty.name.clone());
            }
        }
        self.types.insert(ty.name.clone(), ty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const ANIMALS: &str = "
        (type Animal :nouns (animal creature))
        (type Dog :bases (Animal) :nouns (dog Hound) :provides-adjectives (canine))
        (object rex :type (Dog))
    ";

    #[test]
    fn load_indexes_types_objects_and_words() {
        let kb = KnowledgeBase::from_source(ANIMALS).unwrap();
        assert_eq!(kb.types().count(), 2);
        assert_eq!(kb.objects().count(), 1);
        assert_eq!(kb.get_type("Dog").unwrap().bases.len(), 1);
        assert_eq!(kb.baserefs(LexicalCategory::Nouns, "hound").collect::<Vec<_>>(), vec!["Dog"]);
        assert_eq!(kb.baserefs(LexicalCategory::Adjectives, "canine").count(), 1);
        assert_eq!(kb.categories_of("DOG"), vec![LexicalCategory::Nouns]);
    }

    #[test]
    fn import_without_base_path_fails() {
        let err = KnowledgeBase::from_source(r#"(import "missing.opdl")"#).unwrap_err();
        assert!(matches!(err, KbError::ImportWithoutPath { ref target } if target == "missing.opdl"));
        assert_eq!(err.kind(), ErrorKind::Import);
    }

    #[test]
    fn unknown_declaration_fails() {
        let err = KnowledgeBase::from_source("(relation a b)").unwrap_err();
        assert!(matches!(err, KbError::UnknownDeclaration { ref head } if head == "relation"));
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn failed_load_leaves_kb_untouched() {
        let mut kb = KnowledgeBase::from_source(ANIMALS).unwrap();
        let err = kb.load("(type Cat :bases (Animal)) (type Broken", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(kb.get_type("Cat").is_none());
        assert_eq!(kb.types().count(), 2);
    }

    #[test]
    fn redeclaring_a_type_replaces_its_words() {
        let mut kb = KnowledgeBase::from_source(ANIMALS).unwrap();
        kb.load("(type Dog :bases (Animal) :nouns (pup))", None).unwrap();
        assert_eq!(kb.baserefs(LexicalCategory::Nouns, "dog").count(), 0);
        assert_eq!(kb.baserefs(LexicalCategory::Nouns, "pup").count(), 1);
        assert!(kb.categories_of("canine").is_empty());
    }

    #[test]
    fn imports_resolve_against_base_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("place.opdl"), "(type Place :nouns (place))").unwrap();

        let mut kb = KnowledgeBase::new();
        kb.load(r#"(import "place.opdl") (type City :bases (Place))"#, Some(dir.path()))
            .unwrap();
        assert!(kb.get_type("Place").is_some());
        assert_eq!(kb.imports().len(), 1);
        assert!(kb.imports()[0].ends_with("place.opdl"));
    }

    #[test]
    fn lex_errors_surface_with_lex_kind() {
        let err = KnowledgeBase::from_source(r#"(type "open"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lex);
    }
}
