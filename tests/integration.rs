//! End-to-end tests for akh-phora.
//!
//! These tests load grammars and knowledge bases the way the CLI does (from
//! text and from files on disk) and check parsing, imports and grounding
//! together.

use std::fs;

use akh_phora::ErrorKind;
use akh_phora::config::PhoraConfig;
use akh_phora::grammar::{Cat, ChartParser, Lexicon, chartparse, parse_lexicon};
use akh_phora::ground::Grounder;
use akh_phora::kb::{KbError, KnowledgeBase, LexicalCategory};
use akh_phora::nlp::WhitespaceTagger;

#[test]
fn transitive_round_trip() {
    let lexicon = Lexicon::from_source(
        r"
        noun := N : dog
        verb := (S\N)/N : λy.λx.sees(x,y)
        ",
    )
    .unwrap();
    let kb = KnowledgeBase::default();

    let parses = chartparse(&["noun", "verb", "noun"], &lexicon, &kb, None).unwrap();
    assert_eq!(parses.len(), 1);
    assert_eq!(parses[0].cat, Cat::atom("S"));
    assert_eq!(parses[0].term.to_string(), "sees(dog, dog)");
}

#[test]
fn subtype_scores() {
    let kb = KnowledgeBase::from_source("(type Animal) (type Dog :bases (Animal))").unwrap();
    assert_eq!(kb.query_is("Dog", "Dog"), 1.0);
    assert!((kb.query_is("Dog", "Animal") - 0.9).abs() < 1e-12);

    let cyclic = KnowledgeBase::from_source("(type A :bases (B)) (type B :bases (A))").unwrap();
    assert!((cyclic.query_is("A", "B") - 0.9).abs() < 1e-12);
    assert!(cyclic.query_is("B", "A") > 0.0);

    let vetoed =
        KnowledgeBase::from_source("(type Animal) (type Robot :bases (Animal) :antibases (Animal))")
            .unwrap();
    assert_eq!(vetoed.query_is("Robot", "Animal"), 0.0);
}

#[test]
fn import_without_file_context_fails() {
    let err = KnowledgeBase::from_source(r#"(import "missing.opdl")"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Import);
    assert!(matches!(err, KbError::ImportWithoutPath { .. }));
}

#[test]
fn import_merges_declarations_relative_to_importer() {
    let dir = tempfile::TempDir::new().unwrap();
    fs::create_dir(dir.path().join("lib")).unwrap();
    fs::write(
        dir.path().join("lib/animals.opdl"),
        "; shared hierarchy\n(type Animal :nouns (animal))\n(import \"dogs.opdl\")\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("lib/dogs.opdl"),
        "(type Dog :bases (Animal) :nouns (dog))",
    )
    .unwrap();
    let main = dir.path().join("world.opdl");
    fs::write(&main, "(import \"lib/animals.opdl\")\n(object rex :type (Dog))\n").unwrap();

    let kb = KnowledgeBase::from_file(&main).unwrap();
    assert!(kb.get_type("Animal").is_some());
    assert!(kb.get_type("Dog").is_some());
    assert!(kb.get_object("rex").is_some());
    assert_eq!(kb.imports().len(), 3);
    assert!((kb.query_is("Dog", "Animal") - 0.9).abs() < 1e-12);
    assert_eq!(kb.resolve("dog", Some(LexicalCategory::Nouns), "rex"), 1.0);
}

#[test]
fn missing_import_target_fails_and_commits_nothing() {
    let dir = tempfile::TempDir::new().unwrap();
    let main = dir.path().join("world.opdl");
    fs::write(&main, "(type Thing)\n(import \"nowhere.opdl\")\n").unwrap();

    let mut kb = KnowledgeBase::from_source("(type Existing)").unwrap();
    let err = kb.load_file(&main).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Import);
    assert!(matches!(err, KbError::ImportIo { .. }));
    assert!(kb.get_type("Thing").is_none());
    assert!(kb.get_type("Existing").is_some());
    assert!(kb.imports().is_empty());
}

#[test]
fn import_cycles_terminate() {
    let dir = tempfile::TempDir::new().unwrap();
    fs::write(dir.path().join("a.opdl"), "(type A) (import \"b.opdl\")").unwrap();
    fs::write(dir.path().join("b.opdl"), "(type B :bases (A)) (import \"a.opdl\")").unwrap();

    let kb = KnowledgeBase::from_file(dir.path().join("a.opdl")).unwrap();
    assert_eq!(kb.imports().len(), 2);
    assert_eq!(kb.types().count(), 2);
}

#[test]
fn load_with_explicit_base_directory() {
    let dir = tempfile::TempDir::new().unwrap();
    fs::write(dir.path().join("place.opdl"), "(type Place)").unwrap();

    let mut kb = KnowledgeBase::new();
    kb.load(
        "(import \"place.opdl\") (type City :bases (Place))",
        Some(dir.path()),
    )
    .unwrap();
    assert!((kb.query_is("City", "Place") - 0.9).abs() < 1e-12);
}

#[test]
fn unterminated_predicate_commits_no_entry() {
    let err = parse_lexicon("dog := N : dog\nsees := (S\\N)/N : λy.λx.sees(x, y").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(Lexicon::from_source("dog := N : dog\nbad := N : f(").is_err());
}

#[test]
fn context_disambiguates_senses() {
    let lexicon = Lexicon::from_source(
        r"
        # two readings of one word
        bank := N [Place 0.8, 0.05] : river_bank
        bank := N [Company 0.8, 0.05] : money_bank
        flooded := S\N [1] : λx.flooded(x)
        ",
    )
    .unwrap();
    let kb = KnowledgeBase::from_source(
        "
        (type Place) (type Company)
        (type Riverside :bases (Place))
        (type Finance :bases (Company))
        ",
    )
    .unwrap();

    let best = |context: &str| {
        let parses = chartparse(&["bank", "flooded"], &lexicon, &kb, Some(context)).unwrap();
        parses
            .into_iter()
            .max_by(|a, b| a.probability.total_cmp(&b.probability))
            .unwrap()
            .term
            .to_string()
    };
    assert_eq!(best("Riverside"), "flooded(river_bank)");
    assert_eq!(best("Finance"), "flooded(money_bank)");
}

#[test]
fn grounding_pipeline_from_files() {
    let dir = tempfile::TempDir::new().unwrap();
    let kb_path = dir.path().join("world.opdl");
    fs::write(
        &kb_path,
        "
        (type Animal :nouns (animal) :pronouns (it))
        (type Dog :bases (Animal) :nouns (dog puppy) :provides-adjectives (canine))
        (type Cat :bases (Animal) :antibases (Dog) :nouns (cat))
        (object rex :type (Dog))
        (object tom :type (Cat))
        ",
    )
    .unwrap();
    let kb = KnowledgeBase::from_file(&kb_path).unwrap();
    let lexicon = Lexicon::from_source(
        r"
        a := N/N : λx.x
        puppy := N : puppy
        cat := N : cat
        chases := (S\N)/N : λy.λx.chases(x, y)
        ",
    )
    .unwrap();

    let result = Grounder::new(&lexicon, &kb).ground_sentence(
        "A puppy chases a cat.",
        &WhitespaceTagger::new(&kb),
        None,
    );
    assert_eq!(
        result.best_parse().unwrap().term.to_string(),
        "chases(puppy, cat)"
    );
    assert_eq!(result.words.len(), 2);
    assert_eq!(result.words[0].candidates[0].object, "rex");
    assert_eq!(result.words[1].candidates[0].object, "tom");
    assert_eq!(result.words[1].candidates[0].probability, 1.0);
}

#[test]
fn config_drives_chart_and_query() {
    let config = PhoraConfig::from_toml_str(
        "
        [chart]
        start_symbol = \"N\"

        [query]
        base_discount = 0.5
        ",
    )
    .unwrap();

    let mut kb = KnowledgeBase::with_config(config.query.clone());
    kb.load("(type Animal) (type Dog :bases (Animal))", None).unwrap();
    assert!((kb.query_is("Dog", "Animal") - 0.5).abs() < 1e-12);

    let lexicon = Lexicon::from_source_with_default(
        "big := N/N : λx.big(x)  dog := N : dog",
        config.lexicon.default_weight,
    )
    .unwrap();
    let parses = ChartParser::new(&lexicon, &kb)
        .with_config(config.chart)
        .parse(&["big", "dog"], None)
        .unwrap();
    assert_eq!(parses[0].term.to_string(), "big(dog)");
}
