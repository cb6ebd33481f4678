//! phora CLI: parse sentences with a categorial grammar and ground them in
//! an OPDL knowledge base.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use akh_phora::config::PhoraConfig;
use akh_phora::grammar::{ChartParser, Lexicon};
use akh_phora::ground::Grounder;
use akh_phora::kb::KnowledgeBase;
use akh_phora::nlp::WhitespaceTagger;

#[derive(Parser)]
#[command(name = "phora", version, about = "Categorial grammar parser with knowledge-base grounding")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a grammar file and list its lexical entries.
    Lexicon {
        #[arg(long)]
        grammar: PathBuf,
    },

    /// Chart-parse a sequence of words.
    Parse {
        #[arg(long)]
        grammar: PathBuf,

        /// OPDL knowledge base used for sense weights.
        #[arg(long)]
        kb: PathBuf,

        /// Context type scoring the sense weights.
        #[arg(long)]
        context: Option<String>,

        /// Words to parse, already tokenized.
        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Score how strongly type A is a kind of type B.
    Query {
        #[arg(long)]
        kb: PathBuf,

        a: String,
        b: String,
    },

    /// Parse a sentence and resolve its content words to objects.
    Ground {
        #[arg(long)]
        grammar: PathBuf,

        #[arg(long)]
        kb: PathBuf,

        #[arg(long)]
        context: Option<String>,

        /// Sentence text; multiple arguments are joined with spaces.
        #[arg(required = true)]
        sentence: Vec<String>,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => PhoraConfig::load(path)?,
        None => PhoraConfig::default(),
    };

    match cli.command {
        Commands::Lexicon { grammar } => {
            let lexicon = load_lexicon(&grammar, &config)?;
            if cli.json {
                print_json(lexicon.entries())?;
            } else {
                for entry in lexicon.entries() {
                    println!("{entry}");
                }
                println!("{} entries", lexicon.len());
            }
        }

        Commands::Parse {
            grammar,
            kb,
            context,
            words,
        } => {
            let lexicon = load_lexicon(&grammar, &config)?;
            let kb = load_kb(&kb, &config)?;
            let parses = ChartParser::new(&lexicon, &kb)
                .with_config(config.chart.clone())
                .parse(&words, context.as_deref());
            if cli.json {
                print_json(&parses.unwrap_or_default())?;
            } else {
                match parses {
                    Some(parses) => {
                        for d in &parses {
                            println!("{:.6}  {}  {}", d.probability, d.cat, d.term);
                        }
                    }
                    None => println!("no parse"),
                }
            }
        }

        Commands::Query { kb, a, b } => {
            let kb = load_kb(&kb, &config)?;
            let p = kb.query_is(&a, &b);
            if cli.json {
                print_json(&serde_json::json!({ "a": a, "b": b, "probability": p }))?;
            } else {
                println!("{a} is-a {b}: {p:.6}");
            }
        }

        Commands::Ground {
            grammar,
            kb,
            context,
            sentence,
        } => {
            let lexicon = load_lexicon(&grammar, &config)?;
            let kb = load_kb(&kb, &config)?;
            let text = sentence.join(" ");
            let result = Grounder::new(&lexicon, &kb)
                .with_chart_config(config.chart.clone())
                .ground_sentence(&text, &WhitespaceTagger::new(&kb), context.as_deref());
            if cli.json {
                print_json(&result)?;
            } else {
                match result.best_parse() {
                    Some(best) => println!("parse: {}  ({:.6})", best.term, best.probability),
                    None => println!("no parse"),
                }
                for word in &result.words {
                    let category = word
                        .category
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "?".to_string());
                    println!("{} [{category}]", word.word);
                    if word.candidates.is_empty() {
                        println!("  (no candidates)");
                    }
                    for g in &word.candidates {
                        println!("  {:.6}  {}", g.probability, g.object);
                    }
                }
            }
        }
    }

    Ok(())
}

fn load_lexicon(path: &Path, config: &PhoraConfig) -> Result<Lexicon> {
    let source = std::fs::read_to_string(path).into_diagnostic()?;
    Ok(Lexicon::from_source_with_default(
        &source,
        config.lexicon.default_weight,
    )?)
}

fn load_kb(path: &Path, config: &PhoraConfig) -> Result<KnowledgeBase> {
    let mut kb = KnowledgeBase::with_config(config.query.clone());
    kb.load_file(path)?;
    Ok(kb)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{json}");
    Ok(())
}
