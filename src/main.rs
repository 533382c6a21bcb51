use clap::{Parser, Subcommand};
use moviedeck::builder::{BuildError, PageBuilder, PaginationContext};
use moviedeck::cache::TemplateCache;
use moviedeck::config::SiteConfig;
use moviedeck::model::MovieCollection;
use moviedeck::output::{self, DocumentReport, FeedReport};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "moviedeck")]
#[command(about = "Static site generator for scraped movie catalogs")]
#[command(long_about = "\
Static site generator for scraped movie catalogs

Each input feed is a JSON record set from the scraper:

  { \"Movies\": [ { \"Title\": \"Heat\", \"Director\": \"Michael Mann\", ... } ] }

Every feed becomes one document: a list page, one detail page per movie,
the template bundle's assets, and a data file the pages' client script
renders the list entries from. Feeds are normalized before building
(records without a usable title dropped, duplicates by provider id removed,
sorted by title).

Template bundles live in the templates directory, one subdirectory per
bundle, described by a template.toml:

  templates/dark/
  ├── template.toml      # name, resources, [list]/[detail] options
  ├── list.html          # list page, bound per document
  ├── detail.html        # detail page, bound per movie
  └── css/, js/, img/    # resources copied next to the output

Run 'moviedeck gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Site output directory
    #[arg(long, default_value = "site", global = true)]
    output: PathBuf,

    /// Site configuration file
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site from one or more record feeds
    Build {
        /// Record feed file (repeatable; each feed becomes one document)
        #[arg(long = "input", required = true)]
        inputs: Vec<PathBuf>,
        /// Template id (defaults to the configured template)
        #[arg(long)]
        template: Option<String>,
        /// Merge all feeds into a single document
        #[arg(long)]
        merge: bool,
    },
    /// Load and normalize feeds without building
    Check {
        /// Record feed file (repeatable)
        #[arg(long = "input", required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build {
            inputs,
            template,
            merge,
        } => {
            let config = SiteConfig::load(&cli.config)?;
            let template_id = template.unwrap_or_else(|| config.templates.default.clone());

            let mut documents = load_documents(&inputs, &config)?;
            if merge && documents.len() > 1 {
                documents = vec![merge_documents(documents)];
            }

            let cache = TemplateCache::new();
            let reports = build_documents(&cache, &config, &template_id, &cli.output, &documents);

            let mut built = Vec::new();
            let mut failed = 0usize;
            for report in reports {
                match report {
                    Ok(report) => built.push(report),
                    Err((name, err)) => {
                        failed += 1;
                        eprintln!("error: document '{name}': {err}");
                    }
                }
            }
            output::print_build_output(&built, &cli.output);
            if failed > 0 {
                return Err(format!("{failed} document(s) failed").into());
            }
        }
        Command::Check { inputs } => {
            let config = SiteConfig::load(&cli.config)?;
            let mut feeds = Vec::new();
            for input in &inputs {
                let raw = load_feed(input)?;
                let scraped = raw.len();
                let mut normalized = raw;
                normalize(&mut normalized, &config);
                feeds.push(FeedReport {
                    name: feed_name(input),
                    scraped,
                    kept: normalized.len(),
                });
            }
            output::print_check_output(&feeds);
            println!("==> Feeds are valid");
        }
        Command::GenConfig => {
            print!("{}", moviedeck::config::stock_config_toml());
        }
    }

    Ok(())
}

/// One document to build: feed name plus its normalized collection.
struct Document {
    name: String,
    collection: MovieCollection,
}

fn feed_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "feed".to_string())
}

fn load_feed(input: &Path) -> Result<MovieCollection, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(input)
        .map_err(|e| format!("cannot read feed {}: {e}", input.display()))?;
    let collection: MovieCollection = serde_json::from_str(&content)
        .map_err(|e| format!("malformed feed {}: {e}", input.display()))?;
    Ok(collection)
}

/// Normalization pipeline every feed goes through before building.
fn normalize(collection: &mut MovieCollection, config: &SiteConfig) {
    collection
        .filter()
        .distinct()
        .sort()
        .setup(&config.build.html_ext);
}

fn load_documents(
    inputs: &[PathBuf],
    config: &SiteConfig,
) -> Result<Vec<Document>, Box<dyn std::error::Error>> {
    let mut documents = Vec::with_capacity(inputs.len());
    for input in inputs {
        let mut collection = load_feed(input)?;
        normalize(&mut collection, config);
        documents.push(Document {
            name: feed_name(input),
            collection,
        });
    }
    Ok(documents)
}

/// Collapse a document list into one document carrying every record.
fn merge_documents(documents: Vec<Document>) -> Document {
    let mut documents = documents.into_iter();
    let mut first = documents.next().expect("at least one document");
    for doc in documents {
        first.collection.merge(Some(doc.collection));
        first.name = "merged".to_string();
    }
    // Merged feeds can overlap; normalize order and identity once more
    first.collection.distinct().sort();
    first
}

/// Build every document on the rayon pool, sharing one template cache.
///
/// A failed page aborts its document; other documents keep building. The
/// pages already written by a failed document stay on disk untouched.
///
/// Pagination is planned here, not in the builder: each document is one
/// page in the sequence of documents of this invocation (zero-based), and
/// home/previous/next point at sibling documents' list pages.
fn build_documents(
    cache: &TemplateCache,
    config: &SiteConfig,
    template_id: &str,
    output_dir: &Path,
    documents: &[Document],
) -> Vec<Result<DocumentReport, (String, BuildError)>> {
    // One up-front resolve pins the list filename for sibling links and
    // surfaces a broken bundle before any document starts writing.
    let tpl = match cache.resolve(Path::new(&config.templates.dir), template_id) {
        Ok(tpl) => tpl,
        Err(err) => {
            return vec![Err(("<template>".to_string(), err.into()))];
        }
    };
    let list_file = format!("{}{}", tpl.list.filename, config.build.html_ext);

    let total = documents.len();
    documents
        .par_iter()
        .enumerate()
        .map(|(index, document)| {
            let sibling = |i: usize| format!("../{}/{list_file}", documents[i].name);
            let list_pagination = if total > 1 {
                PaginationContext::new(index, total).with_links(
                    Some(sibling(0)),
                    index.checked_sub(1).map(sibling),
                    (index + 1 < total).then(|| sibling(index + 1)),
                )
            } else {
                PaginationContext::new(index, total)
            };
            // Detail pages live one level down; home climbs back to the list
            let detail_pagination = PaginationContext::new(index, total).with_links(
                Some(format!("../{list_file}")),
                None,
                None,
            );

            // A single document owns the output root; siblings get subfolders
            let doc_dir = if total == 1 {
                output_dir.to_path_buf()
            } else {
                output_dir.join(&document.name)
            };

            build_document(
                cache,
                config,
                template_id,
                &doc_dir,
                document,
                &list_pagination,
                &detail_pagination,
            )
            .map(|(list_page, detail_pages)| DocumentReport {
                name: document.name.clone(),
                template: tpl.name.clone(),
                movies: document.collection.len(),
                list_page,
                detail_pages,
            })
            .map_err(|err| (document.name.clone(), err))
        })
        .collect()
}

/// Build one document's pages. Returns the list page path and the number
/// of detail pages written.
fn build_document(
    cache: &TemplateCache,
    config: &SiteConfig,
    template_id: &str,
    doc_dir: &Path,
    document: &Document,
    list_pagination: &PaginationContext,
    detail_pagination: &PaginationContext,
) -> Result<(PathBuf, usize), BuildError> {
    let builder = PageBuilder::new(cache, config, doc_dir);

    let list_page = builder.build_list_page(template_id, &document.collection, list_pagination)?;

    let mut detail_pages = 0usize;
    for movie in &document.collection.movies {
        builder.build_detail_page(template_id, movie, detail_pagination)?;
        detail_pages += 1;
    }

    Ok((list_page.path, detail_pages))
}
