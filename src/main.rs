//! Mucluc CLI - builds the chapter list of a web novel.

use anyhow::{Context, Result};
use clap::Parser;
use mucluc::config::Config;
use mucluc::console::Console;
use mucluc::{AssemblyError, ChapterContent, ChapterEntry, ChapterListAssembler, HttpFetcher};
use mucluc::{SiteRegistry, StoryInfo, download_chapter};
use std::path::PathBuf;
use std::process::ExitCode;

/// Chapter list builder for Vietnamese web novel sites.
#[derive(Parser, Debug)]
#[command(name = "mucluc")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL of the story page.
    story_url: String,

    /// Print the result as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Also download chapter N (1-based) and print its text.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    chapter: Option<u32>,

    /// Read configuration from this file instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let console = if args.json {
        Console::quiet()
    } else {
        Console::new()
    };

    match run(&args, &console).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            console.error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args, console: &Console) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    init_tracing(config.scraping.debug);

    console.section("Mucluc - Chapter List Builder");

    let registry = SiteRegistry::new();
    let site = registry
        .find_for_url(&args.story_url)
        .ok_or_else(|| AssemblyError::UnsupportedUrl(args.story_url.clone()))?;
    console.success(&format!("Using {} adapter", site.name()));

    let fetcher = HttpFetcher::new(&config.scraping).context("Failed to create HTTP client")?;

    console.step("Building chapter list...");
    let mut assembler = ChapterListAssembler::new(&fetcher, site)
        .with_max_toc_pages(config.scraping.max_toc_pages);
    let mut progress = |done: usize, total: usize| {
        console.progress_update(&format!("{} TOC pages fetched", console.page_progress(done, total)));
        true
    };
    let result = assembler.run(&args.story_url, &mut progress).await;
    console.finish_progress();
    let chapters = result.context("Failed to build chapter list")?;

    let story = assembler.story_info().cloned().unwrap_or_default();
    print_story(console, &story);
    console.success(&format!("Found {} chapters", console.count(chapters.len())));
    if assembler.truncated() {
        console.warning(&format!(
            "TOC cut at {} pages; raise scraping.max_toc_pages for the rest",
            config.scraping.max_toc_pages
        ));
    }
    if !args.json {
        print_chapters(console, &chapters);
    }

    let content = match args.chapter {
        Some(number) => {
            let entry = select_chapter(&chapters, number)?;
            console.step(&format!("Downloading chapter {}: {}", number, entry.title));
            let content = download_chapter(&fetcher, site, entry)
                .await
                .with_context(|| format!("Failed to download {}", entry.source_url))?;
            console.success(&format!(
                "Downloaded {} paragraphs",
                console.count(content.paragraphs.len())
            ));
            Some(content)
        }
        None => None,
    };

    if args.json {
        let output = match &content {
            Some(content) => {
                serde_json::json!({ "story": story, "chapters": chapters, "chapter": content })
            }
            None => serde_json::json!({ "story": story, "chapters": chapters }),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if let Some(content) = &content {
        print_content(console, content);
    }

    console.section("Done!");
    Ok(())
}

/// Installs the tracing subscriber; `RUST_LOG` overrides the default filter.
fn init_tracing(debug: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = if debug { "mucluc=debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Picks chapter `number` (1-based) from the assembled list.
fn select_chapter(chapters: &[ChapterEntry], number: u32) -> Result<&ChapterEntry> {
    let index = usize::try_from(number)?.saturating_sub(1);
    chapters.get(index).with_context(|| {
        format!(
            "Chapter {} exceeds total chapters ({})",
            number,
            chapters.len()
        )
    })
}

fn print_story(console: &Console, story: &StoryInfo) {
    if let Some(title) = &story.title {
        console.section(title);
    }
    if let Some(author) = &story.author {
        console.info(&format!("Author: {}", author));
    }
    if !story.genres.is_empty() {
        console.info(&format!("Genres: {}", story.genres.join(", ")));
    }
    if let Some(cover) = &story.cover_url {
        console.info(&format!("Cover: {}", console.muted(cover)));
    }
}

fn print_chapters(console: &Console, chapters: &[ChapterEntry]) {
    for (index, chapter) in chapters.iter().enumerate() {
        println!(
            "{:>5}. {} {}",
            index + 1,
            chapter.title,
            console.muted(&chapter.source_url)
        );
    }
}

fn print_content(console: &Console, content: &ChapterContent) {
    console.section(&content.title);
    println!();
    for paragraph in &content.paragraphs {
        println!("{}", paragraph);
        println!();
    }
}
