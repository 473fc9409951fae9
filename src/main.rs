mod error;
mod model;
mod output;
mod parser;
mod settings;
mod source;
mod stats;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use model::Story;
use settings::Settings;
use stats::StoryStats;

#[derive(Parser)]
#[command(name = "twison", about = "Convert Twine 2 HTML stories to JSON")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one story to JSON
    Convert {
        /// Twine HTML export
        input: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// JSON indent width, 0 for compact
        #[arg(long)]
        indent: Option<usize>,
    },
    /// Convert many stories, one JSON file each
    Batch {
        /// Twine HTML exports
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output directory
        #[arg(short = 'd', long)]
        out_dir: Option<PathBuf>,
        /// JSON indent width, 0 for compact
        #[arg(long)]
        indent: Option<usize>,
    },
    /// Show passage/link statistics and broken links
    Check {
        input: PathBuf,
    },
    /// Passages overview table
    Passages {
        input: PathBuf,
        /// Only passages carrying this tag
        #[arg(short, long)]
        tag: Option<String>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
}

fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let settings = Settings::load()?;
    init_tracing(&settings.log);

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            indent,
        } => {
            let story = load_story(&input)?;
            output::write_json(&story, output.as_deref(), indent.unwrap_or(settings.indent))?;
            if let Some(path) = &output {
                println!(
                    "Wrote {} passages to {}",
                    story.passages.len(),
                    path.display()
                );
            }
            Ok(())
        }
        Commands::Batch {
            inputs,
            out_dir,
            indent,
        } => {
            let out_dir = out_dir.unwrap_or_else(|| settings.out_dir.clone());
            let indent = indent.unwrap_or(settings.indent);
            println!("Converting {} stories into {}...", inputs.len(), out_dir.display());
            let counts = convert_batch(&inputs, &out_dir, indent);
            counts.print();
            if counts.failed > 0 {
                Err(anyhow::anyhow!("{} of {} stories failed", counts.failed, inputs.len()))
            } else {
                Ok(())
            }
        }
        Commands::Check { input } => {
            let story = load_story(&input)?;
            if let Some(name) = &story.name {
                println!("Story:          {}", name);
            }
            StoryStats::collect(&story).print();
            Ok(())
        }
        Commands::Passages { input, tag, limit } => {
            let story = load_story(&input)?;
            let rows: Vec<_> = story
                .passages
                .iter()
                .filter(|p| match &tag {
                    Some(tag) => p.tags.iter().flatten().any(|t| t == tag),
                    None => true,
                })
                .take(limit)
                .collect();
            if rows.is_empty() {
                println!("No passages found.");
                return Ok(());
            }

            println!(
                "{:>5} | {:<28} | {:<10} | {:>5} | {:<24}",
                "PID", "Passage", "Type", "Links", "Tags"
            );
            println!("{}", "-".repeat(84));

            for p in &rows {
                let kind = p.kind.as_deref().unwrap_or("-");
                let links = p.links.as_ref().map_or(0, Vec::len);
                let tags = p.tags.as_ref().map(|t| t.join(" ")).unwrap_or_default();
                println!(
                    "{:>5} | {:<28} | {:<10} | {:>5} | {:<24}",
                    truncate(&p.pid, 5),
                    truncate(&p.name, 28),
                    truncate(kind, 10),
                    links,
                    truncate(&tags, 24)
                );
            }

            println!("\n{} of {} passages", rows.len(), story.passages.len());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn load_story(path: &Path) -> Result<Story> {
    let html =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let raw = source::read_story(&html).with_context(|| format!("Invalid story {:?}", path))?;
    let story = parser::convert_story(&raw);
    info!(path = %path.display(), passages = story.passages.len(), "Converted story");
    Ok(story)
}

struct BatchCounts {
    converted: usize,
    failed: usize,
    passages: usize,
    broken_links: usize,
}

impl BatchCounts {
    fn print(&self) {
        println!(
            "Converted {} stories ({} failed): {} passages, {} broken links.",
            self.converted, self.failed, self.passages, self.broken_links,
        );
    }
}

fn convert_batch(inputs: &[PathBuf], out_dir: &Path, indent: usize) -> BatchCounts {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(inputs.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }

    let results: Vec<_> = inputs
        .par_iter()
        .map(|input| {
            let result = convert_one(input, out_dir, indent);
            pb.inc(1);
            (input, result)
        })
        .collect();
    pb.finish_and_clear();

    let mut counts = BatchCounts {
        converted: 0,
        failed: 0,
        passages: 0,
        broken_links: 0,
    };
    for (input, result) in results {
        match result {
            Ok(stats) => {
                counts.converted += 1;
                counts.passages += stats.passages;
                counts.broken_links += stats.broken_links;
            }
            Err(e) => {
                counts.failed += 1;
                warn!(path = %input.display(), "Conversion failed: {:#}", e);
                eprintln!("  {}: {:#}", input.display(), e);
            }
        }
    }
    counts
}

fn convert_one(input: &Path, out_dir: &Path, indent: usize) -> Result<StoryStats> {
    let story = load_story(input)?;
    let stem = input
        .file_stem()
        .with_context(|| format!("No file name in {:?}", input))?;
    let mut file_name = stem.to_os_string();
    file_name.push(".json");
    let path = out_dir.join(file_name);
    output::write_json(&story, Some(&path), indent)?;
    Ok(StoryStats::collect(&story))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_width() {
        assert_eq!(truncate("Kitchen", 10), "Kitchen");
        assert_eq!(truncate("Top of the Stairs", 10), "Top of ...");
        assert_eq!(truncate("Café au lait", 7), "Café...");
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(std::time::Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(std::time::Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(std::time::Duration::from_secs(3725)), "1h 2m 5s");
    }

    #[test]
    fn batch_writes_one_file_per_story() {
        let out_dir = std::env::temp_dir().join(format!("twison-batch-{}", std::process::id()));
        let inputs = vec![
            PathBuf::from("tests/fixtures/cellar.html"),
            PathBuf::from("tests/fixtures/missing.html"),
        ];
        let counts = convert_batch(&inputs, &out_dir, 0);
        assert_eq!(counts.converted, 1);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.passages, 5);
        assert_eq!(counts.broken_links, 1);

        let json = std::fs::read_to_string(out_dir.join("cellar.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "The Cellar");
        std::fs::remove_dir_all(&out_dir).unwrap();
    }
}
