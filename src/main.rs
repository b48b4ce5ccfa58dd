use anyhow::Context;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thoughtline::cli::{Cli, Commands, ConfigAction, TimelineAction};
use thoughtline::config::Config;
use thoughtline::error::{Error, Result};
use thoughtline::search::SearchResponse;
use thoughtline::services::{SearchService, TimelineService};
use thoughtline::sources::JsonFileSource;
use thoughtline::timeline::{TimelineEntry, TimelineGroup, TimelineSummary};

const PREVIEW_CHARS: usize = 80;

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Configuration commands must work even when the current file is broken
    if let Commands::Config { action } = cli.command {
        init_logging("info", cli.verbose);
        return cmd_config(cli.config, action);
    }

    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = load_config(&config_path, cli.profile.as_deref())?;

    // Initialize logging
    init_logging(&config.logging.level, cli.verbose);
    if !config_path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'thoughtline config init' to create one."
        );
    }

    let source = JsonFileSource::new(expand_path(&config.storage.thoughts_file)?)
        .with_signals(config.search.recency.clone(), config.search.default_confidence);

    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    // Handle commands
    runtime.block_on(async {
        match cli.command {
            Commands::Search {
                query,
                user,
                page,
                page_size,
            } => {
                let service = SearchService::from_config(source, &config)?;
                let response = service
                    .search_with_suggestions(&query, &user, page, page_size)
                    .await?;
                output(cli.json, &response, print_search)
            }
            Commands::Suggest {
                partial,
                user,
                limit,
            } => {
                let service = SearchService::from_config(source, &config)?;
                let suggestions = service.suggest(&partial, &user, limit).await?;
                output(cli.json, suggestions.as_slice(), |suggestions| {
                    for suggestion in suggestions {
                        println!("{}", suggestion);
                    }
                })
            }
            Commands::Timeline { action } => {
                let service = TimelineService::from_config(source, &config);
                match action {
                    TimelineAction::Group { user, group_type } => {
                        let group_type =
                            group_type.unwrap_or_else(|| config.timeline.default_group_type.clone());
                        let groups = service.group(&user, &group_type).await?;
                        output(cli.json, groups.as_slice(), print_groups)
                    }
                    TimelineAction::Related { user, entry, limit } => {
                        let related = service.related(&user, entry, limit).await?;
                        output(cli.json, related.as_slice(), print_related)
                    }
                    TimelineAction::Summary { user } => {
                        let summary = service.summary(&user).await?;
                        output(cli.json, &summary, print_summary)
                    }
                }
            }
            Commands::Config { .. } => Ok(()),
        }
    })
}

fn init_logging(level: &str, verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if verbose { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("thoughtline={}", level)));

    fmt().with_env_filter(filter).with_target(false).init();
}

fn output<T: Serialize + ?Sized>(json: bool, value: &T, print: impl FnOnce(&T)) -> Result<()> {
    if json {
        let rendered = serde_json::to_string_pretty(value).map_err(|e| Error::Json {
            source: e,
            context: "Failed to serialize output".to_string(),
        })?;
        println!("{}", rendered);
    } else {
        print(value);
    }
    Ok(())
}

fn print_search(response: &SearchResponse) {
    println!(
        "Found {} results for '{}' ({}ms)",
        response.total_count, response.query_text, response.search_time_ms
    );

    for result in &response.results {
        let thought = result.thought();
        println!(
            "{:>3}. [{:.3}] {}  {}",
            result.rank(),
            result.final_score(),
            thought.timestamp.format("%Y-%m-%d %H:%M"),
            thought.preview(PREVIEW_CHARS)
        );
        if !result.matching_entities().is_empty() {
            let entities: Vec<String> = result
                .matching_entities()
                .iter()
                .map(|e| format!("{} ({})", e.value, e.entity_type))
                .collect();
            println!("       entities: {}", entities.join(", "));
        }
    }

    if !response.suggestions.is_empty() {
        println!("Did you mean: {}", response.suggestions.join(", "));
    }
}

fn print_groups(groups: &[TimelineGroup]) {
    if groups.is_empty() {
        println!("No groups found");
        return;
    }

    for group in groups {
        println!(
            "{} ({} entries)",
            group.summary.as_deref().unwrap_or("Group"),
            group.entries.len()
        );
        if !group.common_entities.is_empty() {
            let common: Vec<String> = group
                .common_entities
                .iter()
                .map(|c| format!("{} ({})", c.entity_value, c.entity_type))
                .collect();
            println!("  common: {}", common.join(", "));
        }
        for entry in &group.entries {
            println!(
                "  {}  {}",
                entry.timestamp.format("%H:%M"),
                entry.thought.preview(PREVIEW_CHARS)
            );
        }
    }
}

fn print_related(entries: &[TimelineEntry]) {
    if entries.is_empty() {
        println!("No related entries found");
        return;
    }

    for entry in entries {
        println!(
            "{}  {}  {}",
            entry.id,
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.thought.preview(PREVIEW_CHARS)
        );
        let shared: Vec<String> = entry
            .connections
            .iter()
            .filter_map(|c| {
                c.relationship_type
                    .as_ref()
                    .map(|label| format!("{} ({}, {})", c.entity_value, c.entity_type, label))
            })
            .collect();
        if !shared.is_empty() {
            println!("  shares: {}", shared.join(", "));
        }
    }
}

fn print_summary(summary: &TimelineSummary) {
    println!("Timeline Summary");
    println!("================");
    println!("\nEntries: {}", summary.total_entries);
    if let (Some(earliest), Some(latest)) = (summary.earliest, summary.latest) {
        println!(
            "Range:   {} to {}",
            earliest.format("%Y-%m-%d"),
            latest.format("%Y-%m-%d")
        );
    }

    if !summary.entity_counts.is_empty() {
        println!("\nEntities by type:");
        for (entity_type, count) in &summary.entity_counts {
            println!("  {:<14} {}", entity_type, count);
        }
    }

    if !summary.most_active_days.is_empty() {
        println!("\nMost active days:");
        for day in &summary.most_active_days {
            println!("  {}  {}", day.date, day.count);
        }
    }

    if !summary.top_entities.is_empty() {
        println!("\nTop entities:");
        for entity in &summary.top_entities {
            println!("  {} ({})  {}", entity.value, entity.entity_type, entity.count);
        }
    }
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show { section } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = load_config(&path, None)?;
            let mut value = serde_json::to_value(&config).map_err(|e| Error::Json {
                source: e,
                context: "Failed to serialize config".to_string(),
            })?;

            if let Some(section) = section {
                value = value
                    .get(&section)
                    .cloned()
                    .ok_or_else(|| Error::Config(format!("Unknown config section: {}", section)))?;
            }

            let json = serde_json::to_string_pretty(&value).map_err(|e| Error::Json {
                source: e,
                context: "Failed to serialize config".to_string(),
            })?;
            println!("{}", json);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            match Config::load(&path) {
                Ok(config) => {
                    println!("✓ Configuration is valid");
                    println!("  Schema version: {}", config.meta.schema_version);
                }
                Err(Error::ConfigValidation { errors }) => {
                    println!("✗ Configuration has {} problem(s):", errors.len());
                    for error in &errors {
                        println!("  {}: {}", error.path, error.message);
                    }
                    return Err(Error::ConfigValidation { errors });
                }
                Err(e) => return Err(e),
            }
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            // Create parent directory
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| Error::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            // Save default config
            let config = Config::default();
            config.save(&path)?;

            println!("✓ Configuration initialized at: {}", path.display());
            println!("  Thoughts file: {}", config.storage.thoughts_file.display());
        }
    }

    Ok(())
}

fn load_config(path: &Path, profile: Option<&str>) -> Result<Config> {
    if !path.exists() {
        let mut config = Config::default();
        config.apply_env_overrides();
        if let Some(profile) = profile {
            config.apply_profile(profile)?;
        }
        return Ok(config);
    }

    match profile {
        Some(profile) => Config::load_with_profile(path, profile),
        None => Config::load(path),
    }
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    let path_str = path
        .to_str()
        .ok_or_else(|| Error::Config("Invalid path encoding".to_string()))?;

    if let Some(stripped) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Cannot determine home directory".to_string()))?;
        Ok(home.join(stripped))
    } else {
        Ok(path.to_path_buf())
    }
}
