use anyhow::{bail, Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use cast::cli::{Cli, Commands};
use cast::concatenate::concatenate_trials;
use cast::config::Config;
use cast::defaults;
use cast::exclusion::ExclusionList;
use cast::meta::{load_trials, LoadReport};
use cast::output::{json, results, textgrid, wav};
use cast::pronounce::read_pronunciation_dict;
use cast::tiers::TierSynthesizer;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            directory,
            speaker,
            output,
            test,
            no_detect,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(speaker) = speaker {
                config.speaker_id = speaker;
            }
            if let Some(output) = output {
                config.output_file = output;
            }
            if test {
                config.flags.test = true;
            }
            if no_detect {
                config.flags.detect_beep = false;
            }
            run(&directory, config, cli.quiet)?;
        }
        Commands::Extract {
            csv,
            textgrid,
            out_dir,
        } => {
            let written = cast::extract::extract_textgrids(&csv, &textgrid, &out_dir)
                .with_context(|| format!("extracting {}", textgrid.display()))?;
            println!(
                "{} {} per-trial TextGrids to {}",
                "Extracted".green(),
                written,
                out_dir.display()
            );
        }
        Commands::RemoveDoubleWordBoundaries { directory, out_dir } => {
            let written =
                cast::extract::remove_empty_intervals_from_textgrids(&directory, &out_dir)
                    .with_context(|| format!("cleaning {}", directory.display()))?;
            println!(
                "{} {} TextGrids to {}",
                "Cleaned".green(),
                written,
                out_dir.display()
            );
        }
        Commands::Init { path } => {
            init_config(path)?;
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. cast_config.toml in the current directory
/// 3. Built-in defaults
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        Config::load(path).with_context(|| format!("loading {}", path.display()))
    } else {
        Ok(Config::load_or_default(Path::new(
            defaults::CONFIG_FILE_NAME,
        ))?)
    }
}

/// Write a default configuration file for the user to edit.
fn init_config(path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(defaults::CONFIG_FILE_NAME));
    if path.exists() {
        bail!("{} already exists, not overwriting", path.display());
    }
    std::fs::write(&path, Config::default().to_toml())
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

/// Append `suffix` to the output stem without clobbering an existing
/// extension in it.
fn output_path(stem: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(stem.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn report(label: &str, reports: &[LoadReport], quiet: bool) {
    if quiet {
        return;
    }
    for entry in reports {
        eprintln!(
            "{} {}: {}",
            label.yellow(),
            entry.filename.bold(),
            entry.reason
        );
    }
}

fn run(directory: &Path, config: Config, quiet: bool) -> Result<()> {
    let speaker_id = if config.speaker_id.is_empty() {
        // Fall back to the session directory's name.
        directory
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("speaker")
            .to_string()
    } else {
        config.speaker_id.clone()
    };
    let output_stem = if config.output_file.as_os_str().is_empty() {
        directory.join("concatenated")
    } else {
        config.output_file.clone()
    };

    let mut trials = load_trials(
        directory,
        &speaker_id,
        config.flags.test,
        config.flags.require_sensor,
    )?;
    report("excluded", &trials.reports, quiet);

    if let Some(list_path) = &config.exclusion_list {
        match ExclusionList::load(list_path)? {
            Some(list) => {
                let reports = list.apply(&mut trials.records);
                report("excluded", &reports, quiet);
            }
            None => eprintln!(
                "{} exclusion list {} not found, continuing without one",
                "warning:".yellow(),
                list_path.display()
            ),
        }
    }

    let dictionary = config
        .pronunciation_dictionary
        .as_deref()
        .map(read_pronunciation_dict)
        .transpose()?;

    let detector = config.flags.detect_beep.then_some(&config.detector);
    let audio = concatenate_trials(&mut trials.records, detector)?;
    report("tone not found", &audio.detection_failures, quiet);
    report("no speech", &audio.speech_warnings, quiet);

    let synthesizer = TierSynthesizer::new(
        &config.tiers,
        &config.tier_names,
        config.word_guess,
        dictionary.as_ref(),
    );
    let outcome = synthesizer.synthesize(&mut trials.records)?;
    report("annotation failed", &outcome.failures, quiet);

    let wav_path = output_path(&output_stem, ".wav");
    wav::write_wav(&wav_path, &audio)?;
    let csv_path = output_path(&output_stem, ".csv");
    results::write_results(&csv_path, &trials.records, config.flags.detect_beep)?;
    let grid_path = output_path(&output_stem, ".TextGrid");
    textgrid::write_textgrid(&grid_path, &outcome.tiers, audio.total_duration)?;
    let json_path = output_path(&output_stem, ".json");
    json::write_json(&json_path, &outcome.tiers, audio.total_duration)?;

    if !quiet {
        let accepted = trials.records.iter().filter(|r| !r.excluded).count();
        let excluded = trials.records.len() - accepted;
        println!(
            "{} {} trials ({} excluded), {:.3} s of audio",
            "Concatenated".green(),
            accepted,
            excluded,
            audio.total_duration
        );
        for path in [&wav_path, &csv_path, &grid_path, &json_path] {
            println!("  wrote {}", path.display());
        }
    }

    Ok(())
}
