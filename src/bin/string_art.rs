use log::info;
use string_weaver::config::generate;
use string_weaver::diagnostics::{GenerationReport, TimingBreakdown};
use string_weaver::edges::edge_strength;
use string_weaver::image::io::{save_grayscale_normalized, write_json_file, write_text_file};
use string_weaver::preprocess::load_luminance;
use string_weaver::render::{render_sequence, save_render};
use string_weaver::{CancelToken, GreedySelector, ImportanceMap, PinLayout};
use std::env;
use std::path::Path;
use std::time::Duration;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn usage() -> String {
    "Usage: string_art <config.json>".to_string()
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = generate::load_config(Path::new(&config_path))?;
    let mut timings = TimingBreakdown::default();

    let luminance = timings.time("preprocess", || {
        load_luminance(&config.input, &config.preprocess)
    })?;
    let edges = if config.edges.enabled {
        Some(timings.time("edges", || edge_strength(&luminance, config.edges.kernel)))
    } else {
        None
    };
    let importance = timings
        .time("importance", || {
            ImportanceMap::build(&luminance, edges.as_ref(), &config.importance)
        })
        .map_err(|e| format!("Invalid importance options: {e}"))?;

    let (w, h) = importance.shape();
    let pins = PinLayout::inscribed(w, h, config.generator.pin_count)
        .map_err(|e| format!("Invalid pin layout: {e}"))?;
    let selector = GreedySelector::new(&importance, &pins, config.generator.clone())
        .map_err(|e| format!("Invalid generator config: {e}"))?;

    let mut cancel = CancelToken::new();
    if let Some(secs) = config.output.timeout_secs {
        let timeout = Duration::try_from_secs_f64(secs)
            .map_err(|e| format!("Invalid timeout_secs {secs}: {e}"))?;
        cancel = cancel.with_timeout(timeout);
    }
    let every = config.output.progress_every;
    let max_lines = config.generator.max_lines;
    info!(
        "Generating up to {} lines over {} pins on a {}x{} grid",
        max_lines,
        pins.len(),
        w,
        h
    );
    let result = timings.time("generate", || {
        selector.run(
            |i, seg| {
                if every > 0 && (i + 1) % every == 0 {
                    info!("{}/{} lines (last {} -> {})", i + 1, max_lines, seg.from, seg.to);
                }
            },
            &cancel,
        )
    });

    let canvas = timings.time("render", || {
        render_sequence(&pins, &result.sequence, w, h, &config.render)
    });
    let image_path = save_render(&canvas, &config.output.image_path())?;
    println!("Image written to {}", image_path.display());

    if let Some(path) = &config.output.instructions {
        write_text_file(path, &result.sequence.to_instructions())?;
        println!("Instructions written to {}", path.display());
    }
    if let Some(path) = &config.output.coverage_image {
        save_grayscale_normalized(&result.coverage, path)?;
    }

    let report = GenerationReport::new(&importance, &pins, &result, timings);
    println!("{}", report.summary_line());
    if let Some(path) = &config.output.report_json {
        write_json_file(path, &report)?;
        println!("JSON report written to {}", path.display());
    }
    Ok(())
}
