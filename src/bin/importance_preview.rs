use string_weaver::config::generate;
use string_weaver::edges::edge_strength;
use string_weaver::image::io::{save_grayscale_f32, save_grayscale_normalized};
use string_weaver::preprocess::load_luminance;
use string_weaver::ImportanceMap;
use std::env;
use std::path::Path;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn usage() -> String {
    "Usage: importance_preview <config.json>".to_string()
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = generate::load_config(Path::new(&config_path))?;

    let luminance = load_luminance(&config.input, &config.preprocess)?;
    let edges = edge_strength(&luminance, config.edges.kernel);
    let importance = ImportanceMap::build(
        &luminance,
        config.edges.enabled.then_some(&edges),
        &config.importance,
    )
    .map_err(|e| format!("Invalid importance options: {e}"))?;

    let dir = &config.output.dir;
    save_grayscale_f32(&luminance, &dir.join("luminance.png"))?;
    save_grayscale_f32(&edges, &dir.join("edges.png"))?;
    save_grayscale_normalized(importance.grid(), &dir.join("importance.png"))?;

    let (w, h) = importance.shape();
    println!(
        "Preview for {}x{} grid written to {} (total importance {:.1})",
        w,
        h,
        dir.display(),
        importance.total()
    );
    Ok(())
}
