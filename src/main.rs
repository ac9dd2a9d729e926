use string_weaver::image::ImageF32;
use string_weaver::{
    CancelToken, GeneratorConfig, GreedySelector, ImportanceMap, ImportanceOptions, PinLayout,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Demo stub: a dark disk on a white background, 120 pins, 600 lines.
    let (w, h) = (200usize, 200usize);
    let mut luminance = ImageF32::filled(w, h, 1.0);
    for y in 0..h {
        for x in 0..w {
            let (dx, dy) = (x as f32 - 100.0, y as f32 - 100.0);
            if dx * dx + dy * dy < 50.0 * 50.0 {
                luminance.set(x, y, 0.1);
            }
        }
    }

    let result = ImportanceMap::build(&luminance, None, &ImportanceOptions::default())
        .and_then(|importance| {
            let pins = PinLayout::inscribed(w, h, 120)?;
            let config = GeneratorConfig {
                pin_count: pins.len(),
                max_lines: 600,
                ..Default::default()
            };
            let selector = GreedySelector::new(&importance, &pins, config)?;
            Ok(selector.run(|_, _| {}, &CancelToken::new()))
        });

    match result {
        Ok(res) => println!(
            "lines={} completion={:?} residual={:.1}",
            res.sequence.len(),
            res.completion,
            res.residual_l1
        ),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
