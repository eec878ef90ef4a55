use std::path::PathBuf;

use anyhow::Context;
use terraform::config::GenerationParameters;
use terraform::render;
use terraform::terrain::BandTable;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    let defaults = GenerationParameters::default();
    let seed: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(42);
    let iterations: u32 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(defaults.iterations);
    let smoothness: f64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(defaults.smoothness);
    let out_dir: PathBuf = args
        .get(4)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("artifacts"));

    let bands = match args.get(5) {
        Some(path) => {
            let json = std::fs::read_to_string(path).with_context(|| format!("failed to read band table {path}"))?;
            BandTable::from_json(&json).with_context(|| format!("invalid band table {path}"))?
        }
        None => BandTable::default(),
    };

    std::fs::create_dir_all(&out_dir).context("failed to create output directory")?;

    let params = GenerationParameters {
        iterations,
        smoothness,
        ..defaults
    };
    params.validate()?;

    log::info!(
        "Generating {0}x{0} map with seed={seed}, iterations={iterations}, smoothness={smoothness}",
        params.size()
    );

    let (map, timings) = terraform::generate(seed, &params, &bands)?;

    eprintln!("\nTimings:");
    for t in &timings {
        eprintln!("  {:20} {:8.1} ms", t.name, t.ms);
    }
    eprintln!("Heights: [{:.3}, {:.3}]", map.min, map.max);

    let size = map.size;
    let save = |name: &str, rgba: &[u8]| -> anyhow::Result<()> {
        let path = out_dir.join(name);
        image::save_buffer(&path, rgba, size as u32, size as u32, image::ColorType::Rgba8)
            .with_context(|| format!("failed to save {}", path.display()))?;
        log::info!("Saved {}", path.display());
        Ok(())
    };

    // 1. Grayscale heightmap
    save("heightmap.png", &render::render_heightmap(&map.height))?;

    // 2. Flat terrain bands
    save("terrain.png", &render::render_terrain(&map.terrain, &bands))?;

    // 3. Shaded map
    save("map.png", &map.rgba)?;

    // 4. Raw heights
    let text_path = out_dir.join("heights.txt");
    std::fs::write(&text_path, render::heights_to_text(&map.height))
        .with_context(|| format!("failed to write {}", text_path.display()))?;
    log::info!("Saved {}", text_path.display());

    eprintln!("\nDone.");
    Ok(())
}
