use anyhow::{Context, Result};
use formcrop::crop::resolve_field_name;
use formcrop::prelude::*;
use std::path::Path;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let (image_path, blueprint_path) = match (args.next(), args.next()) {
        (Some(image), Some(blueprint)) => (image, blueprint),
        _ => anyhow::bail!("usage: preview_blueprint <image> <blueprint.json>"),
    };

    let image = image::open(&image_path).with_context(|| format!("Failed to read {}", image_path))?;
    let blueprint = load_blueprint(Path::new(&blueprint_path))?;

    println!("Image: {} ({}x{})", image_path, image.width(), image.height());
    println!("Blueprint entries: {}", blueprint.len());
    println!("{}", "=".repeat(60));

    let mut produced = 0;
    for entry in &blueprint.entries {
        let name = resolve_field_name(entry, NameResolution::Template, produced);
        let rect = to_pixel_rect(entry, image.width(), image.height());

        if rect.is_empty() {
            println!("{:<20} skipped (outside the image)", name);
            continue;
        }
        produced += 1;

        println!(
            "{:<20} x={:<5} y={:<5} w={:<5} h={:<5} ({:.1}%, {:.1}%, {:.1}%, {:.1}%)",
            name, rect.x, rect.y, rect.w, rect.h, entry.x, entry.y, entry.width, entry.height
        );
    }

    Ok(())
}
