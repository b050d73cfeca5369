//! Fixtures for tests and benchmarks.
//!
//! Writes a small but complete site (assets plus content for `en`, `fi` and
//! `ru`) into a directory and returns a configuration pointing at it.

use std::path::Path;

use serde_json::json;

use crate::{conf::ServerConfig, content::SECTIONS};

pub const EXAMPLE_LOCALES: [&str; 3] = ["en", "fi", "ru"];

/// Writes `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

fn section_json(section: &str, tag: &str) -> serde_json::Value {
    let social = json!({
        "icon": "instagram.svg",
        "link": "https://instagram.com/example",
        "name": "Instagram",
        "tag": "@example"
    });
    match section {
        "intro" => json!({
            "top": format!("A new beginning ({})", tag),
            "middle": format!("Example ({})", tag),
            "bottom": format!("For your skin ({})", tag)
        }),
        "services" => json!([
            {
                "title": format!("Facials ({})", tag),
                "subtitle": "Classic",
                "description": "Deep cleansing",
                "icon": "face.svg",
                "prices": [
                    { "name": "Basic", "description": "45 min", "price": "60 €" },
                    { "name": "Deluxe", "description": "90 min", "price": "110 €" }
                ]
            },
            {
                "title": format!("Massage ({})", tag),
                "subtitle": "Relax",
                "description": "Full body",
                "icon": "hands.svg",
                "prices": [
                    { "name": "Short", "description": "30 min", "price": "40 €" }
                ]
            }
        ]),
        "brands" => json!({
            "title": format!("Brands ({})", tag),
            "description": "Products we trust"
        }),
        "about" => json!({
            "title": format!("About ({})", tag),
            "description": "A small salon",
            "button": "Read more",
            "extended": "Since 2010"
        }),
        "team" => json!([
            { "name": "Anna", "title": "Founder", "socials": [social.clone()] }
        ]),
        "contact" => json!([
            { "title": format!("Contact ({})", tag), "items": [social] }
        ]),
        _ => serde_json::Value::Null,
    }
}

/// Creates the example site under `root` and returns a matching configuration.
pub fn create_example_site(root: &Path) -> ServerConfig {
    let assets = root.join("static");
    let content = root.join("translations");

    write_file(&assets.join("style.css"), "body { margin: 0 }");
    write_file(&assets.join("docs/index.html"), "<h1>docs</h1>");
    write_file(&assets.join("empty/.keep"), "");
    for tag in EXAMPLE_LOCALES {
        write_file(
            &assets.join(format!("icons/languages/{}.svg", tag)),
            format!("<svg>{}</svg>", tag),
        );
    }
    write_file(&assets.join("icons/brands/acme.png"), "acme");
    write_file(&assets.join("icons/brands/globex.png"), "globex");

    for tag in EXAMPLE_LOCALES {
        for section in SECTIONS {
            let value = section_json(section, tag);
            write_file(
                &content.join(section).join(format!("{}.json", tag)),
                serde_json::to_vec_pretty(&value).unwrap(),
            );
        }
    }

    let mut config = ServerConfig::default();
    config.assets.directory = assets;
    config.content.directory = content;
    config
}
