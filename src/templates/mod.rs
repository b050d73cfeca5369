use std::path::Path;

use log::{error, info};
use minijinja::{Environment, context};
use serde::{Deserialize, Serialize};

use crate::{compose::PageView, conf::ServerConfig};

pub const TEMPLATE_INDEX: &str = "index.html";
pub const TEMPLATE_ERROR: &str = "error.html";

#[derive(Serialize)]
pub struct TemplateServerContext {
    pub name: String,
    pub version: &'static str,
}

#[derive(Serialize, Deserialize)]
pub struct TemplateErrorContext {
    pub code: u16,
    pub message: String,
}

fn checked_add_template<'a>(env: &mut Environment<'a>, entry: &'a str, data: &'a str) {
    match env.add_template(entry, data) {
        Ok(_) => {
            info!("Added template {}", entry)
        }
        Err(e) => {
            error!("Error adding template for \"{}\": {}", entry, e)
        }
    }
}

pub fn templates_from_builtin<'a>() -> Environment<'a> {
    let mut env = Environment::new();

    checked_add_template(&mut env, TEMPLATE_INDEX, include_str!("index.jinja"));
    checked_add_template(&mut env, TEMPLATE_ERROR, include_str!("error.jinja"));
    checked_add_template(&mut env, "header.html", include_str!("header.jinja"));
    checked_add_template(&mut env, "footer.html", include_str!("footer.jinja"));

    env
}

/// Loads every `*.html` and `*.jinja` file of `dir` as a template.
///
/// `page.jinja` is registered as `page.html`. Fails on the first template that
/// does not parse, or if the index or error template is missing.
pub fn templates_from_dir(dir: &Path) -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();

    let entries = std::fs::read_dir(dir).map_err(|e| {
        minijinja::Error::new(
            minijinja::ErrorKind::InvalidOperation,
            format!("cannot read template directory {}", dir.display()),
        )
        .with_source(e)
    })?;

    for entry in entries.flatten() {
        let path = entry.path();
        let (Some(stem), Some(ext)) = (
            path.file_stem().and_then(|s| s.to_str()),
            path.extension().and_then(|s| s.to_str()),
        ) else {
            continue;
        };
        if ext != "html" && ext != "jinja" {
            continue;
        }
        let source = std::fs::read_to_string(&path).map_err(|e| {
            minijinja::Error::new(
                minijinja::ErrorKind::InvalidOperation,
                format!("cannot read template {}", path.display()),
            )
            .with_source(e)
        })?;
        let name = format!("{}.html", stem);
        env.add_template_owned(name.clone(), source)?;
        info!("Added template {} from {}", name, path.display());
    }

    env.get_template(TEMPLATE_INDEX)?;
    env.get_template(TEMPLATE_ERROR)?;
    Ok(env)
}

/// Renders the page for one locale.
pub fn render_page(
    env: &Environment<'_>,
    config: &ServerConfig,
    view: &PageView,
) -> Result<String, minijinja::Error> {
    env.get_template(TEMPLATE_INDEX)?.render(context! {
        server => config.template_server_context(),
        page => view,
    })
}

/// Renders the error page.
pub fn render_error(
    env: &Environment<'_>,
    config: &ServerConfig,
    code: u16,
    message: &str,
) -> Result<String, minijinja::Error> {
    env.get_template(TEMPLATE_ERROR)?.render(context! {
        server => config.template_server_context(),
        error => TemplateErrorContext {
            code,
            message: message.to_string(),
        },
    })
}
