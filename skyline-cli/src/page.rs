//! Self-contained browser page: current conditions, forecast table, the
//! failure banner and a Chart.js bar chart.

use std::{fs, path::Path};

use anyhow::Context as _;
use skyline_core::{Banner, RenderedView};
use tera::{Context, Tera};

const CHART_JS: &str = "https://cdn.jsdelivr.net/npm/chart.js";
const PAGE_TEMPLATE: &str = "page.html";
const PAGE: &str = include_str!("../templates/page.html");

/// Builds the page. With no view only the banner (if visible) is shown.
pub fn build(view: Option<&RenderedView>, banner: &Banner) -> anyhow::Result<String> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![".html"]);
    tera.add_raw_template(PAGE_TEMPLATE, PAGE)
        .context("Failed to compile page template")?;

    let mut ctx = Context::new();
    ctx.insert("view", &view);
    ctx.insert("banner_message", &banner.message());
    ctx.insert("chart_js", CHART_JS);

    tera.render(PAGE_TEMPLATE, &ctx)
        .context("Failed to render weather page")
}

pub fn write(path: &Path, view: Option<&RenderedView>, banner: &Banner) -> anyhow::Result<()> {
    let html = build(view, banner)?;
    fs::write(path, html).with_context(|| format!("Failed to write page: {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote weather page");
    Ok(())
}
