//! `pdf` command: keymap SVG to a merged, paginated PDF.
//!
//! ```text
//! load ─► layers ─► exclude ─► paginate ─► page SVGs
//!                                             │
//!                          render (page_K.pdf in a staging dir)
//!                                             │
//!                                 merge in page order ─► output
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use tempfile::TempDir;

use super::common::{layer_total, load_keymap, report_layers, report_pages};
use crate::{
    config::KeysheetConfig,
    core::is_shutdown,
    debug, log,
    logger::ProgressLine,
    render::{DocumentMerger, LopdfMerger, PageRenderer, RsvgConvert, fit_to_page},
    svg::{self, PageDocument, PageSize},
    utils::{path::relative_to, plural_count},
};

/// One conversion run with every path resolved.
#[derive(Debug, Clone)]
pub struct PdfJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub exclude: Vec<String>,
    pub layers_per_page: usize,
    pub height: Option<f64>,
    /// Target page `(width, height)` in points.
    pub page: (f64, f64),
    pub jobs: usize,
}

impl PdfJob {
    pub fn from_config(config: &KeysheetConfig) -> Self {
        let pdf = &config.pdf;
        Self {
            input: config.root_join(&pdf.input),
            output: config.root_join(&pdf.output),
            exclude: pdf.exclude.clone(),
            layers_per_page: pdf.layers_per_page,
            height: pdf.height,
            page: (pdf.page_width, pdf.page_height),
            jobs: pdf.jobs,
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfReport {
    /// Layer names per page, in page order.
    pub pages: Vec<Vec<String>>,
}

/// Entry point for `keysheet pdf`.
pub fn convert_keymap(config: &KeysheetConfig) -> Result<()> {
    let renderer = RsvgConvert::new(
        &config.pdf.renderer,
        Duration::from_secs(config.pdf.timeout_secs),
    );
    renderer.check_available()?;

    let job = PdfJob::from_config(config);
    let report = convert(&job, &renderer, &LopdfMerger)?;

    let layers: usize = report.pages.iter().map(Vec::len).sum();
    log!(
        "pdf";
        "created {} ({}, {})",
        relative_to(&config.root, &job.output).display(),
        plural_count(report.pages.len(), "page"),
        plural_count(layers, "layer")
    );
    Ok(())
}

/// Run the whole pipeline with the given collaborators.
pub fn convert(
    job: &PdfJob,
    renderer: &dyn PageRenderer,
    merger: &dyn DocumentMerger,
) -> Result<PdfReport> {
    let size = PageSize::new(job.layers_per_page)?;
    let keymap = load_keymap(&job.input, job.height)?;
    report_layers("pdf", &keymap, &job.exclude);

    let pages = keymap
        .pages(&job.exclude, size)
        .with_context(|| format!("Failed to build pages from {}", job.input.display()))?;
    report_pages("pdf", &pages);

    // Dropped on every exit path, taking the per-page files with it.
    let staging = TempDir::new().context("Failed to create staging directory")?;
    let files = render_pages(&pages, job, renderer, staging.path())?;

    if let Some(parent) = job.output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    merger
        .merge(&files, &job.output)
        .with_context(|| format!("Failed to merge pages into {}", job.output.display()))?;

    debug!("pdf"; "merged {} layers", layer_total(&pages));
    Ok(PdfReport {
        pages: pages.into_iter().map(|page| page.layers).collect(),
    })
}

/// Render every page into `staging`, returning the files in page order.
///
/// Any failure aborts the run; with `jobs > 1` pages render concurrently and
/// the collected order is still page order.
fn render_pages(
    pages: &[PageDocument],
    job: &PdfJob,
    renderer: &dyn PageRenderer,
    staging: &Path,
) -> Result<Vec<PathBuf>> {
    let progress = ProgressLine::new("render", "pages", pages.len());

    let render_one = |(index, page): (usize, &PageDocument)| -> Result<PathBuf> {
        if is_shutdown() {
            bail!("Interrupted");
        }
        let number = index + 1;
        let path = staging.join(format!("page_{number}.pdf"));
        check_extent(number, page)?;
        let size = fit_to_page(page.size(), job.page)
            .with_context(|| format!("Page {number} does not fit the target page size"))?;
        let svg = page.doc.to_bytes()?;

        renderer
            .render(&svg, size, &path)
            .with_context(|| format!("Failed to render page {number} with {}", renderer.name()))?;

        debug!("render"; "page {number}: {}x{} pt -> {}", size.width, size.height, path.display());
        progress.inc();
        Ok(path)
    };

    let files = if job.jobs > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(job.jobs)
            .build()
            .context("Failed to start render workers")?;
        pool.install(|| {
            pages
                .par_iter()
                .enumerate()
                .map(render_one)
                .collect::<Result<Vec<_>>>()
        })?
    } else {
        pages
            .iter()
            .enumerate()
            .map(render_one)
            .collect::<Result<Vec<_>>>()?
    };

    progress.finish();
    Ok(files)
}

/// Pages spanning no height come from non-ascending layer offsets or a last
/// layer sitting on the canvas bottom. The run stops before rendering them.
fn check_extent(number: usize, page: &PageDocument) -> Result<()> {
    let (width, height) = page.size();
    if width > 0.0 && height > 0.0 {
        return Ok(());
    }
    bail!(
        "Geometry anomaly on page {number} ({}): the page spans {}x{}. \
         Layer offsets are not ascending or the last layer starts at the bottom \
         of the canvas (try --height)",
        page.layers.join(", "),
        svg::number(width),
        svg::number(height)
    )
}
