#![deny(clippy::all, clippy::pedantic)]
//! fetch-images — download the PNG for every emoji into the workflow's
//! `images/` directory.
//!
//! Files are named by image ID (see `alfred_emoji::emoji::image_id`) and
//! fetched from the `emoji-datasource-<set>` package on a CDN.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use alfred_emoji::emoji::all_image_ids;

#[derive(Debug, Parser)]
#[command(
    name = "fetch-images",
    about = "Download emoji images for the alfred-emoji workflow",
    version
)]
struct Args {
    /// Output directory.
    #[arg(long, default_value = "images")]
    out: PathBuf,

    /// Image set: apple, google, twitter or facebook.
    #[arg(long, default_value = "apple")]
    set: String,

    /// Image size in pixels (16, 20, 32 or 64).
    #[arg(long, default_value_t = 64)]
    size: u32,

    /// `emoji-datasource` package version.
    #[arg(long, default_value = "15.1.2")]
    dataset_version: String,

    /// CDN serving npm packages.
    #[arg(long, default_value = "https://cdn.jsdelivr.net/npm")]
    cdn: String,

    /// Download even if the file already exists.
    #[arg(long)]
    force: bool,
}

impl Args {
    fn url(&self, id: &str) -> String {
        format!(
            "{cdn}/emoji-datasource-{set}@{version}/img/{set}/{size}/{id}.png",
            cdn = self.cdn.trim_end_matches('/'),
            set = self.set,
            version = self.dataset_version,
            size = self.size,
        )
    }
}

#[derive(Debug, Default)]
struct Summary {
    downloaded: usize,
    skipped: usize,
    missing: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;

    let ids = all_image_ids();
    info!(count = ids.len(), out = %args.out.display(), "downloading emoji images");

    let mut summary = Summary::default();
    for id in &ids {
        let dest = args.out.join(format!("{id}.png"));
        if dest.exists() && !args.force {
            summary.skipped += 1;
            continue;
        }
        let url = args.url(id);
        if fetch(&url, &dest)? {
            debug!(%url, "downloaded");
            summary.downloaded += 1;
        } else {
            warn!(%url, "no image in dataset");
            summary.missing += 1;
        }
    }

    info!(
        downloaded = summary.downloaded,
        skipped = summary.skipped,
        missing = summary.missing,
        "done"
    );
    Ok(())
}

/// Download `url` to `dest`. Returns `false` if the CDN has no such file.
fn fetch(url: &str, dest: &Path) -> Result<bool> {
    let response = match ureq::get(url).call() {
        Ok(response) => response,
        Err(ureq::Error::StatusCode(404)) => return Ok(false),
        Err(e) => return Err(e).with_context(|| format!("GET {url}")),
    };

    let partial = dest.with_extension("part");
    let mut file =
        File::create(&partial).with_context(|| format!("creating {}", partial.display()))?;
    io::copy(&mut response.into_body().into_reader(), &mut file)
        .with_context(|| format!("writing {}", partial.display()))?;
    fs::rename(&partial, dest).with_context(|| format!("renaming to {}", dest.display()))?;
    Ok(true)
}
