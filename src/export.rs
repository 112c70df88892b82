//! Writes a batch to disk: `problems.json` plus one media folder per problem,
//! so equal image names from different pages never collide.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::problem::Problem;

pub const PROBLEMS_FILE: &str = "problems.json";
pub const MEDIA_DIR: &str = "media";

#[derive(Serialize)]
struct ExportedProblem<'a> {
    #[serde(flatten)]
    problem: &'a Problem,
    /// Relative to the output directory; absent when the problem has no images.
    media_dir: Option<String>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub problems: usize,
    pub images: usize,
}

pub fn write_output(problems: &[Problem], output_dir: &Path) -> Result<ExportSummary> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    let mut summary = ExportSummary::default();
    let mut used_slugs = HashSet::new();
    let mut exported = Vec::with_capacity(problems.len());

    for (index, problem) in problems.iter().enumerate() {
        let media_dir = if problem.images.is_empty() {
            None
        } else {
            let slug = unique_slug(&problem.title, index, &mut used_slugs);
            let relative = format!("{MEDIA_DIR}/{slug}");
            let dir = output_dir.join(&relative);
            fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
            for image in &problem.images {
                let path = dir.join(&image.filename);
                fs::write(&path, &image.data)
                    .with_context(|| format!("writing image {}", path.display()))?;
                summary.images += 1;
            }
            Some(relative)
        };
        exported.push(ExportedProblem { problem, media_dir });
    }

    let json = serde_json::to_string_pretty(&exported)?;
    let path = output_dir.join(PROBLEMS_FILE);
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    summary.problems = exported.len();
    Ok(summary)
}

/// Lowercase ASCII words joined by `-`.
pub fn slugify(title: &str) -> String {
    title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

fn unique_slug(title: &str, index: usize, used: &mut HashSet<String>) -> String {
    let base = match slugify(title) {
        s if s.is_empty() => format!("problem-{index}"),
        s => s,
    };
    let mut slug = base.clone();
    let mut n = 2;
    while !used.insert(slug.clone()) {
        slug = format!("{base}-{n}");
        n += 1;
    }
    slug
}
