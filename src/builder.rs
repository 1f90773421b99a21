//! Build orchestrator: scans markup, assembles bundles and writes the rewritten site.
//!
//! The build runs in two phases. Phase one handles each markup file on its own, producing
//! rewritten markup plus fingerprinted bundles entirely in memory. Once every file is done
//! the results are folded into a [`BundlePlan`], which applies the global revision rewrite,
//! writes outputs and finally persists the manifest.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use same_file::is_same_file;

use crate::asset_paths::ResolveContext;
use crate::bundle::concat::concat_block;
use crate::bundle::rewrite::{RevisionRewriter, SpanReplacement, reference_href, rewrite_spans};
use crate::bundle::transform::transform_bundle;
use crate::config::{BuildConfig, Pipeline};
use crate::error::{BuildError, BuildReport, BuildResult};
use crate::manifest::{RevManifest, persist_manifest};
use crate::models::{AssetKind, Bundle, ProcessedMarkup, RenderedMarkup};
use crate::scan::{MarkupSyntax, discover_files, scan_blocks};

/// High-level helper running a full build for one configuration.
pub struct SiteBuilder<'a> {
  config: &'a BuildConfig,
  base_dir: &'a Path,
  pipeline: Pipeline,
}

impl<'a> SiteBuilder<'a> {
  /// Create a builder resolving configured paths against `base_dir`.
  pub fn new(config: &'a BuildConfig, base_dir: &'a Path) -> Self {
    Self {
      config,
      base_dir,
      pipeline: config.pipeline(),
    }
  }

  /// Run both phases and persist the manifest.
  ///
  /// Recoverable problems are collected in the returned report. Fatal ones (a bundle that
  /// fails to minify, an invalid glob, unexpected I/O) abort the build; a transform failure
  /// always surfaces before anything has been written.
  pub fn build(&self) -> BuildResult<BuildReport> {
    let mut report = BuildReport::default();
    let markup_root = self.config.markup_root_path(self.base_dir);
    let files = discover_files(&markup_root, &self.config.markup_glob)?;
    tracing::info!(
      root = %markup_root.display(),
      files = files.len(),
      "discovered markup files"
    );

    let mut processed = Vec::with_capacity(files.len());
    for relative in &files {
      if let Some(result) = self.process_markup(&markup_root, relative, &mut report)? {
        processed.push(result);
      }
    }

    let mut plan = BundlePlan::from_phase_one(processed);
    tracing::info!(
      markup = plan.markup.len(),
      bundles = plan.bundles.len(),
      revisions = plan.manifest.len(),
      "phase one complete"
    );

    plan.apply_revisions(self.config);
    plan.ensure_sources_untouched(self.config, self.base_dir)?;
    plan.write(self.config, self.base_dir, &mut report)?;

    let manifest_path = self.config.manifest_path(self.base_dir);
    match persist_manifest(&manifest_path, &plan.manifest, self.pipeline.manifest) {
      Ok(_) => report.manifest_path = Some(manifest_path),
      Err(err) => report.push(err),
    }

    tracing::info!(
      bundles = report.bundles_written.len(),
      markup = report.markup_written.len(),
      problems = report.errors.len(),
      "build finished"
    );
    Ok(report)
  }

  /// Phase one for a single markup file. Returns `None` when the file was skipped.
  fn process_markup(
    &self,
    markup_root: &Path,
    relative: &Path,
    report: &mut BuildReport,
  ) -> BuildResult<Option<ProcessedMarkup>> {
    let source = markup_root.join(relative);
    let text = fs::read_to_string(&source).map_err(|err| BuildError::io(&source, err))?;
    let syntax = MarkupSyntax::for_path(relative);

    let blocks = match scan_blocks(relative, syntax, &text) {
      Ok(blocks) => blocks,
      Err(err) => {
        collect(report, err)?;
        return Ok(None);
      }
    };
    tracing::debug!(file = %relative.display(), blocks = blocks.len(), "scanned markup");

    let markup_dir = source.parent().unwrap_or(markup_root);
    let search_root = self.config.search_root_path(self.base_dir);
    let context = ResolveContext {
      base_dir: self.base_dir,
      markup_dir,
      search_root: &search_root,
    };

    let mut replacements = Vec::with_capacity(blocks.len());
    let mut bundles = Vec::new();
    let mut revisions = Vec::new();
    let mut sources = vec![source.clone()];

    for block in &blocks {
      if block.kind == AssetKind::Remove {
        replacements.push(SpanReplacement {
          span: block.span,
          kind: block.kind,
          href: String::new(),
        });
        continue;
      }

      let outcome = concat_block(&context, block)?;
      for asset in outcome.missing {
        report.push(BuildError::MissingAsset {
          file: relative.to_path_buf(),
          output: block.output_path.clone(),
          asset,
        });
      }
      sources.extend(outcome.sources);

      let mut bundle = outcome.bundle;
      transform_bundle(&self.pipeline, &mut bundle)?;
      if let Some(entry) = self.pipeline.fingerprint.apply(&mut bundle) {
        revisions.push(entry);
      }

      replacements.push(SpanReplacement {
        span: block.span,
        kind: block.kind,
        href: reference_href(&block.output_path, &bundle.path),
      });
      bundles.push(bundle);
    }

    Ok(Some(ProcessedMarkup {
      markup: RenderedMarkup {
        relative_path: relative.to_path_buf(),
        text: rewrite_spans(syntax, &text, &replacements),
      },
      bundles,
      revisions,
      sources,
    }))
  }
}

/// Record a recoverable error, or hand a fatal one back to the caller.
fn collect(report: &mut BuildReport, err: BuildError) -> BuildResult<()> {
  if err.is_fatal() {
    return Err(err);
  }
  report.push(err);
  Ok(())
}

/// Everything phase one produced, ready for the global rewrite and output.
///
/// Only constructible from completed phase-one results, so the global rewrite can never
/// observe a partially fingerprinted build.
#[derive(Debug)]
pub struct BundlePlan {
  markup: Vec<RenderedMarkup>,
  bundles: BTreeMap<String, Bundle>,
  manifest: RevManifest,
  sources: Vec<PathBuf>,
}

impl BundlePlan {
  /// Fold per-file results into one plan. Bundles sharing a final path are written once.
  pub fn from_phase_one(processed: Vec<ProcessedMarkup>) -> Self {
    let mut plan = Self {
      markup: Vec::with_capacity(processed.len()),
      bundles: BTreeMap::new(),
      manifest: RevManifest::new(),
      sources: Vec::new(),
    };

    for result in processed {
      for entry in result.revisions {
        let revved = entry.revved.clone();
        if let Some(previous) = plan.manifest.record(entry)
          && previous != revved
        {
          tracing::warn!(
            previous = %previous,
            current = %revved,
            "revision replaced within one build, keeping the last"
          );
        }
      }
      for bundle in result.bundles {
        if let Some(existing) = plan.bundles.get(&bundle.path)
          && existing.content != bundle.content
        {
          tracing::warn!(
            path = %bundle.path,
            "bundle declared with different content in several files, keeping the last"
          );
        }
        plan.bundles.insert(bundle.path.clone(), bundle);
      }
      plan.sources.extend(result.sources);
      plan.markup.push(result.markup);
    }

    plan.sources.sort();
    plan.sources.dedup();
    plan
  }

  /// Rewritten markup in processing order.
  pub fn markup(&self) -> &[RenderedMarkup] {
    &self.markup
  }

  /// Bundles keyed by final path.
  pub fn bundles(&self) -> &BTreeMap<String, Bundle> {
    &self.bundles
  }

  /// Revisions recorded during this run.
  pub fn manifest(&self) -> &RevManifest {
    &self.manifest
  }

  /// Replace every declared bundle path with its fingerprinted path in eligible outputs.
  pub fn apply_revisions(&mut self, config: &BuildConfig) {
    let rewriter = RevisionRewriter::new(self.manifest.entries());

    for markup in &mut self.markup {
      if !config.replaces_in(&markup.relative_path) {
        continue;
      }
      if let Cow::Owned(text) = rewriter.rewrite(&markup.text) {
        tracing::debug!(file = %markup.relative_path.display(), "rewrote revisioned paths");
        markup.text = text;
      }
    }

    for bundle in self.bundles.values_mut() {
      if !config.replaces_in(Path::new(&bundle.path)) {
        continue;
      }
      if let Cow::Owned(content) = rewriter.rewrite_bytes(&bundle.content) {
        tracing::debug!(bundle = %bundle.path, "rewrote revisioned paths");
        bundle.content = content;
      }
    }
  }

  /// Refuse to write when any destination is one of the files the build read from.
  pub fn ensure_sources_untouched(&self, config: &BuildConfig, base_dir: &Path) -> BuildResult<()> {
    for destination in self.destinations(config, base_dir) {
      if !destination.exists() {
        continue;
      }
      for source in &self.sources {
        let same = is_same_file(source, &destination)
          .map_err(|err| BuildError::io(&destination, err))?;
        if same {
          return Err(BuildError::io(
            destination,
            io::Error::new(
              io::ErrorKind::AlreadyExists,
              format!("output would overwrite build source {}", source.display()),
            ),
          ));
        }
      }
    }
    Ok(())
  }

  /// Write bundles and markup, recording what was written in the report.
  pub fn write(&self, config: &BuildConfig, base_dir: &Path, report: &mut BuildReport) -> BuildResult<()> {
    let output_dir = config.output_dir_path(base_dir);
    for bundle in self.bundles.values() {
      let destination = output_dir.join(&bundle.path);
      write_file(&destination, &bundle.content)?;
      tracing::debug!(path = %destination.display(), bytes = bundle.content.len(), "wrote bundle");
      report.bundles_written.push(destination);
    }

    let markup_dir = config.markup_output_path(base_dir);
    for markup in &self.markup {
      let destination = markup_dir.join(&markup.relative_path);
      write_file(&destination, markup.text.as_bytes())?;
      report.markup_written.push(destination);
    }
    Ok(())
  }

  fn destinations(&self, config: &BuildConfig, base_dir: &Path) -> Vec<PathBuf> {
    let output_dir = config.output_dir_path(base_dir);
    let markup_dir = config.markup_output_path(base_dir);
    self
      .bundles
      .keys()
      .map(|path| output_dir.join(path))
      .chain(self.markup.iter().map(|markup| markup_dir.join(&markup.relative_path)))
      .collect()
  }
}

fn write_file(destination: &Path, content: &[u8]) -> BuildResult<()> {
  if let Some(parent) = destination.parent() {
    fs::create_dir_all(parent).map_err(|err| BuildError::io(parent, err))?;
  }
  fs::write(destination, content).map_err(|err| BuildError::io(destination, err))
}
