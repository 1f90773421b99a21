use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use site_bundler::bundle::fingerprint::content_hash;
use site_bundler::{BuildConfig, BuildError, SiteBuilder};
use tempfile::tempdir;

const COMPACT_BLOCK: &str =
  r#"<!--build:js app.js--><script src="a.js"></script><script src="b.js"></script><!--endbuild-->"#;

fn write(root: &Path, relative: &str, content: &str) {
  let path = root.join(relative);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, content).unwrap();
}

fn read(root: &Path, relative: &str) -> String {
  fs::read_to_string(root.join(relative)).unwrap()
}

fn manifest(root: &Path) -> BTreeMap<String, String> {
  serde_json::from_str(&read(root, "dist/rev-manifest.json")).unwrap()
}

fn config() -> BuildConfig {
  BuildConfig {
    minify_scripts: false,
    minify_styles: false,
    cache_bust: true,
    ..BuildConfig::default()
  }
}

#[test]
fn bundles_and_fingerprints_a_compact_block() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  write(root, "app/views/index.html", COMPACT_BLOCK);
  write(root, "app/views/a.js", "x();");
  write(root, "app/views/b.js", "y();");

  let config = config();
  let report = SiteBuilder::new(&config, root).build().unwrap();
  assert!(report.is_success(), "{report}");

  let revved = format!("app.{}.js", content_hash(b"x();\ny();"));
  assert_eq!(read(root, &format!("dist/{revved}")), "x();\ny();");
  assert_eq!(
    read(root, ".tmp/jade/index.html"),
    format!(r#"<script src="{revved}"></script>"#)
  );
  assert_eq!(manifest(root), BTreeMap::from([("app.js".to_string(), revved)]));
}

#[test]
fn missing_asset_is_reported_but_bundle_is_written() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  write(root, "app/views/index.html", COMPACT_BLOCK);
  write(root, "app/views/a.js", "x();");

  let config = config();
  let report = SiteBuilder::new(&config, root).build().unwrap();
  assert!(!report.is_success());
  assert_eq!(report.errors.len(), 1);
  match &report.errors[0] {
    BuildError::MissingAsset { asset, output, .. } => {
      assert_eq!(asset, "b.js");
      assert_eq!(output, "app.js");
    }
    other => panic!("unexpected error {other:?}"),
  }

  let revved = format!("app.{}.js", content_hash(b"x();"));
  assert_eq!(read(root, &format!("dist/{revved}")), "x();");
}

#[test]
fn disabled_cache_busting_keeps_declared_paths() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  write(root, "app/views/index.html", COMPACT_BLOCK);
  write(root, "app/views/a.js", "x();");
  write(root, "app/views/b.js", "y();");

  let config = BuildConfig {
    cache_bust: false,
    manifest_merge: false,
    ..config()
  };
  let report = SiteBuilder::new(&config, root).build().unwrap();
  assert!(report.is_success());
  assert_eq!(read(root, "dist/app.js"), "x();\ny();");
  assert_eq!(read(root, ".tmp/jade/index.html"), r#"<script src="app.js"></script>"#);
  assert!(manifest(root).is_empty());
}

#[test]
fn identical_inputs_produce_identical_outputs() {
  let build = || {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "app/styles/a.css", "a { color: red; }");
    write(root, "app/styles/b.css", "b { margin: 0; }");
    write(
      root,
      "app/views/z.html",
      "<!-- build:css styles/main.css -->\n<link rel=\"stylesheet\" href=\"styles/a.css\">\n<link rel=\"stylesheet\" href=\"styles/b.css\">\n<!-- endbuild -->\n",
    );
    write(
      root,
      "app/views/a.html",
      "<!-- build:css styles/main.css -->\n<link rel=\"stylesheet\" href=\"styles/a.css\">\n<link rel=\"stylesheet\" href=\"styles/b.css\">\n<!-- endbuild -->\n",
    );
    let config = BuildConfig {
      minify_styles: true,
      ..config()
    };
    SiteBuilder::new(&config, root).build().unwrap();
    (read(root, "dist/rev-manifest.json"), read(root, ".tmp/jade/a.html"))
  };

  assert_eq!(build(), build());
}

#[test]
fn revisioned_paths_are_replaced_in_every_eligible_output() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  write(root, "app/styles/site.css", "body { color: black; }");
  write(root, "app/scripts/one.js", "load('/styles/site.css');");
  write(
    root,
    "app/views/index.html",
    "<link rel=\"preload\" href=\"/styles/site.css\">\n<!-- build:css /styles/site.css -->\n<link rel=\"stylesheet\" href=\"/styles/site.css\">\n<!-- endbuild -->\n<!-- build:js /scripts/app.js -->\n<script src=\"/scripts/one.js\"></script>\n<!-- endbuild -->\n",
  );
  write(root, "app/views/notes.txt", "/styles/site.css");

  let config = BuildConfig {
    markup_glob: "**/*.{html,txt}".into(),
    ..config()
  };
  let report = SiteBuilder::new(&config, root).build().unwrap();
  assert!(report.is_success(), "{report}");

  let entries = manifest(root);
  let css = &entries["styles/site.css"];
  let js = &entries["scripts/app.js"];

  let markup = read(root, ".tmp/jade/index.html");
  assert!(markup.contains(&format!("<link rel=\"preload\" href=\"/{css}\">")));
  assert!(markup.contains(&format!("<link rel=\"stylesheet\" href=\"/{css}\">")));
  assert!(markup.contains(&format!("<script src=\"/{js}\"></script>")));
  assert!(!markup.contains("styles/site.css"));

  assert_eq!(read(root, &format!("dist/{js}")), format!("load('/{css}');"));
  assert_eq!(read(root, ".tmp/jade/notes.txt"), "/styles/site.css");
}

#[test]
fn manifest_merge_keeps_entries_from_earlier_runs() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  write(root, "app/views/index.html", COMPACT_BLOCK);
  write(root, "app/views/a.js", "x();");
  write(root, "app/views/b.js", "y();");
  write(root, "dist/rev-manifest.json", r#"{ "legacy.css": "legacy.0.css", "app.js": "app.0.js" }"#);

  let config = config();
  SiteBuilder::new(&config, root).build().unwrap();

  let entries = manifest(root);
  assert_eq!(entries["legacy.css"], "legacy.0.css");
  assert_eq!(entries["app.js"], format!("app.{}.js", content_hash(b"x();\ny();")));
}

#[test]
fn unreadable_prior_manifest_is_a_recoverable_error() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  write(root, "app/views/index.html", COMPACT_BLOCK);
  write(root, "app/views/a.js", "x();");
  write(root, "app/views/b.js", "y();");
  write(root, "dist/rev-manifest.json", "not json");

  let config = config();
  let report = SiteBuilder::new(&config, root).build().unwrap();
  assert!(matches!(report.errors.as_slice(), [BuildError::ManifestWrite { .. }]));
  assert_eq!(report.bundles_written.len(), 1);
  assert!(report.manifest_path.is_none());
}

#[test]
fn jade_templates_resolve_through_alternate_roots() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  write(root, ".tmp/scripts/templates.js", "tpl();");
  write(root, "app/scripts/main.js", "main();");
  write(
    root,
    "app/views/layouts/base.jade",
    "html\n  body\n    // build:js(.tmp,app) scripts/app.js\n    script(src='scripts/templates.js')\n    script(src='scripts/main.js')\n    // endbuild\n",
  );

  let config = BuildConfig {
    cache_bust: false,
    ..config()
  };
  let report = SiteBuilder::new(&config, root).build().unwrap();
  assert!(report.is_success(), "{report}");
  assert_eq!(read(root, "dist/scripts/app.js"), "tpl();\nmain();");
  assert_eq!(
    read(root, ".tmp/jade/layouts/base.jade"),
    "html\n  body\n    script(src='scripts/app.js')\n"
  );
}

#[test]
fn minified_bundles_are_hashed_after_transform() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  write(root, "app/views/index.html", COMPACT_BLOCK);
  write(root, "app/views/a.js", "x( 1 ); // first");
  write(root, "app/views/b.js", "y( 2 );");

  let config = BuildConfig {
    minify_scripts: true,
    ..config()
  };
  SiteBuilder::new(&config, root).build().unwrap();

  let revved = format!("app.{}.js", content_hash(b"x(1);y(2);"));
  assert_eq!(read(root, &format!("dist/{revved}")), "x(1);y(2);");
}
