//! Staging of robot asset bundles.
//!
//! A source bundle is a read-only directory holding a robot description
//! document and a `meshes/` subdirectory of geometry files. The document
//! references its meshes through a `package://<name>/meshes/` URI scheme
//! that a plain filesystem loader cannot resolve. [`stage`] produces a
//! loader-ready copy under a scratch directory: the meshes are symlinked in
//! and the URIs rewritten to relative paths, leaving the source bundle
//! untouched.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::AssetError;

// ---------------------------------------------------------------------------
// StageConfig
// ---------------------------------------------------------------------------

/// Where a robot's source assets live and where the staged copy goes.
#[derive(Debug, Clone)]
pub struct StageConfig {
    /// Read-only directory containing the description document and `meshes/`.
    pub source_dir: PathBuf,
    /// Writable scratch directory, created if absent. Owned by the staging
    /// step; safe to delete and regenerate at any time.
    pub scratch_dir: PathBuf,
    /// Path of the description document inside `source_dir`.
    pub description_rel_path: PathBuf,
    /// URI prefix replaced by `meshes/`, e.g. `package://robot/meshes/`.
    pub package_token: String,
    /// Filename of the staged description document.
    pub output_name: String,
}

impl StageConfig {
    /// Create a staging config with default document naming.
    pub fn new(source_dir: impl Into<PathBuf>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            scratch_dir: scratch_dir.into(),
            description_rel_path: PathBuf::from("robot.urdf"),
            package_token: "package://robot/meshes/".into(),
            output_name: "robot.urdf".into(),
        }
    }

    /// Builder: set the description document path inside the source bundle.
    pub fn with_description(mut self, rel_path: impl Into<PathBuf>) -> Self {
        self.description_rel_path = rel_path.into();
        self
    }

    /// Builder: set the URI prefix to strip.
    pub fn with_package_token(mut self, token: impl Into<String>) -> Self {
        self.package_token = token.into();
        self
    }

    /// Builder: set the staged document filename.
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }
}

// ---------------------------------------------------------------------------
// stage
// ---------------------------------------------------------------------------

/// Stage a source asset bundle into the scratch directory.
///
/// Creates `scratch_dir/meshes` as a symlink to `source_dir/meshes` and
/// writes a copy of the description document with every literal occurrence
/// of the package token replaced by `meshes/`. Idempotent: repeated calls
/// produce byte-identical output and refresh the symlink, so it keeps
/// pointing at the current source even if the source moved between runs.
///
/// Returns the absolute path of the staged description document, which the
/// caller hands to the simulation loader as the asset entry point.
pub fn stage(config: &StageConfig) -> Result<PathBuf, AssetError> {
    let description_src = config.source_dir.join(&config.description_rel_path);

    // Source validation comes first so a missing bundle leaves the scratch
    // directory untouched.
    fs::metadata(&config.source_dir).map_err(|e| AssetError::MissingAsset {
        path: config.source_dir.clone(),
        source: e,
    })?;
    fs::metadata(&description_src).map_err(|e| AssetError::MissingAsset {
        path: description_src.clone(),
        source: e,
    })?;

    fs::create_dir_all(&config.scratch_dir).map_err(|e| AssetError::Io {
        path: config.scratch_dir.clone(),
        source: e,
    })?;

    refresh_meshes_link(
        &config.source_dir.join("meshes"),
        &config.scratch_dir.join("meshes"),
    )?;

    let content = fs::read_to_string(&description_src).map_err(|e| AssetError::Io {
        path: description_src.clone(),
        source: e,
    })?;

    // Literal, case-sensitive substring replacement. The token is never
    // treated as a regex.
    let rewritten = content.replace(&config.package_token, "meshes/");

    let output = config.scratch_dir.join(&config.output_name);
    if output.exists() {
        fs::remove_file(&output).map_err(|e| AssetError::Io {
            path: output.clone(),
            source: e,
        })?;
    }
    fs::write(&output, rewritten).map_err(|e| AssetError::Io {
        path: output.clone(),
        source: e,
    })?;

    let staged = output.canonicalize().map_err(|e| AssetError::Io {
        path: output.clone(),
        source: e,
    })?;
    debug!(path = %staged.display(), "staged robot description");
    Ok(staged)
}

/// Replace whatever occupies the link path with a fresh symlink to `target`.
fn refresh_meshes_link(target: &Path, link: &Path) -> Result<(), AssetError> {
    // symlink_metadata does not follow links, so a dangling symlink is still
    // detected and removed.
    match fs::symlink_metadata(link) {
        Ok(meta) if meta.is_dir() => {
            fs::remove_dir_all(link).map_err(|e| AssetError::Io {
                path: link.to_path_buf(),
                source: e,
            })?;
        }
        Ok(_) => {
            fs::remove_file(link).map_err(|e| AssetError::Io {
                path: link.to_path_buf(),
                source: e,
            })?;
        }
        Err(_) => {}
    }
    make_symlink(target, link).map_err(|e| AssetError::Symlink {
        path: link.to_path_buf(),
        source: e,
    })
}

#[cfg(unix)]
fn make_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn make_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTION: &str = concat!(
        "<robot name=\"biped\">\n",
        "  <mesh filename=\"package://robot/meshes/leg.obj\"/>\n",
        "  <mesh filename=\"package://robot/meshes/foot.stl\"/>\n",
        "</robot>\n",
    );

    /// Create a source bundle under a unique temp root. Returns
    /// `(source_dir, scratch_dir)`; the scratch dir is not created.
    fn setup_bundle(tag: &str) -> (PathBuf, PathBuf) {
        let root = std::env::temp_dir().join(format!("strider_assets_{tag}"));
        let _ = fs::remove_dir_all(&root);
        let source = root.join("source");
        let scratch = root.join("scratch");
        fs::create_dir_all(source.join("meshes")).unwrap();
        fs::write(source.join("meshes").join("leg.obj"), b"obj data").unwrap();
        fs::write(source.join("robot.urdf"), DESCRIPTION).unwrap();
        (source, scratch)
    }

    fn teardown(source: &Path) {
        let _ = fs::remove_dir_all(source.parent().unwrap());
    }

    // -- Substitution --

    #[test]
    fn stage_rewrites_package_uris() {
        let (source, scratch) = setup_bundle("rewrite");
        fs::write(
            source.join("robot.urdf"),
            "<mesh filename=\"package://robot/meshes/leg.obj\"/>",
        )
        .unwrap();

        let staged = stage(&StageConfig::new(&source, &scratch)).unwrap();
        let content = fs::read_to_string(&staged).unwrap();
        assert_eq!(content, "<mesh filename=\"meshes/leg.obj\"/>");
        teardown(&source);
    }

    #[test]
    fn stage_removes_every_token_occurrence() {
        let (source, scratch) = setup_bundle("complete");
        let staged = stage(&StageConfig::new(&source, &scratch)).unwrap();
        let content = fs::read_to_string(&staged).unwrap();
        assert!(!content.contains("package://robot/meshes/"));
        assert_eq!(content.matches("meshes/").count(), 2);
        teardown(&source);
    }

    #[test]
    fn stage_preserves_non_token_text() {
        let (source, scratch) = setup_bundle("preserve");
        let text = concat!(
            "<robot name=\"biped\">\n",
            "  <!-- Package://Robot/Meshes/ is not the token -->\n",
            "  <mesh filename=\"package://robot/meshes/foot.stl\"/>\n",
            "</robot>\n",
        );
        fs::write(source.join("robot.urdf"), text).unwrap();

        let staged = stage(&StageConfig::new(&source, &scratch)).unwrap();
        let content = fs::read_to_string(&staged).unwrap();
        // Case-sensitive: the comment survives byte-for-byte.
        assert!(content.contains("Package://Robot/Meshes/ is not the token"));
        assert!(content.contains("<mesh filename=\"meshes/foot.stl\"/>"));
        assert!(content.starts_with("<robot name=\"biped\">\n"));
        teardown(&source);
    }

    #[test]
    fn stage_handles_non_ascii_content() {
        let (source, scratch) = setup_bundle("unicode");
        fs::write(
            source.join("robot.urdf"),
            "<mesh filename=\"package://装配体/meshes/腿部.obj\"/>",
        )
        .unwrap();

        let cfg =
            StageConfig::new(&source, &scratch).with_package_token("package://装配体/meshes/");
        let staged = stage(&cfg).unwrap();
        let content = fs::read_to_string(&staged).unwrap();
        assert_eq!(content, "<mesh filename=\"meshes/腿部.obj\"/>");
        teardown(&source);
    }

    // -- Idempotence --

    #[test]
    fn stage_is_idempotent() {
        let (source, scratch) = setup_bundle("idem");
        let cfg = StageConfig::new(&source, &scratch);

        let first = stage(&cfg).unwrap();
        let first_bytes = fs::read(&first).unwrap();
        let second = stage(&cfg).unwrap();

        assert_eq!(first, second);
        assert_eq!(first_bytes, fs::read(&second).unwrap());
        assert_eq!(
            fs::read_link(scratch.join("meshes")).unwrap(),
            source.join("meshes")
        );
        teardown(&source);
    }

    #[test]
    fn stage_overwrites_existing_output() {
        let (source, scratch) = setup_bundle("overwrite");
        fs::create_dir_all(&scratch).unwrap();
        fs::write(scratch.join("robot.urdf"), "stale content").unwrap();

        let staged = stage(&StageConfig::new(&source, &scratch)).unwrap();
        let content = fs::read_to_string(&staged).unwrap();
        assert!(!content.contains("stale content"));
        assert!(content.contains("meshes/leg.obj"));
        teardown(&source);
    }

    // -- Symlink handling --

    #[test]
    fn meshes_symlink_resolves_to_source() {
        let (source, scratch) = setup_bundle("symlink");
        stage(&StageConfig::new(&source, &scratch)).unwrap();

        assert_eq!(
            fs::read_link(scratch.join("meshes")).unwrap(),
            source.join("meshes")
        );
        // Mesh files are reachable through the link.
        assert!(scratch.join("meshes").join("leg.obj").exists());
        teardown(&source);
    }

    #[test]
    fn stage_refreshes_stale_symlink() {
        let (source, scratch) = setup_bundle("stale_link");
        let other = source.parent().unwrap().join("other_meshes");
        fs::create_dir_all(&other).unwrap();
        fs::create_dir_all(&scratch).unwrap();
        make_symlink(&other, &scratch.join("meshes")).unwrap();

        stage(&StageConfig::new(&source, &scratch)).unwrap();
        assert_eq!(
            fs::read_link(scratch.join("meshes")).unwrap(),
            source.join("meshes")
        );
        teardown(&source);
    }

    #[test]
    fn stage_replaces_real_directory_at_link_path() {
        let (source, scratch) = setup_bundle("real_dir");
        fs::create_dir_all(scratch.join("meshes")).unwrap();
        fs::write(scratch.join("meshes").join("stray.obj"), b"x").unwrap();

        stage(&StageConfig::new(&source, &scratch)).unwrap();
        let meta = fs::symlink_metadata(scratch.join("meshes")).unwrap();
        assert!(meta.file_type().is_symlink());
        teardown(&source);
    }

    #[test]
    fn stage_replaces_stray_file_at_link_path() {
        let (source, scratch) = setup_bundle("stray_file");
        fs::create_dir_all(&scratch).unwrap();
        fs::write(scratch.join("meshes"), b"not a directory").unwrap();

        stage(&StageConfig::new(&source, &scratch)).unwrap();
        let meta = fs::symlink_metadata(scratch.join("meshes")).unwrap();
        assert!(meta.file_type().is_symlink());
        teardown(&source);
    }

    // -- Output path --

    #[test]
    fn staged_path_is_absolute() {
        let (source, scratch) = setup_bundle("absolute");
        let staged = stage(&StageConfig::new(&source, &scratch)).unwrap();
        assert!(staged.is_absolute());
        assert!(staged.ends_with("robot.urdf"));
        teardown(&source);
    }

    #[test]
    fn stage_with_nested_description_path() {
        let (source, scratch) = setup_bundle("nested");
        fs::create_dir_all(source.join("urdf")).unwrap();
        fs::write(source.join("urdf").join("biped.urdf"), DESCRIPTION).unwrap();

        let cfg = StageConfig::new(&source, &scratch)
            .with_description("urdf/biped.urdf")
            .with_output_name("biped.urdf");
        let staged = stage(&cfg).unwrap();
        assert!(staged.ends_with("biped.urdf"));
        assert!(!fs::read_to_string(&staged)
            .unwrap()
            .contains("package://robot/meshes/"));
        teardown(&source);
    }

    // -- Error cases --

    #[test]
    fn stage_missing_source_dir_fails_without_partial_writes() {
        let root = std::env::temp_dir().join("strider_assets_missing_dir");
        let _ = fs::remove_dir_all(&root);
        let scratch = root.join("scratch");

        let err = stage(&StageConfig::new(root.join("source"), &scratch)).unwrap_err();
        assert!(matches!(err, AssetError::MissingAsset { .. }));
        assert!(!scratch.exists());
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn stage_missing_description_fails_without_partial_writes() {
        let (source, scratch) = setup_bundle("missing_doc");
        fs::remove_file(source.join("robot.urdf")).unwrap();

        let err = stage(&StageConfig::new(&source, &scratch)).unwrap_err();
        assert!(matches!(err, AssetError::MissingAsset { .. }));
        assert!(!scratch.exists());
        teardown(&source);
    }
}
