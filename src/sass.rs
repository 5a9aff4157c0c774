//! User stylesheet.
//!
//! Users can restyle the indicator with `$XDG_CONFIG_HOME/uupd-indicator/style.scss`, or
//! `style.css` if they don't want SCSS. It is applied on top of the bundled style.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

const STYLE_FILES: [&str; 2] = ["style.scss", "style.css"];

/// Find and load the user stylesheet, if any. Returns the final CSS string.
pub fn load_user_style() -> Option<String> {
    let dirs = match xdg::BaseDirectories::with_prefix("uupd-indicator") {
        Ok(dirs) => dirs,
        Err(err) => {
            warn!(?err, "Failed to get XDG base directories, no custom style");
            return None;
        }
    };

    let paths = STYLE_FILES.map(|name| dirs.get_config_file(name));
    load_first(&paths)
}

fn load_first(paths: &[PathBuf]) -> Option<String> {
    for path in paths {
        debug!(?path, "Trying to load custom style");
        if !path.exists() {
            continue;
        }

        match load_css_from_path(path) {
            Ok(css) => return Some(css),
            Err(err) => warn!(?err, ?path, "Failed to load custom style from path"),
        }
    }

    None
}

/// Load the stylesheet at `path`, compiling it if it's SCSS.
pub fn load_css_from_path(path: &Path) -> anyhow::Result<String> {
    let file_contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    if path.extension().and_then(OsStr::to_str) == Some("css") {
        info!(?path, "Loading CSS");
        return Ok(file_contents);
    }

    // Anything else is assumed to be SCSS, which is a superset of CSS anyway.
    info!(?path, "Loading SCSS");
    let mut options = grass::Options::default();
    if let Some(dir) = path.parent() {
        options = options.load_path(dir);
    }
    grass::from_string(file_contents, &options).context("Failed to parse SCSS")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A file in a directory of its own, removed on drop.
    struct ScratchFile {
        dir: PathBuf,
        path: PathBuf,
    }

    impl ScratchFile {
        fn new(test: &str, name: &str, contents: Option<&str>) -> Self {
            let dir = std::env::temp_dir().join(format!(
                "uupd-indicator-{test}-{}",
                std::process::id()
            ));
            fs::create_dir_all(&dir).unwrap();
            let path = dir.join(name);
            if let Some(contents) = contents {
                fs::write(&path, contents).unwrap();
            }
            Self { dir, path }
        }
    }

    impl Drop for ScratchFile {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.dir);
        }
    }

    #[test]
    fn plain_css_is_kept_as_is() {
        let css = ".update-indicator { opacity: 0.5; }\n";
        let file = ScratchFile::new("plain", "style.css", Some(css));
        assert_eq!(load_css_from_path(&file.path).unwrap(), css);
    }

    #[test]
    fn scss_gets_compiled() {
        let scss = "$pad: 4px;\n.update-indicator { button { padding: $pad; } }\n";
        let file = ScratchFile::new("scss", "style.scss", Some(scss));
        let css = load_css_from_path(&file.path).unwrap();
        assert!(css.contains(".update-indicator button"), "{css}");
        assert!(css.contains("padding: 4px"), "{css}");
    }

    #[test]
    fn invalid_scss_is_an_error() {
        let file = ScratchFile::new("invalid", "style.scss", Some(".oops { color: ; "));
        assert!(load_css_from_path(&file.path).is_err());
    }

    #[test]
    fn first_loadable_file_wins() {
        let broken = ScratchFile::new("first-broken", "style.scss", Some(".oops {"));
        let missing = ScratchFile::new("first-missing", "style.scss", None);
        let css = ScratchFile::new("first-css", "style.css", Some("window {}\n"));

        let paths = [missing.path.clone(), broken.path.clone(), css.path.clone()];
        assert_eq!(load_first(&paths).as_deref(), Some("window {}\n"));
        assert_eq!(load_first(&paths[..2]), None);
    }
}
