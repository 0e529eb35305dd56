// Output path resolution
//
// Pure functions: no filesystem access, same inputs give the same path.

use super::metadata::SourceFileRequest;
use std::path::{Component, Path, PathBuf};

/// True for names rooted at `/` or `\`, or carrying a drive-letter root like `C:\`
pub fn is_absolute_output_name(name: &str) -> bool {
    name.starts_with(['/', '\\']) || name.contains(":\\") || name.contains(":/")
}

/// Where the artifact for `request` goes under `output_base`
pub fn resolve(request: &SourceFileRequest, output_base: &Path) -> PathBuf {
    match request.explicit_output_name.as_deref() {
        Some(name) if is_absolute_output_name(name) => PathBuf::from(name),
        Some(name) => output_base.join(name),
        None => output_base.join(default_name(&request.source_path, &request.profile)),
    }
}

/// `<source dir>/<source stem>.<profile>`, with any root or drive dropped
/// from the source dir so the result stays relative
fn default_name(source_path: &str, profile: &str) -> PathBuf {
    let source = Path::new(source_path);
    let mut name: PathBuf = source
        .parent()
        .map(|dir| {
            dir.components()
                .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
                .collect()
        })
        .unwrap_or_default();

    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push(format!("{}.{}", stem, profile));
    name
}
