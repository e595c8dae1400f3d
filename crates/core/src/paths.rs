//! Lexical path helpers for rebasing rewritten module references.

use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path: drop `.` segments and fold `..` into the
/// preceding component where one exists. No filesystem access.
pub fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                // `/..` stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            _ => parts.push(component),
        }
    }

    parts.iter().map(|c| c.as_os_str()).collect()
}

/// Re-express `path` relative to the directory `base`. Both are expected to
/// be absolute and lexically normalized.
pub fn relative_from(path: &Path, base: &Path) -> PathBuf {
    let path_components: Vec<Component> = path.components().collect();
    let base_components: Vec<Component> = base.components().collect();

    let mut shared = 0;
    while shared < path_components.len()
        && shared < base_components.len()
        && path_components[shared] == base_components[shared]
    {
        shared += 1;
    }

    let mut result = PathBuf::new();
    for _ in shared..base_components.len() {
        result.push("..");
    }
    for component in &path_components[shared..] {
        result.push(component.as_os_str());
    }
    result
}

/// Render a filesystem path as a module-reference string (forward slashes).
pub fn module_string(path: &Path) -> String {
    let rendered = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        rendered.into_owned()
    } else {
        rendered.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

/// Render a relative path as a module-reference string with the explicit
/// `./` prefix module syntax requires to avoid package-lookup semantics.
pub fn relative_module_string(path: &Path) -> String {
    let rendered = module_string(path);
    if rendered.is_empty() {
        ".".to_string()
    } else if rendered.starts_with("./") || rendered.starts_with("../") || rendered == ".." {
        rendered
    } else {
        format!("./{}", rendered)
    }
}
