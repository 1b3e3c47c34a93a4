//! Reference Resolver: produces the set of metadata references a
//! compilation is built against, driven by `Settings::unity_api_surface`.

use std::path::{Path, PathBuf};

use crate::settings::{Settings, UnityApiSurface};

/// A single resolved reference (conceptually a metadata/assembly
/// reference). The core only tracks the path; the compiler front-end this
/// workspace assumes as a collaborator is responsible for loading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceAssembly {
    pub path: PathBuf,
}

/// Well-known runtime assemblies always present in the compilation,
/// regardless of `unityApiSurface`.
const BASE_RUNTIME_ASSEMBLIES: &[&str] = &[
    "VRCSDKBase.dll",
    "VRCSDK3.dll",
    "UdonSharp.dll",
    "UdonSharp.Runtime.dll",
];

pub struct ReferenceResolver;

impl ReferenceResolver {
    /// Resolve the reference set for `settings`, rooted at `base_dir` for
    /// the bundled stub directory.
    pub fn resolve(settings: &Settings, base_dir: &Path) -> Vec<ReferenceAssembly> {
        let mut refs: Vec<ReferenceAssembly> = BASE_RUNTIME_ASSEMBLIES
            .iter()
            .map(|name| ReferenceAssembly {
                path: PathBuf::from(name),
            })
            .collect();

        match settings.unity_api_surface {
            UnityApiSurface::BundledStubs => {
                let stubs_dir = base_dir.join("Stubs").join("Generated");
                refs.extend(Self::dlls_under(&stubs_dir));
            }
            UnityApiSurface::CustomStubs => {
                if let Some(custom) = &settings.custom_stub_path {
                    refs.extend(Self::dlls_under(custom));
                } else {
                    tracing::warn!("unityApiSurface is custom-stubs but no customStubPath was set");
                }
            }
            UnityApiSurface::None => {}
        }

        refs
    }

    fn dlls_under(dir: &Path) -> Vec<ReferenceAssembly> {
        if !dir.exists() {
            tracing::warn!("reference stub directory does not exist: {}", dir.display());
            return Vec::new();
        }
        let mut found: Vec<ReferenceAssembly> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!("error walking reference directory '{}': {}", dir.display(), err);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("dll"))
            .map(|path| ReferenceAssembly { path })
            .collect();
        found.sort_by(|a, b| a.path.cmp(&b.path));
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::RawSettings;

    #[test]
    fn none_surface_yields_only_base_assemblies() {
        let raw = RawSettings {
            unity_api_surface: Some("none".to_string()),
            ..Default::default()
        };
        let settings = Settings::resolve(&raw, Path::new("/base"));
        let refs = ReferenceResolver::resolve(&settings, Path::new("/base"));
        assert_eq!(refs.len(), BASE_RUNTIME_ASSEMBLIES.len());
    }

    #[test]
    fn custom_stubs_without_path_warns_and_yields_base_only() {
        let raw = RawSettings {
            unity_api_surface: Some("custom-stubs".to_string()),
            ..Default::default()
        };
        let settings = Settings::resolve(&raw, Path::new("/base"));
        let refs = ReferenceResolver::resolve(&settings, Path::new("/base"));
        assert_eq!(refs.len(), BASE_RUNTIME_ASSEMBLIES.len());
    }

    #[test]
    fn custom_stubs_picks_up_dlls_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("VRC.Udon.dll"), b"").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"").unwrap();

        let raw = RawSettings {
            unity_api_surface: Some("custom-stubs".to_string()),
            custom_stub_path: Some(dir.path().to_string_lossy().to_string()),
            ..Default::default()
        };
        let settings = Settings::resolve(&raw, Path::new("/base"));
        let refs = ReferenceResolver::resolve(&settings, Path::new("/base"));
        assert_eq!(refs.len(), BASE_RUNTIME_ASSEMBLIES.len() + 1);
    }
}
