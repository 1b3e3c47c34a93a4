//! Workspace Manager: owns the logical project (compilation context plus
//! open-document set) and serialises mutations behind a single writer while
//! letting analyses read an immutable snapshot.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::reference::{ReferenceAssembly, ReferenceResolver};
use crate::settings::Settings;

use super::document::Document;

/// Parse/compilation options fixed for the whole workspace: latest language
/// level of the UdonSharp C# subset, no `unsafe`, deterministic builds off,
/// overflow checks on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationOptions {
    pub language_level: &'static str,
    pub allow_unsafe: bool,
    pub deterministic: bool,
    pub overflow_checks: bool,
}

impl Default for CompilationOptions {
    fn default() -> Self {
        Self {
            language_level: "latest",
            allow_unsafe: false,
            deterministic: false,
            overflow_checks: true,
        }
    }
}

/// The logical project: the reference set and compilation options.
/// Document-set changes never invalidate this; reference-set changes
/// (a settings change that flips `unityApiSurface` or `customStubPath`)
/// rebuild it and therefore invalidate every cache keyed off it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationContext {
    pub references: Vec<ReferenceAssembly>,
    pub options: CompilationOptions,
}

impl CompilationContext {
    pub fn build(settings: &Settings, base_dir: &Path) -> Self {
        Self {
            references: ReferenceResolver::resolve(settings, base_dir),
            options: CompilationOptions::default(),
        }
    }
}

/// An immutable pairing of a document and the compilation context it was
/// read under, captured atomically at the start of an analysis.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub document: Arc<Document>,
    pub compilation: Arc<CompilationContext>,
}

struct WorkspaceState {
    documents: HashMap<String, Arc<Document>>,
    compilation: Arc<CompilationContext>,
}

pub struct WorkspaceManager {
    base_dir: PathBuf,
    state: RwLock<WorkspaceState>,
}

impl WorkspaceManager {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let compilation = CompilationContext::build(&Settings::default(), &base_dir);
        Self {
            base_dir,
            state: RwLock::new(WorkspaceState {
                documents: HashMap::new(),
                compilation: Arc::new(compilation),
            }),
        }
    }

    /// Rebuild the project with fresh references for `settings`, preserving
    /// the text of already-open documents by re-adding them under the new
    /// compilation context.
    pub fn initialise(&self, settings: &Settings) {
        let compilation = Arc::new(CompilationContext::build(settings, &self.base_dir));
        let mut state = self.state.write().expect("workspace lock poisoned");
        let reopened: HashMap<String, Arc<Document>> = state
            .documents
            .iter()
            .map(|(uri, doc)| (uri.clone(), Arc::new(Document::new(uri.clone(), doc.text.clone()))))
            .collect();
        state.documents = reopened;
        state.compilation = compilation;
    }

    /// Insert or replace a document's text, identity-preserving.
    pub fn open_or_update(&self, uri: impl Into<String>, text: impl Into<Arc<str>>) -> Arc<Document> {
        let uri = uri.into();
        let document = Arc::new(Document::new(uri.clone(), text.into()));
        let mut state = self.state.write().expect("workspace lock poisoned");
        state.documents.insert(uri, document.clone());
        document
    }

    pub fn remove(&self, uri: &str) {
        let mut state = self.state.write().expect("workspace lock poisoned");
        state.documents.remove(uri);
    }

    pub fn get(&self, uri: &str) -> Option<Arc<Document>> {
        let state = self.state.read().expect("workspace lock poisoned");
        state.documents.get(uri).cloned()
    }

    /// Immutable snapshot of a document paired with the current compilation
    /// context, for the rule engine to analyse against. `None` if the
    /// document is not open.
    pub fn snapshot(&self, uri: &str) -> Option<DocumentSnapshot> {
        let state = self.state.read().expect("workspace lock poisoned");
        let document = state.documents.get(uri)?.clone();
        let compilation = state.compilation.clone();
        Some(DocumentSnapshot { document, compilation })
    }

    pub fn open_uris(&self) -> Vec<String> {
        let state = self.state.read().expect("workspace lock poisoned");
        state.documents.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_on_unopened_document_is_none() {
        let ws = WorkspaceManager::new("/base");
        assert!(ws.get("file:///Nope.cs").is_none());
        assert!(ws.snapshot("file:///Nope.cs").is_none());
    }

    #[test]
    fn open_then_get_round_trips_text() {
        let ws = WorkspaceManager::new("/base");
        ws.open_or_update("file:///A.cs", "public class A {}\n");
        let doc = ws.get("file:///A.cs").expect("document");
        assert_eq!(doc.text.as_ref(), "public class A {}\n");
    }

    #[test]
    fn remove_drops_document() {
        let ws = WorkspaceManager::new("/base");
        ws.open_or_update("file:///A.cs", "public class A {}\n");
        ws.remove("file:///A.cs");
        assert!(ws.get("file:///A.cs").is_none());
    }

    #[test]
    fn initialise_preserves_open_document_text() {
        let ws = WorkspaceManager::new("/base");
        ws.open_or_update("file:///A.cs", "public class A {}\n");
        ws.initialise(&Settings::default());
        let doc = ws.get("file:///A.cs").expect("document survives rebuild");
        assert_eq!(doc.text.as_ref(), "public class A {}\n");
    }

    #[test]
    fn initialise_rebuilds_compilation_context_identity() {
        let ws = WorkspaceManager::new("/base");
        ws.open_or_update("file:///A.cs", "public class A {}\n");
        let before = ws.snapshot("file:///A.cs").unwrap().compilation;
        ws.initialise(&Settings::default());
        let after = ws.snapshot("file:///A.cs").unwrap().compilation;
        assert!(!Arc::ptr_eq(&before, &after));
    }
}
