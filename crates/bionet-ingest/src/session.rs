//! Two-pass import sessions.

use crate::resolver::IdentityResolver;
use bionet_core::digest::SourceDigest;
use bionet_core::{
    CompletenessAuditor, ElementId, EngineConfig, EngineError, EngineResult, EntityKind,
    NamespaceKind, NaturalKey, ProvenanceEvent, SessionError, SessionOperation, SessionReport,
};
use bionet_store::ElementStore;
use chrono::Utc;
use std::collections::BTreeMap;
use std::path::Path;

/// Raw bytes of one source file plus the name errors should mention.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            name,
            bytes: std::fs::read(path)?,
        })
    }
}

/// One external format.
///
/// `read` turns bytes into the format's closed set of element kinds; the
/// driver then calls `materialize` on every element, then `wire` on every
/// element, in reader order both times.
pub trait FormatImporter {
    type Element;

    /// Short format name recorded in provenance (`xbel`, `biopax`, ...).
    fn format_name(&self) -> &'static str;

    fn read(&mut self, bytes: &[u8]) -> EngineResult<Vec<Self::Element>>;

    /// Runs before pass 1 (document-level namespaces, headers).
    fn begin<S: ElementStore>(&mut self, _cx: &mut ImportContext<S>) -> EngineResult<()> {
        Ok(())
    }

    fn materialize<S: ElementStore>(
        &mut self,
        element: &Self::Element,
        index: usize,
        cx: &mut ImportContext<S>,
    ) -> EngineResult<()>;

    fn wire<S: ElementStore>(
        &mut self,
        element: &Self::Element,
        index: usize,
        cx: &mut ImportContext<S>,
    ) -> EngineResult<()>;
}

/// Session state handed to importers: the resolver, the store transaction and
/// the auditor. One per import; never shared between sessions.
pub struct ImportContext<S: ElementStore> {
    resolver: IdentityResolver,
    store: S,
    auditor: CompletenessAuditor,
    config: EngineConfig,
}

impl<S: ElementStore> ImportContext<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self {
            resolver: IdentityResolver::new(),
            store,
            auditor: CompletenessAuditor::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn resolver(&mut self) -> &mut IdentityResolver {
        &mut self.resolver
    }

    pub fn store(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn resolve(&mut self, key: NaturalKey) -> EngineResult<ElementId> {
        self.resolver.resolve(key)
    }

    /// A placeholder created in pass 1 that pass 2 still has to wire.
    pub fn placeholder(&mut self, kind: EntityKind, id: ElementId) {
        self.auditor.register(kind, id);
    }

    /// An entity complete at creation (leaves, edges).
    pub fn created(&mut self, kind: EntityKind, id: ElementId) {
        self.auditor.register(kind, id);
        self.auditor.mark_processed(kind, id);
    }

    /// A placeholder finished by pass 2.
    pub fn wired(&mut self, kind: EntityKind, id: ElementId) {
        self.auditor.mark_processed(kind, id);
    }

    pub fn is_processed(&self, id: ElementId) -> bool {
        self.auditor.is_processed(id)
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "import integrity warning");
        self.auditor.warn(message);
    }

    // ========================================================================
    // Shared find-or-create helpers
    // ========================================================================

    /// Find or create the namespace with `prefix`.
    pub fn namespace(&mut self, prefix: &str, uri: Option<&str>) -> EngineResult<ElementId> {
        self.namespace_of_kind(prefix, uri, NamespaceKind::Term)
    }

    pub fn namespace_of_kind(
        &mut self,
        prefix: &str,
        uri: Option<&str>,
        kind: NamespaceKind,
    ) -> EngineResult<ElementId> {
        let id = self.resolver.resolve(NaturalKey::namespace(prefix))?;
        let ns = self.store.find_or_create_namespace(id, prefix)?;
        if ns.uri.is_none() {
            ns.uri = uri.map(str::to_string);
        }
        if kind != NamespaceKind::Term {
            ns.kind = kind;
        }
        Ok(id)
    }

    /// Find or create the base term `prefix:name` (no namespace when `prefix`
    /// is `None`).
    pub fn base_term(&mut self, prefix: Option<&str>, name: &str) -> EngineResult<ElementId> {
        let namespace = match prefix {
            Some(prefix) => Some(self.namespace(prefix, None)?),
            None => None,
        };
        let id = self.resolver.resolve(NaturalKey::base_term(prefix, name))?;
        let term = self.store.find_or_create_base_term(id)?;
        if term.name.is_empty() {
            term.name = name.to_string();
            term.namespace = namespace;
            self.created(EntityKind::BaseTerm, id);
        }
        Ok(id)
    }

    /// Base term in the configured default namespace (functions, XBEL predicates).
    pub fn default_namespace_term(&mut self, name: &str) -> EngineResult<ElementId> {
        let prefix = self.config.default_namespace.clone();
        self.base_term(Some(&prefix), name)
    }

    /// Predicate term keyed `PREDICATE`+name, outside any namespace.
    pub fn predicate(&mut self, name: &str) -> EngineResult<ElementId> {
        let id = self.resolver.resolve(NaturalKey::predicate(name))?;
        let term = self.store.find_or_create_base_term(id)?;
        if term.name.is_empty() {
            term.name = name.to_string();
            self.created(EntityKind::BaseTerm, id);
        }
        Ok(id)
    }
}

// ============================================================================
// Driver
// ============================================================================

fn run_passes<I: FormatImporter, S: ElementStore>(
    importer: &mut I,
    source: &SourceDocument,
    cx: &mut ImportContext<S>,
) -> EngineResult<()> {
    let elements = importer.read(&source.bytes)?;
    tracing::debug!(source = %source.name, elements = elements.len(), "read source elements");

    importer.begin(cx)?;
    for (index, element) in elements.iter().enumerate() {
        importer.materialize(element, index, cx)?;
    }
    tracing::debug!(source = %source.name, bindings = cx.resolver.len(), "pass 1 complete");

    for (index, element) in elements.iter().enumerate() {
        importer.wire(element, index, cx)?;
    }
    tracing::debug!(source = %source.name, "pass 2 complete");
    Ok(())
}

/// Import `source` into `store` with `importer`.
///
/// Success commits the network; any error aborts the transaction so nothing
/// partial is published, and the report carries one error naming the source.
pub fn run_import<I: FormatImporter, S: ElementStore>(
    importer: &mut I,
    source: &SourceDocument,
    store: S,
    config: &EngineConfig,
) -> SessionReport {
    let started_at = Utc::now();
    tracing::info!(source = %source.name, format = importer.format_name(), "import session started");

    let mut cx = ImportContext::new(store, config.clone());
    let outcome = run_passes(importer, source, &mut cx);

    let ImportContext {
        mut store,
        auditor,
        ..
    } = cx;
    let counts = store.network().counts();

    if let Err(cause) = outcome {
        tracing::warn!(source = %source.name, error = %cause, "import failed; rolling back");
        store.abort();
        return SessionReport::failed(import_error(source, cause), counts, auditor.report());
    }

    let summary = store.summary_mut();
    if summary.name.is_none() {
        summary.name = Some(source.name.clone());
    }
    let mut properties = BTreeMap::new();
    properties.insert("filename".to_string(), source.name.clone());
    properties.insert("format".to_string(), importer.format_name().to_string());
    properties.insert(
        "digest".to_string(),
        SourceDigest::of_source(importer.format_name(), &source.bytes).to_string(),
    );
    properties.insert("owner".to_string(), config.owner.clone());
    summary.provenance.push(ProvenanceEvent {
        event_type: "FILE_UPLOAD".to_string(),
        started_at,
        ended_at: Utc::now(),
        properties,
    });

    let audit = auditor.report();
    if !audit.unprocessed.is_empty() {
        tracing::warn!(
            source = %source.name,
            unprocessed = audit.unprocessed.len(),
            "import left materialized entities unwired"
        );
    }

    match store.commit() {
        Ok(network_id) => {
            tracing::info!(source = %source.name, network = %network_id, "import session committed");
            SessionReport::success(Some(network_id), counts, audit)
        }
        Err(cause) => SessionReport::failed(import_error(source, cause), counts, audit),
    }
}

/// Read `path` and import it; an unreadable file is a failed session too.
pub fn import_path<I: FormatImporter, S: ElementStore>(
    importer: &mut I,
    path: &Path,
    store: S,
    config: &EngineConfig,
) -> SessionReport {
    match SourceDocument::from_path(path) {
        Ok(source) => run_import(importer, &source, store, config),
        Err(err) => {
            store.abort();
            SessionReport::failed(
                SessionError {
                    operation: SessionOperation::Import,
                    source_name: path.display().to_string(),
                    cause: EngineError::Io(err),
                },
                Default::default(),
                Default::default(),
            )
        }
    }
}

fn import_error(source: &SourceDocument, cause: EngineError) -> SessionError {
    SessionError {
        operation: SessionOperation::Import,
        source_name: source.name.clone(),
        cause,
    }
}
