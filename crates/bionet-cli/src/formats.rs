//! Source format detection and dispatch.

use bionet_core::{EngineConfig, SessionReport};
use bionet_ingest::SourceDocument;
use bionet_store::StoreTransaction;
use clap::ValueEnum;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceFormat {
    Xbel,
    Biopax,
    Sif,
    Xgmml,
}

impl SourceFormat {
    /// Guess from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xbel" => Some(SourceFormat::Xbel),
            "owl" | "rdf" => Some(SourceFormat::Biopax),
            "sif" => Some(SourceFormat::Sif),
            "xgmml" => Some(SourceFormat::Xgmml),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceFormat::Xbel => "xbel",
            SourceFormat::Biopax => "biopax",
            SourceFormat::Sif => "sif",
            SourceFormat::Xgmml => "xgmml",
        }
    }

    pub fn import(
        self,
        source: &SourceDocument,
        store: StoreTransaction,
        config: &EngineConfig,
    ) -> SessionReport {
        match self {
            SourceFormat::Xbel => bionet_ingest_xbel::import_xbel(source, store, config),
            SourceFormat::Biopax => bionet_ingest_biopax::import_biopax(source, store, config),
            SourceFormat::Sif => bionet_ingest_sif::import_sif(source, store, config),
            SourceFormat::Xgmml => bionet_ingest_xgmml::import_xgmml(source, store, config),
        }
    }
}

/// Expand files and directories into `(path, format)` pairs.
///
/// Directory entries with an unknown extension are skipped; an explicit file
/// with an unknown extension needs `forced`.
pub fn collect_sources(
    inputs: &[PathBuf],
    forced: Option<SourceFormat>,
) -> anyhow::Result<Vec<(PathBuf, SourceFormat)>> {
    let mut out = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in walkdir::WalkDir::new(input).follow_links(false).sort_by_file_name() {
                let entry = entry?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.into_path();
                if let Some(format) = forced.or_else(|| SourceFormat::from_path(&path)) {
                    out.push((path, format));
                }
            }
        } else {
            let format = forced
                .or_else(|| SourceFormat::from_path(input))
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "cannot detect the format of {}; pass --format",
                        input.display()
                    )
                })?;
            out.push((input.clone(), format));
        }
    }
    Ok(out)
}
