//! Rendering and reading the centralized manifest (`Directory.Packages.props`).

use std::path::Path;

use cpv_util::errors::CpvError;

use crate::aggregate::{Aggregate, DependencyDeclaration};
use crate::config::Dialect;
use crate::document::ParsedDocument;
use crate::transform::RejectedReference;

/// Render the manifest: one entry line per package, sorted by name.
///
/// ```text
/// <Project>
///   <ItemGroup>
///     <PackageVersion Include="Serilog" Version="3.1.1" />
///   </ItemGroup>
/// </Project>
/// ```
pub fn render_manifest(aggregate: &Aggregate, dialect: &Dialect) -> String {
    let mut out = String::new();
    out.push_str(&format!("<{}>\n", dialect.root_tag));
    out.push_str(&format!("  <{}>\n", dialect.group_tag));
    for (_, entry) in aggregate.iter() {
        out.push_str("    ");
        out.push_str(&entry.element_text);
        out.push('\n');
    }
    out.push_str(&format!("  </{}>\n", dialect.group_tag));
    out.push_str(&format!("</{}>\n", dialect.root_tag));
    out
}

/// Write rendered manifest text to `path`, replacing any existing file.
pub fn write_manifest(path: &Path, content: &str) -> Result<(), CpvError> {
    std::fs::write(path, content).map_err(|source| CpvError::ManifestWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Centralized entries found in an existing manifest.
#[derive(Debug, Default)]
pub struct ExistingManifest {
    pub declarations: Vec<DependencyDeclaration>,
    /// Entries whose version does not parse; they are not carried over.
    pub rejected: Vec<RejectedReference>,
}

/// Read the version entries of an existing manifest, in document order.
///
/// Entries missing the name or version attribute are ignored.
pub fn read_manifest(
    path: &Path,
    xml: &str,
    dialect: &Dialect,
) -> Result<Vec<DependencyDeclaration>, CpvError> {
    let body = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let doc = ParsedDocument::parse(path, body, &dialect.group_tag, &dialect.version_tag)?;

    let mut declarations = Vec::new();
    for &span in doc.elements() {
        let name = doc.attribute(span, &dialect.name_attribute)?;
        let version = doc.attribute(span, &dialect.version_attribute)?;
        if let (Some(name), Some(version)) = (name, version) {
            declarations.push(DependencyDeclaration {
                name,
                version,
                rewritten_element: doc.render_element(span, &dialect.version_tag)?,
            });
        }
    }
    Ok(declarations)
}

/// Upsert the entries of an existing manifest into `aggregate`.
///
/// Runs before any descriptor so that existing pins win ties and a rerun
/// over already centralized projects regenerates the same manifest.
pub fn seed_from_manifest(
    path: &Path,
    xml: &str,
    dialect: &Dialect,
    aggregate: &mut Aggregate,
) -> Result<ExistingManifest, CpvError> {
    let declarations = read_manifest(path, xml, dialect)?;
    let mut existing = ExistingManifest::default();
    for declaration in declarations {
        match aggregate.upsert(declaration.clone()) {
            Ok(_) => existing.declarations.push(declaration),
            Err(e) => {
                tracing::debug!("{}: rejected {}: {e}", path.display(), declaration.name);
                existing.rejected.push(RejectedReference {
                    name: declaration.name,
                    version: declaration.version,
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok(existing)
}
