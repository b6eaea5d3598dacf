//! Strip per-project versions from a descriptor while feeding the aggregate.

use std::collections::HashMap;
use std::path::Path;

use quick_xml::events::BytesStart;

use cpv_util::errors::CpvError;

use crate::aggregate::{Aggregate, DependencyDeclaration, UpsertOutcome};
use crate::config::Dialect;
use crate::document::{ElementSpan, ParsedDocument};

const UTF8_BOM: char = '\u{feff}';

/// A reference whose version went into the aggregate and was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralizedReference {
    pub name: String,
    pub version: String,
    pub outcome: UpsertOutcome,
}

/// A reference left as-is because its version does not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedReference {
    pub name: String,
    pub version: String,
    pub reason: String,
}

/// Result of transforming one document.
#[derive(Debug, Clone)]
pub struct Transformed {
    /// The regenerated document text.
    pub content: String,
    /// Whether `content` differs from the input.
    pub changed: bool,
    pub centralized: Vec<CentralizedReference>,
    pub rejected: Vec<RejectedReference>,
    /// References missing the name or version attribute.
    pub skipped: usize,
}

/// A reference with both attributes present, ready for aggregation.
struct Candidate {
    span: ElementSpan,
    declaration: DependencyDeclaration,
    stripped: BytesStart<'static>,
}

/// Transform one descriptor.
///
/// Every reference element (per `dialect`) with both a name and a version
/// is upserted into `aggregate`; when the version parses, the version
/// attribute is removed from the output. References missing either
/// attribute are left alone, as are references whose version is rejected.
///
/// Malformed markup fails before `aggregate` is touched.
pub fn transform_document(
    path: &Path,
    xml: &str,
    dialect: &Dialect,
    aggregate: &mut Aggregate,
) -> Result<Transformed, CpvError> {
    let (bom, body) = match xml.strip_prefix(UTF8_BOM) {
        Some(rest) => (true, rest),
        None => (false, xml),
    };

    let doc = ParsedDocument::parse(path, body, &dialect.group_tag, &dialect.reference_tag)?;

    // Everything that can fail on bad markup happens before the aggregate
    // sees any declaration from this document.
    let mut candidates = Vec::new();
    let mut skipped = 0;
    for &span in doc.elements() {
        let name = doc.attribute(span, &dialect.name_attribute)?;
        let version = doc.attribute(span, &dialect.version_attribute)?;
        let (Some(name), Some(version)) = (name, version) else {
            tracing::debug!(
                "{}: skipping <{}> without {} and {}",
                path.display(),
                dialect.reference_tag,
                dialect.name_attribute,
                dialect.version_attribute
            );
            skipped += 1;
            continue;
        };
        candidates.push(Candidate {
            span,
            declaration: DependencyDeclaration {
                name,
                version,
                rewritten_element: doc.render_element(span, &dialect.version_tag)?,
            },
            stripped: doc.start_without(span, &dialect.version_attribute)?,
        });
    }

    let mut replacements: HashMap<usize, BytesStart<'static>> = HashMap::new();
    let mut centralized = Vec::new();
    let mut rejected = Vec::new();
    for candidate in candidates {
        let name = candidate.declaration.name.clone();
        let version = candidate.declaration.version.clone();
        match aggregate.upsert(candidate.declaration) {
            Ok(outcome) => {
                tracing::debug!("{}: {name} {version} ({outcome:?})", path.display());
                replacements.insert(candidate.span.start, candidate.stripped);
                centralized.push(CentralizedReference {
                    name,
                    version,
                    outcome,
                });
            }
            Err(e) => {
                tracing::debug!("{}: rejected {name}: {e}", path.display());
                rejected.push(RejectedReference {
                    name,
                    version,
                    reason: e.to_string(),
                });
            }
        }
    }

    let changed = !replacements.is_empty();
    let mut content = String::with_capacity(xml.len());
    if bom {
        content.push(UTF8_BOM);
    }
    if changed {
        content.push_str(&doc.serialize_with(|index| replacements.remove(&index))?);
    } else {
        content.push_str(body);
    }

    Ok(Transformed {
        content,
        changed,
        centralized,
        rejected,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(xml: &str, aggregate: &mut Aggregate) -> Transformed {
        transform_document(Path::new("App.csproj"), xml, &Dialect::default(), aggregate).unwrap()
    }

    #[test]
    fn strips_versions_and_records_declarations() {
        let xml = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
  <ItemGroup>
    <PackageReference Include="Serilog" Version="3.1.1" />
    <PackageReference Include="Polly" Version="8.2.0" PrivateAssets="all" />
  </ItemGroup>
</Project>"#;
        let mut agg = Aggregate::new();
        let out = run(xml, &mut agg);

        assert!(out.changed);
        assert_eq!(
            out.content,
            r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
  <ItemGroup>
    <PackageReference Include="Serilog" />
    <PackageReference Include="Polly" PrivateAssets="all" />
  </ItemGroup>
</Project>"#
        );
        assert_eq!(out.centralized.len(), 2);
        assert_eq!(
            agg.get("Polly").unwrap().element_text,
            r#"<PackageVersion Include="Polly" Version="8.2.0" PrivateAssets="all" />"#
        );
    }

    #[test]
    fn missing_attributes_are_skipped_silently() {
        let xml = concat!(
            r#"<Project><ItemGroup>"#,
            r#"<PackageReference Include="NoVersion" />"#,
            r#"<PackageReference Version="1.0.0" />"#,
            r#"</ItemGroup></Project>"#,
        );
        let mut agg = Aggregate::new();
        let out = run(xml, &mut agg);
        assert!(!out.changed);
        assert_eq!(out.content, xml);
        assert_eq!(out.skipped, 2);
        assert!(agg.is_empty());
    }

    #[test]
    fn invalid_version_is_rejected_and_kept() {
        let xml = concat!(
            r#"<Project><ItemGroup>"#,
            r#"<PackageReference Include="Bad" Version="abc" />"#,
            r#"<PackageReference Include="Good" Version="1.0.0" />"#,
            r#"</ItemGroup></Project>"#,
        );
        let mut agg = Aggregate::new();
        let out = run(xml, &mut agg);
        assert_eq!(out.rejected.len(), 1);
        assert_eq!(out.rejected[0].name, "Bad");
        assert_eq!(out.rejected[0].version, "abc");
        assert!(out.rejected[0].reason.contains("Invalid version"));
        assert!(out.content.contains(r#"<PackageReference Include="Bad" Version="abc" />"#));
        assert!(out.content.contains(r#"<PackageReference Include="Good" />"#));
        assert!(agg.get("Bad").is_none());
        assert!(agg.get("Good").is_some());
    }

    #[test]
    fn references_outside_groups_untouched() {
        let xml = concat!(
            r#"<Project><PackageReference Include="Stray" Version="1.0" />"#,
            r#"<ItemGroup><Other Include="X" Version="2.0" /></ItemGroup></Project>"#,
        );
        let mut agg = Aggregate::new();
        let out = run(xml, &mut agg);
        assert!(!out.changed);
        assert!(agg.is_empty());
    }

    #[test]
    fn element_with_children_keeps_children() {
        let xml = r#"<Project>
  <ItemGroup>
    <PackageReference Include="xunit.runner" Version="2.5.0">
      <PrivateAssets>all</PrivateAssets>
    </PackageReference>
  </ItemGroup>
</Project>
"#;
        let mut agg = Aggregate::new();
        let out = run(xml, &mut agg);
        assert_eq!(
            out.content,
            r#"<Project>
  <ItemGroup>
    <PackageReference Include="xunit.runner">
      <PrivateAssets>all</PrivateAssets>
    </PackageReference>
  </ItemGroup>
</Project>
"#
        );
        assert_eq!(
            agg.get("xunit.runner").unwrap().element_text,
            concat!(
                r#"<PackageVersion Include="xunit.runner" Version="2.5.0">"#,
                "<PrivateAssets>all</PrivateAssets></PackageVersion>",
            )
        );
    }

    #[test]
    fn byte_order_mark_preserved() {
        let xml = concat!(
            "\u{feff}<Project><ItemGroup>",
            "<PackageReference Include=\"A\" Version=\"1.0\"/>",
            "</ItemGroup></Project>",
        );
        let mut agg = Aggregate::new();
        let out = run(xml, &mut agg);
        assert_eq!(
            out.content,
            concat!(
                "\u{feff}<Project><ItemGroup>",
                "<PackageReference Include=\"A\"/>",
                "</ItemGroup></Project>",
            )
        );
    }

    #[test]
    fn malformed_markup_leaves_aggregate_untouched() {
        let xml = concat!(
            r#"<Project><ItemGroup>"#,
            r#"<PackageReference Include="A" Version="1.0" />"#,
            r#"</ItemGroup>"#,
        );
        let mut agg = Aggregate::new();
        let err =
            transform_document(Path::new("Broken.csproj"), xml, &Dialect::default(), &mut agg)
                .unwrap_err();
        assert!(matches!(err, CpvError::DocumentParse { .. }));
        assert!(err.to_string().contains("Broken.csproj"));
        assert!(agg.is_empty());
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let xml = concat!(
            r#"<Project><ItemGroup>"#,
            r#"<PackageReference Include="A" Version="1.0" />"#,
            r#"</ItemGroup></Project>"#,
        );
        let mut agg = Aggregate::new();
        let first = run(xml, &mut agg);
        let mut fresh = Aggregate::new();
        let second = run(&first.content, &mut fresh);
        assert!(!second.changed);
        assert_eq!(second.content, first.content);
        assert!(fresh.is_empty());
    }

    #[test]
    fn custom_dialect() {
        let dialect = Dialect {
            reference_tag: "PackageRef".to_string(),
            version_attribute: "Ver".to_string(),
            ..Dialect::default()
        };
        let xml =
            r#"<Project><ItemGroup><PackageRef Include="A" Ver="2.0" /></ItemGroup></Project>"#;
        let mut agg = Aggregate::new();
        let out = transform_document(Path::new("x.proj"), xml, &dialect, &mut agg).unwrap();
        assert_eq!(
            out.content,
            r#"<Project><ItemGroup><PackageRef Include="A" /></ItemGroup></Project>"#
        );
        assert_eq!(
            agg.get("A").unwrap().element_text,
            r#"<PackageVersion Include="A" Ver="2.0" />"#
        );
    }
}
