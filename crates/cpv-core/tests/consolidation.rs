use std::path::Path;

use cpv_core::aggregate::Aggregate;
use cpv_core::config::Dialect;
use cpv_core::manifest::render_manifest;
use cpv_core::transform::transform_document;

fn project(refs: &[(&str, &str)]) -> String {
    let mut xml = String::from("<Project Sdk=\"Microsoft.NET.Sdk\">\n  <ItemGroup>\n");
    for (name, version) in refs {
        xml.push_str(&format!(
            "    <PackageReference Include=\"{name}\" Version=\"{version}\" />\n"
        ));
    }
    xml.push_str("  </ItemGroup>\n</Project>\n");
    xml
}

fn consolidate(docs: &[(&str, String)]) -> (Aggregate, Vec<String>) {
    let dialect = Dialect::default();
    let mut aggregate = Aggregate::new();
    let mut outputs = Vec::new();
    for (name, xml) in docs {
        let out = transform_document(Path::new(name), xml, &dialect, &mut aggregate).unwrap();
        outputs.push(out.content);
    }
    (aggregate, outputs)
}

#[test]
fn highest_version_wins_across_documents() {
    let docs = vec![
        ("A.csproj", project(&[("Foo", "1.2.0")])),
        ("B.csproj", project(&[("Foo", "1.10.0")])),
    ];
    let (aggregate, outputs) = consolidate(&docs);

    assert_eq!(aggregate.len(), 1);
    assert_eq!(aggregate.get("Foo").unwrap().version.original, "1.10.0");
    for out in &outputs {
        assert!(out.contains("<PackageReference Include=\"Foo\" />"), "got: {out}");
        assert!(!out.contains("Version="), "got: {out}");
    }

    let manifest = render_manifest(&aggregate, &Dialect::default());
    assert!(manifest.contains("<PackageVersion Include=\"Foo\" Version=\"1.10.0\" />"));
    assert!(!manifest.contains("1.2.0"));
}

#[test]
fn ties_keep_first_declaration_in_traversal_order() {
    let first = concat!(
        "<Project><ItemGroup>",
        "<PackageReference Include=\"Foo\" Version=\"2.0\" Condition=\"'$(A)'=='1'\" />",
        "</ItemGroup></Project>",
    );
    let second = concat!(
        "<Project><ItemGroup>",
        "<PackageReference Include=\"Foo\" Version=\"2.0.0\" />",
        "</ItemGroup></Project>",
    );
    let (aggregate, _) = consolidate(&[
        ("A.csproj", first.to_string()),
        ("B.csproj", second.to_string()),
    ]);
    let entry = aggregate.get("Foo").unwrap();
    assert_eq!(entry.version.original, "2.0");
    assert!(entry.element_text.contains("Condition"));
}

#[test]
fn manifest_is_stable_under_reordering_when_winners_match() {
    let a = project(&[("Serilog", "3.1.1"), ("Polly", "7.0.0")]);
    let b = project(&[("Polly", "8.2.0"), ("Dapper", "2.1.24")]);
    let c = project(&[("Serilog", "2.12.0"), ("Azure.Core", "1.36.0")]);

    let (forward, _) = consolidate(&[
        ("A.csproj", a.clone()),
        ("B.csproj", b.clone()),
        ("C.csproj", c.clone()),
    ]);
    let (backward, _) = consolidate(&[("C.csproj", c), ("B.csproj", b), ("A.csproj", a)]);

    let dialect = Dialect::default();
    let manifest = render_manifest(&forward, &dialect);
    assert_eq!(manifest, render_manifest(&backward, &dialect));

    let names: Vec<&str> = manifest
        .lines()
        .filter_map(|line| line.split("Include=\"").nth(1))
        .filter_map(|rest| rest.split('"').next())
        .collect();
    assert_eq!(names, vec!["Azure.Core", "Dapper", "Polly", "Serilog"]);
}

#[test]
fn invalid_version_is_excluded_from_manifest() {
    let docs = vec![
        ("A.csproj", project(&[("Broken", "abc"), ("Fine", "1.0.0")])),
    ];
    let (aggregate, outputs) = consolidate(&docs);
    assert!(aggregate.get("Broken").is_none());
    assert!(outputs[0].contains("<PackageReference Include=\"Broken\" Version=\"abc\" />"));

    let manifest = render_manifest(&aggregate, &Dialect::default());
    assert!(!manifest.contains("Broken"));
    assert!(manifest.contains("Fine"));
}

#[test]
fn non_reference_content_survives() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<Project Sdk="Microsoft.NET.Sdk">
  <!-- shared settings -->
  <PropertyGroup>
    <Nullable>enable</Nullable>
  </PropertyGroup>
  <ItemGroup>
    <ProjectReference Include="..\Core\Core.csproj" />
    <PackageReference Include="Foo" Version="1.0.0" />
  </ItemGroup>
</Project>
"#;
    let (_, outputs) = consolidate(&[("App.csproj", xml.to_string())]);
    assert_eq!(
        outputs[0],
        xml.replace(" Version=\"1.0.0\"", "")
    );
}
