//! Import and include flattening tests
//!
//! Documents are written to a temporary directory so relative locations
//! resolve the same way they do for descriptions on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tempfile::TempDir;

use wsdl2::config::FEATURE_CONTINUE_ON_ERROR;
use wsdl2::model::ReferenceStatus;
use wsdl2::{Description, Reader, Severity};

/// A description with one interface and the given imports and includes
fn document(tns: &str, interface: &str, imports: &[(&str, &str)], includes: &[&str]) -> String {
    let mut xml = format!(
        "<description xmlns=\"http://www.w3.org/ns/wsdl\" targetNamespace=\"{}\">\n",
        tns
    );
    for (namespace, location) in imports {
        xml.push_str(&format!(
            "  <import namespace=\"{}\" location=\"{}\"/>\n",
            namespace, location
        ));
    }
    for location in includes {
        xml.push_str(&format!("  <include location=\"{}\"/>\n", location));
    }
    xml.push_str(&format!("  <interface name=\"{}\"/>\n", interface));
    xml.push_str("</description>\n");
    xml
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

fn interface_names(desc: &Description) -> Vec<String> {
    let mut names: Vec<String> = desc
        .interfaces
        .iter()
        .filter_map(|i| i.name.as_ref().map(|n| n.local_name.clone()))
        .collect();
    names.sort();
    names
}

fn read(path: &str) -> (Description, Reader) {
    let mut reader = Reader::new();
    reader.set_feature(FEATURE_CONTINUE_ON_ERROR, true).unwrap();
    let desc = reader.read_wsdl(path).unwrap();
    (desc, reader)
}

#[test]
fn test_diamond_import_merges_once() {
    let dir = TempDir::new().unwrap();
    let a = write(
        dir.path(),
        "a.wsdl",
        &document("urn:a", "A", &[("urn:b", "b.wsdl"), ("urn:c", "c.wsdl")], &[]),
    );
    write(dir.path(), "b.wsdl", &document("urn:b", "B", &[], &[]));
    write(dir.path(), "c.wsdl", &document("urn:c", "C", &[("urn:b", "b.wsdl")], &[]));

    let (desc, reader) = read(&a);

    assert_eq!(interface_names(&desc), vec!["A", "B", "C"]);
    assert!(!reader.error_reporter().has_errors());

    let statuses: Vec<_> = desc.imports.iter().map(|i| i.status).collect();
    assert_eq!(statuses.iter().filter(|s| **s == ReferenceStatus::Merged).count(), 2);
    assert_eq!(statuses.iter().filter(|s| **s == ReferenceStatus::Skipped).count(), 1);
}

#[test]
fn test_cyclic_import_terminates() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.wsdl", &document("urn:a", "A", &[("urn:b", "b.wsdl")], &[]));
    write(dir.path(), "b.wsdl", &document("urn:b", "B", &[("urn:a", "a.wsdl")], &[]));

    let (desc, reader) = read(&a);

    assert_eq!(interface_names(&desc), vec!["A", "B"]);
    assert!(!reader.error_reporter().has_errors());
}

#[test]
fn test_merged_components_belong_to_root() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.wsdl", &document("urn:a", "A", &[("urn:b", "b.wsdl")], &[]));
    write(dir.path(), "b.wsdl", &document("urn:b", "B", &[], &[]));

    let (desc, _) = read(&a);

    for interface in &desc.interfaces {
        assert_eq!(interface.info.parent, Some(desc.info.id));
    }
    let b = desc.interfaces.iter().find(|i| i.info.location.document.as_deref().unwrap_or("").ends_with("b.wsdl"));
    assert!(b.is_some());
}

#[test]
fn test_include_cycle_terminates() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.wsdl", &document("urn:a", "A", &[], &["a2.wsdl"]));
    write(dir.path(), "a2.wsdl", &document("urn:a", "A2", &[], &["a.wsdl"]));

    let (desc, reader) = read(&a);

    assert_eq!(interface_names(&desc), vec!["A", "A2"]);
    assert!(!reader.error_reporter().has_errors());
}

#[test]
fn test_include_namespace_mismatch() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.wsdl", &document("urn:a", "A", &[], &["other.wsdl"]));
    write(dir.path(), "other.wsdl", &document("urn:other", "Other", &[], &[]));

    let (_, reader) = read(&a);

    assert_eq!(reader.error_reporter().reports_with_id("Include-1068").count(), 1);
}

#[test]
fn test_import_namespace_mismatch() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.wsdl", &document("urn:a", "A", &[("urn:wrong", "b.wsdl")], &[]));
    write(dir.path(), "b.wsdl", &document("urn:b", "B", &[], &[]));

    let (desc, reader) = read(&a);

    assert_eq!(desc.imports[0].imported_namespace.as_deref(), Some("urn:b"));
    assert_eq!(reader.error_reporter().reports_with_id("Import-1070").count(), 1);
}

#[test]
fn test_import_of_own_namespace() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.wsdl", &document("urn:a", "A", &[("urn:a", "b.wsdl")], &[]));
    write(dir.path(), "b.wsdl", &document("urn:a", "B", &[], &[]));

    let (_, reader) = read(&a);

    assert_eq!(reader.error_reporter().reports_with_id("Import-1069").count(), 1);
}

#[test]
fn test_missing_import_is_a_warning() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.wsdl", &document("urn:a", "A", &[("urn:gone", "gone.wsdl")], &[]));

    let mut reader = Reader::new();
    let desc = reader.read_wsdl(&a).unwrap();

    assert_eq!(desc.imports[0].status, ReferenceStatus::Failed);
    let report = reader.error_reporter().reports_with_id("WSDL502").next().unwrap();
    assert_eq!(report.severity, Severity::Warning);
    assert!(!reader.error_reporter().has_errors());
}

#[test]
fn test_malformed_import_is_an_error() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.wsdl", &document("urn:a", "A", &[("urn:b", "b.wsdl")], &[]));
    write(dir.path(), "b.wsdl", "<description xmlns=\"http://www.w3.org/ns/wsdl\"");

    let (desc, reader) = read(&a);

    assert_eq!(desc.imports[0].status, ReferenceStatus::Failed);
    let report = reader.error_reporter().reports_with_id("WSDL511").next().unwrap();
    assert_eq!(report.severity, Severity::Error);
}

#[test]
fn test_import_without_location_keeps_record() {
    let dir = TempDir::new().unwrap();
    let xml = "<description xmlns=\"http://www.w3.org/ns/wsdl\" targetNamespace=\"urn:a\">\n\
               <import namespace=\"urn:elsewhere\"/>\n\
               </description>\n";
    let a = write(dir.path(), "a.wsdl", xml);

    let (desc, reader) = read(&a);

    assert_eq!(desc.imports.len(), 1);
    assert_eq!(desc.imports[0].status, ReferenceStatus::NoLocation);
    assert!(!reader.error_reporter().has_errors());
}

/// Import edges of a small graph; node 0 is the root
fn graph() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2usize..6).prop_flat_map(|n| {
        let edge = (0..n, 0..n).prop_filter("no self imports", |(from, to)| from != to);
        (Just(n), prop::collection::vec(edge, 0..12))
    })
}

fn reachable(n: usize, edges: &[(usize, usize)]) -> Vec<String> {
    let mut seen = vec![false; n];
    let mut stack = vec![0];
    while let Some(node) = stack.pop() {
        if seen[node] {
            continue;
        }
        seen[node] = true;
        stack.extend(edges.iter().filter(|(from, _)| *from == node).map(|(_, to)| *to));
    }
    let mut names: Vec<String> = (0..n).filter(|i| seen[*i]).map(|i| format!("I{}", i)).collect();
    names.sort();
    names
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_import_graphs_flatten_once((n, edges) in graph()) {
        let dir = TempDir::new().unwrap();

        let mut imports: BTreeMap<usize, Vec<(String, String)>> = BTreeMap::new();
        for (from, to) in &edges {
            imports
                .entry(*from)
                .or_default()
                .push((format!("urn:doc{}", to), format!("doc{}.wsdl", to)));
        }
        for i in 0..n {
            let list: Vec<(&str, &str)> = imports
                .get(&i)
                .map(|l| l.iter().map(|(ns, loc)| (ns.as_str(), loc.as_str())).collect())
                .unwrap_or_default();
            let xml = document(&format!("urn:doc{}", i), &format!("I{}", i), &list, &[]);
            write(dir.path(), &format!("doc{}.wsdl", i), &xml);
        }

        let root = dir.path().join("doc0.wsdl");
        let mut reader = Reader::new();
        let desc = reader.read_wsdl(&root.to_string_lossy()).unwrap();

        prop_assert_eq!(interface_names(&desc), reachable(n, &edges));
        prop_assert!(!reader.error_reporter().has_errors());
    }
}
