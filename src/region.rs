// 🗺️ Region Table - administrative division lookup
//
// The source document is a nested tree (province → city → district). We never
// keep the tree around: it is flattened once into code → full name, where the
// full name is every ancestor's name concatenated down to the node itself.

use crate::error::{Result, ToolkitError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

// ============================================================================
// REGION NODE
// ============================================================================

/// One node of the administrative region tree, as found in `pca-code.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionNode {
    pub code: String,
    pub name: String,

    /// Leaf districts usually omit this field entirely
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RegionNode>,
}

impl RegionNode {
    pub fn new(code: &str, name: &str) -> Self {
        RegionNode {
            code: code.to_string(),
            name: name.to_string(),
            children: Vec::new(),
        }
    }

    /// Builder pattern: add a child node
    pub fn with_child(mut self, child: RegionNode) -> Self {
        self.children.push(child);
        self
    }
}

// ============================================================================
// REGION TABLE
// ============================================================================

/// Flat, read-only mapping from region code to fully qualified name.
///
/// Built once at startup and shared by reference with every operation that
/// needs to check a region code.
#[derive(Debug, Clone, Default)]
pub struct RegionTable {
    names: HashMap<String, String>,
}

impl RegionTable {
    /// Load and flatten a region document from disk.
    ///
    /// An empty table is rejected as well: nothing downstream can succeed
    /// without region codes.
    pub fn load(path: &Path) -> Result<Self> {
        let location = path.display().to_string();
        let content =
            fs::read_to_string(path).map_err(|e| ToolkitError::data_unavailable(&location, e))?;
        let nodes: Vec<RegionNode> = serde_json::from_str(&content)
            .map_err(|e| ToolkitError::data_unavailable(&location, e))?;

        let table = Self::from_nodes(&nodes);
        if table.is_empty() {
            return Err(ToolkitError::data_unavailable(
                &location,
                "document contains no region codes",
            ));
        }

        debug!(path = %location, regions = table.len(), "region table loaded");
        Ok(table)
    }

    /// Parse a region document that is already in memory.
    pub fn from_json(json: &str) -> Result<Self> {
        let nodes: Vec<RegionNode> = serde_json::from_str(json)
            .map_err(|e| ToolkitError::data_unavailable("<inline>", e))?;
        Ok(Self::from_nodes(&nodes))
    }

    pub fn from_nodes(nodes: &[RegionNode]) -> Self {
        let mut names = HashMap::new();
        flatten(nodes, "", &mut names);
        RegionTable { names }
    }

    /// Exact-match lookup of a region code.
    pub fn lookup(&self, code: &str) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.names.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn flatten(nodes: &[RegionNode], parent_name: &str, out: &mut HashMap<String, String>) {
    for node in nodes {
        let full_name = format!("{}{}", parent_name, node.name);
        flatten(&node.children, &full_name, out);
        out.insert(node.code.clone(), full_name);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"[
        {"code": "11", "name": "北京市", "children": [
            {"code": "1101", "name": "市辖区", "children": [
                {"code": "110101", "name": "东城区"},
                {"code": "110105", "name": "朝阳区"}
            ]}
        ]},
        {"code": "50", "name": "重庆市", "children": [
            {"code": "500101", "name": "万州区"}
        ]}
    ]"#;

    #[test]
    fn test_flatten_concatenates_ancestor_names() {
        let table = RegionTable::from_json(SAMPLE).unwrap();

        assert_eq!(table.len(), 6);
        assert_eq!(table.lookup("11"), Some("北京市"));
        assert_eq!(table.lookup("1101"), Some("北京市市辖区"));
        assert_eq!(table.lookup("110105"), Some("北京市市辖区朝阳区"));
        assert_eq!(table.lookup("500101"), Some("重庆市万州区"));
    }

    #[test]
    fn test_lookup_is_exact_match() {
        let table = RegionTable::from_json(SAMPLE).unwrap();

        assert_eq!(table.lookup("1101050"), None);
        assert_eq!(table.lookup("11010"), None);
        assert!(!table.contains("5001"));
    }

    #[test]
    fn test_from_nodes_builder() {
        let tree = RegionNode::new("44", "广东省")
            .with_child(RegionNode::new("4419", "东莞市"));
        let table = RegionTable::from_nodes(&[tree]);

        assert_eq!(table.lookup("4419"), Some("广东省东莞市"));
    }

    #[test]
    fn test_load_missing_file_is_data_unavailable() {
        let err = RegionTable::load(Path::new("/nonexistent/pca-code.json")).unwrap_err();
        assert!(matches!(err, ToolkitError::DataUnavailable { .. }));
    }

    #[test]
    fn test_load_rejects_corrupt_and_empty_documents() {
        let mut corrupt = tempfile::NamedTempFile::new().unwrap();
        write!(corrupt, "{{ not json").unwrap();
        let err = RegionTable::load(corrupt.path()).unwrap_err();
        assert!(matches!(err, ToolkitError::DataUnavailable { .. }));

        let mut empty = tempfile::NamedTempFile::new().unwrap();
        write!(empty, "[]").unwrap();
        let err = RegionTable::load(empty.path()).unwrap_err();
        assert!(matches!(err, ToolkitError::DataUnavailable { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();

        let table = RegionTable::load(file.path()).unwrap();
        assert_eq!(table.lookup("110101"), Some("北京市市辖区东城区"));
    }
}
