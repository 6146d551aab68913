use std::borrow::Cow;
use std::path::{Path, PathBuf};

use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, ScalarStyle, Yaml, YamlEmitter};
use snafu::prelude::*;
use tracing::debug;

use crate::ext::BestEffortPathExt;
use crate::traversal::post_order;
use crate::tree::{CommitId, PathNode, PathTree};

const COMMIT_KEY: &str = "commit_hash";
const NODES_KEY: &str = "nodes";
const PATH_KEY: &str = "path";
const DESCRIPTION_KEY: &str = "description";
const IS_DIR_KEY: &str = "is_dir";

fn key(name: &'static str) -> Yaml<'static> {
    Yaml::Value(Scalar::String(Cow::Borrowed(name)))
}

/// Text that would load back as a number, boolean or null is written double quoted.
fn string_value(value: &str) -> Yaml<'static> {
    let text = Cow::Owned(value.to_string());
    match Scalar::parse_from_cow(Cow::Borrowed(value)) {
        Scalar::String(_) => Yaml::Value(Scalar::String(text)),
        _ => Yaml::Representation(text, ScalarStyle::DoubleQuoted, None),
    }
}

/// Reads and writes a tree file relative to a work tree root.
#[derive(Debug, Clone)]
pub struct TreeStore {
    path: PathBuf,
}

impl TreeStore {
    pub fn new(root: &Path, file_name: &str) -> Self {
        Self {
            path: root.join(file_name),
        }
    }

    pub async fn load(&self) -> Result<PathTree, TreeStoreError> {
        debug!("Reading tree file {}", self.path.best_effort_path_display());
        let bytes = fs::read(&self.path).await.context(ReadSnafu {
            file_path: self.path.best_effort_path_display(),
        })?;
        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: self.path.best_effort_path_display(),
        })?;

        let tree = parse_tree(&contents)?;
        debug!("Loaded {} nodes at {}", tree.len(), tree.source_commit().short());
        Ok(tree)
    }

    pub async fn save(&self, tree: &PathTree) -> Result<(), TreeStoreError> {
        let contents = render_tree(tree)?;
        fs::write(&self.path, contents.into_bytes())
            .await
            .0
            .context(WriteSnafu {
                file_path: self.path.best_effort_path_display(),
            })?;
        debug!("Wrote {} nodes to {}", tree.len(), self.path.best_effort_path_display());
        Ok(())
    }
}

/// Serializes `tree` with its nodes in traversal order, so the file only
/// changes where the tree does.
pub fn render_tree(tree: &PathTree) -> Result<String, TreeStoreError> {
    let nodes = post_order(tree)
        .into_iter()
        .map(|node| {
            let mut entry = LinkedHashMap::new();
            entry.insert(key(PATH_KEY), string_value(&node.path));
            entry.insert(key(DESCRIPTION_KEY), string_value(&node.description));
            entry.insert(key(IS_DIR_KEY), Yaml::Value(Scalar::Boolean(node.is_dir)));
            Yaml::Mapping(entry)
        })
        .collect::<Vec<_>>();

    let mut top_level = LinkedHashMap::new();
    top_level.insert(key(COMMIT_KEY), string_value(tree.source_commit().as_str()));
    top_level.insert(key(NODES_KEY), Yaml::Sequence(nodes));
    let document = Yaml::Mapping(top_level);

    let mut out = String::new();
    YamlEmitter::new(&mut out)
        .dump(&document)
        .context(EmitSnafu)?;
    out.push('\n');
    Ok(out)
}

pub fn parse_tree(contents: &str) -> Result<PathTree, TreeStoreError> {
    let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
    let document = documents.first().context(MalformedTreeSnafu)?;
    let top_level = document.as_mapping().context(TopLevelNotMapSnafu)?;

    let commit = top_level
        .get(&key(COMMIT_KEY))
        .and_then(scalar_to_string)
        .context(MissingFieldSnafu {
            field: COMMIT_KEY,
            context: "tree file",
        })?;

    let mut tree = PathTree::new(CommitId::new(commit));
    let nodes = match top_level.get(&key(NODES_KEY)) {
        None => return Ok(tree),
        Some(Yaml::Value(Scalar::Null)) => return Ok(tree),
        Some(nodes) => nodes.as_sequence().context(NodesNotSequenceSnafu)?,
    };

    for (index, entry) in nodes.iter().enumerate() {
        let node = parse_node(index, entry)?;
        ensure!(
            !tree.contains(&node.path),
            DuplicatePathSnafu {
                path: node.path.clone()
            }
        );
        tree.add_node(node);
    }

    Ok(tree)
}

fn parse_node(index: usize, entry: &Yaml) -> Result<PathNode, TreeStoreError> {
    let context = format!("node #{index}");
    let fields = entry.as_mapping().context(InvalidFieldSnafu {
        field: "node",
        context: context.clone(),
    })?;

    let path = fields
        .get(&key(PATH_KEY))
        .and_then(scalar_to_string)
        .filter(|path| !path.is_empty())
        .context(MissingFieldSnafu {
            field: PATH_KEY,
            context: context.clone(),
        })?;

    let description = match fields.get(&key(DESCRIPTION_KEY)) {
        None | Some(Yaml::Value(Scalar::Null)) => None,
        Some(value) => Some(scalar_to_string(value).context(InvalidFieldSnafu {
            field: DESCRIPTION_KEY,
            context: context.clone(),
        })?),
    };

    let is_dir = match fields.get(&key(IS_DIR_KEY)) {
        None => false,
        Some(Yaml::Value(Scalar::Boolean(is_dir))) => *is_dir,
        Some(_) => {
            return InvalidFieldSnafu {
                field: IS_DIR_KEY,
                context,
            }
            .fail();
        }
    };

    let node = PathNode::new(path, is_dir);
    Ok(match description {
        Some(description) => node.with_description(description),
        None => node,
    })
}

/// Accepts any scalar, so hand-edited files with unquoted numeric values still load.
fn scalar_to_string(value: &Yaml) -> Option<String> {
    match value {
        Yaml::Value(Scalar::String(text)) => Some(text.to_string()),
        Yaml::Value(Scalar::Integer(number)) => Some(number.to_string()),
        Yaml::Value(Scalar::FloatingPoint(number)) => Some(number.to_string()),
        Yaml::Value(Scalar::Boolean(flag)) => Some(flag.to_string()),
        _ => None,
    }
}

#[derive(Debug, Snafu)]
pub enum TreeStoreError {
    #[snafu(display("Failed to read the tree file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write the tree file: {}", file_path))]
    WriteError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("The tree file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the tree file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Failed to serialize the tree"))]
    EmitError { source: saphyr::EmitError },
    #[snafu(display("Improperly formatted tree file"))]
    MalformedTree,
    #[snafu(display("Top level of the tree file should be a map"))]
    TopLevelNotMap,
    #[snafu(display("The nodes section should be a list"))]
    NodesNotSequence,
    #[snafu(display("Missing '{}' in {}", field, context))]
    MissingField {
        field: &'static str,
        context: String,
    },
    #[snafu(display("Invalid '{}' in {}", field, context))]
    InvalidField {
        field: &'static str,
        context: String,
    },
    #[snafu(display("Path '{}' is listed multiple times", path))]
    DuplicatePath { path: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::DEFAULT_DESCRIPTION;
    use tempfile::TempDir;

    fn sample_tree() -> PathTree {
        let mut tree = PathTree::new("4b825dc642cb6eb9a060e54bf8d69288fbee4904");
        tree.add_node(PathNode::dir("a").with_description("Folder: with colon"));
        tree.add_node(PathNode::file("a/x.txt").with_description("line one\nline two"));
        tree.add_node(PathNode::file("b.txt"));
        tree.add_node(PathNode::file("true").with_description("123"));
        tree.add_node(PathNode::file("0o755").with_description("0x1F"));
        tree.add_node(PathNode::file("+12").with_description("null"));
        tree.add_node(PathNode::file("1e3").with_description(".inf"));
        tree
    }

    #[test]
    fn render_then_parse_preserves_every_field() {
        let tree = sample_tree();
        let rendered = render_tree(&tree).unwrap();
        let parsed = parse_tree(&rendered).unwrap();
        assert_eq!(parsed, tree);
    }

    #[test]
    fn text_resembling_other_scalars_is_quoted() {
        let rendered = render_tree(&sample_tree()).unwrap();
        assert!(rendered.contains("path: \"0o755\""));
        assert!(rendered.contains("path: \"+12\""));

        let parsed = parse_tree(&rendered).unwrap();
        assert_eq!(parsed.get_node("0o755").unwrap().description, "0x1F");
        assert!(!parsed.contains("493"));
    }

    #[test]
    fn nodes_are_written_in_traversal_order() {
        let rendered = render_tree(&sample_tree()).unwrap();
        let position = |needle: &str| rendered.find(needle).unwrap();
        assert!(position("a/x.txt") < position("path: a\n"));
        assert!(position("path: a\n") < position("b.txt"));
    }

    #[test]
    fn numeric_commit_hash_survives() {
        let tree = PathTree::new("1234567");
        let parsed = parse_tree(&render_tree(&tree).unwrap()).unwrap();
        assert_eq!(parsed.source_commit().as_str(), "1234567");
    }

    #[test]
    fn parses_hand_written_file() {
        let contents = r#"
commit_hash: abc123
nodes:
  - path: src
    description: Sources
    is_dir: true
  - path: src/main.rs
  - path: README.md
    description: ~
"#;
        let tree = parse_tree(contents).unwrap();
        assert_eq!(tree.source_commit().as_str(), "abc123");
        assert_eq!(tree.len(), 3);
        assert!(tree.get_node("src").unwrap().is_dir);
        assert_eq!(tree.get_node("src").unwrap().description, "Sources");
        assert_eq!(
            tree.get_node("src/main.rs").unwrap().description,
            DEFAULT_DESCRIPTION
        );
        assert_eq!(
            tree.get_node("README.md").unwrap().description,
            DEFAULT_DESCRIPTION
        );
    }

    #[test]
    fn empty_nodes_section_is_an_empty_tree() {
        let tree = parse_tree("commit_hash: abc\nnodes: []\n").unwrap();
        assert!(tree.is_empty());
        let tree = parse_tree("commit_hash: abc\n").unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn empty_file_is_malformed() {
        assert!(matches!(parse_tree(""), Err(TreeStoreError::MalformedTree)));
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        assert!(matches!(
            parse_tree("nodes: [unclosed"),
            Err(TreeStoreError::ParseError { .. })
        ));
    }

    #[test]
    fn list_top_level_is_rejected() {
        assert!(matches!(
            parse_tree("- a\n- b\n"),
            Err(TreeStoreError::TopLevelNotMap)
        ));
    }

    #[test]
    fn missing_commit_is_reported() {
        assert!(matches!(
            parse_tree("nodes: []\n"),
            Err(TreeStoreError::MissingField { field: "commit_hash", .. })
        ));
    }

    #[test]
    fn nodes_must_be_a_list() {
        assert!(matches!(
            parse_tree("commit_hash: abc\nnodes:\n  a: b\n"),
            Err(TreeStoreError::NodesNotSequence)
        ));
    }

    #[test]
    fn node_without_path_is_reported() {
        let result = parse_tree("commit_hash: abc\nnodes:\n  - description: orphan\n");
        assert!(matches!(
            result,
            Err(TreeStoreError::MissingField { field: "path", .. })
        ));
    }

    #[test]
    fn non_boolean_is_dir_is_invalid() {
        let result = parse_tree("commit_hash: abc\nnodes:\n  - path: a\n    is_dir: maybe\n");
        assert!(matches!(
            result,
            Err(TreeStoreError::InvalidField { field: "is_dir", .. })
        ));
    }

    #[test]
    fn duplicate_paths_are_rejected() {
        let result = parse_tree("commit_hash: abc\nnodes:\n  - path: a\n  - path: a\n");
        assert!(matches!(
            result,
            Err(TreeStoreError::DuplicatePath { path }) if path == "a"
        ));
    }

    #[compio::test]
    async fn save_then_load_through_the_filesystem() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let store = TreeStore::new(dir.path(), "filetree.yaml");
        assert!(!dir.path().join("filetree.yaml").exists());

        let tree = sample_tree();
        store.save(&tree).await.unwrap();
        assert!(dir.path().join("filetree.yaml").is_file());

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, tree);
    }

    #[compio::test]
    async fn loading_a_missing_file_fails_with_read_error() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let store = TreeStore::new(dir.path(), "nonexistent.yaml");

        let result = store.load().await;
        assert!(matches!(result, Err(TreeStoreError::ReadError { .. })));
    }
}
