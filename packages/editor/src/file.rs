use crc32fast::Hasher;
use reshaper_syntax::SyntaxTree;
use std::collections::HashMap;
use std::sync::Arc;

/// Prefix of file root ids
pub const FILE_ROOT_PREFIX: &str = "file:";

/// Document seed for a file path using CRC32
pub fn document_seed(path: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(path.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ids for the nodes of one build of one file
///
/// Ids are `{seed}-{generation}-{count}`; every rebuild of a file bumps the
/// generation so ids are never reused across parses.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    generation: u32,
    count: u32,
}

impl IdGenerator {
    pub fn new(path: &str, generation: u32) -> Self {
        Self {
            seed: document_seed(path),
            generation,
            count: 0,
        }
    }

    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}-{}", self.seed, self.generation, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

/// An open file: its original syntax tree and the correlation between
/// preview indices and node ids
#[derive(Debug, Clone)]
pub struct File {
    path: String,
    root_id: String,
    tree: Arc<SyntaxTree>,
    generation: u32,
    index_to_id: HashMap<usize, String>,
    id_to_index: HashMap<String, usize>,
}

impl File {
    pub(crate) fn new(path: &str, tree: Arc<SyntaxTree>, generation: u32) -> Self {
        Self {
            path: path.to_string(),
            root_id: Self::root_id_for(path),
            tree,
            generation,
            index_to_id: HashMap::new(),
            id_to_index: HashMap::new(),
        }
    }

    pub fn root_id_for(path: &str) -> String {
        format!("{}{}", FILE_ROOT_PREFIX, path)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// Syntax tree the file's nodes were built from
    pub fn tree(&self) -> &Arc<SyntaxTree> {
        &self.tree
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn id_for_index(&self, index: usize) -> Option<&str> {
        self.index_to_id.get(&index).map(String::as_str)
    }

    pub fn index_for_id(&self, id: &str) -> Option<usize> {
        self.id_to_index.get(id).copied()
    }

    /// Number of correlated elements
    pub fn correlated_len(&self) -> usize {
        self.index_to_id.len()
    }

    pub(crate) fn set_correlation(&mut self, pairs: impl IntoIterator<Item = (usize, String)>) {
        self.index_to_id.clear();
        self.id_to_index.clear();
        for (index, id) in pairs {
            self.id_to_index.insert(id.clone(), index);
            self.index_to_id.insert(index, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_seeded_and_sequential() {
        let mut ids = IdGenerator::new("src/App.tsx", 2);
        let seed = document_seed("src/App.tsx");

        assert_eq!(ids.new_id(), format!("{}-2-1", seed));
        assert_eq!(ids.new_id(), format!("{}-2-2", seed));
        assert_ne!(seed, document_seed("src/Other.tsx"));
    }

    #[test]
    fn test_correlation_maps_both_ways() {
        let mut file = File::new("a.jsx", Arc::new(SyntaxTree::default()), 0);
        file.set_correlation(vec![(0, "x".to_string()), (2, "y".to_string())]);

        assert_eq!(file.root_id(), "file:a.jsx");
        assert_eq!(file.id_for_index(2), Some("y"));
        assert_eq!(file.index_for_id("x"), Some(0));
        assert_eq!(file.id_for_index(1), None);
        assert_eq!(file.correlated_len(), 2);
    }
}
