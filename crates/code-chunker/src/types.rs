use repochat_extractor::AnnotatedDocument;
use serde::{Deserialize, Serialize};

/// A retrieval-ready fragment of one file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// Header block followed by the slice; this is the text that gets embedded
    pub content: String,

    /// Raw content slice
    pub slice: String,

    /// Start offset of the slice in the file, in characters
    pub start_char: usize,

    /// End offset of the slice in the file (exclusive), in characters
    pub end_char: usize,

    /// Retrieval metadata
    pub metadata: ChunkMetadata,
}

impl Chunk {
    pub(crate) fn new(
        doc: &AnnotatedDocument,
        slice: String,
        start_char: usize,
        end_char: usize,
        chunk_index: usize,
        total_chunks: usize,
    ) -> Self {
        let metadata = ChunkMetadata::new(doc, chunk_index, total_chunks);
        let content = render(&metadata, &slice);
        Self {
            content,
            slice,
            start_char,
            end_char,
            metadata,
        }
    }

    #[must_use]
    pub fn owner_file_path(&self) -> &str {
        &self.metadata.file_path
    }

    /// Number of characters in the slice
    #[must_use]
    pub const fn len_chars(&self) -> usize {
        self.end_char - self.start_char
    }
}

/// Metadata attached to every chunk
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    pub file_path: String,

    #[serde(rename = "package")]
    pub package_name: String,

    pub classes: Vec<String>,
    pub methods: Vec<String>,
    pub fields: Vec<String>,
    pub dependencies: Vec<String>,

    /// 1-based position
    pub chunk_index: usize,
    /// Estimated from file length before cutting; may be below the emitted count
    pub total_chunks: usize,
}

impl ChunkMetadata {
    fn new(doc: &AnnotatedDocument, chunk_index: usize, total_chunks: usize) -> Self {
        let meta = &doc.metadata;
        Self {
            file_path: doc.file_path.clone(),
            package_name: meta.package_name.clone(),
            classes: meta.classes.clone(),
            methods: meta.methods.clone(),
            fields: meta.fields.clone(),
            dependencies: meta.dependencies.clone(),
            chunk_index,
            total_chunks,
        }
    }
}

fn render(metadata: &ChunkMetadata, slice: &str) -> String {
    format!(
        "File: {} ({}/{})\nPackage: {}\nClasses: {}\nMethods: {}\nContent:\n{}\n",
        metadata.file_path,
        metadata.chunk_index,
        metadata.total_chunks,
        metadata.package_name,
        metadata.classes.join(", "),
        metadata.methods.join(", "),
        slice
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use repochat_extractor::DocumentMetadata;

    #[test]
    fn test_header_block() {
        let doc = AnnotatedDocument {
            file_path: "src/Order.java".to_string(),
            raw_content: "class Order {}".to_string(),
            serialized_tree: String::new(),
            metadata: DocumentMetadata {
                package_name: "com.acme".to_string(),
                classes: vec!["Order".to_string(), "Line".to_string()],
                methods: vec!["total".to_string()],
                ..Default::default()
            },
        };

        let chunk = Chunk::new(&doc, "class Order {}".to_string(), 0, 14, 1, 1);
        assert_eq!(
            chunk.content,
            "File: src/Order.java (1/1)\nPackage: com.acme\nClasses: Order, Line\nMethods: total\nContent:\nclass Order {}\n"
        );
        assert_eq!(chunk.owner_file_path(), "src/Order.java");
        assert_eq!(chunk.len_chars(), 14);
    }

    #[test]
    fn test_metadata_wire_names() {
        let metadata = ChunkMetadata {
            package_name: "pkg".to_string(),
            chunk_index: 2,
            total_chunks: 3,
            ..Default::default()
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["package"], "pkg");
        assert_eq!(json["chunkIndex"], 2);
        assert_eq!(json["totalChunks"], 3);
    }
}
