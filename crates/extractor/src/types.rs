use serde::{Deserialize, Serialize};

/// Placeholder recorded for a class without a name
pub const ANONYMOUS_CLASS: &str = "AnonymousClass";

/// Placeholder recorded for a function without a name
pub const ANONYMOUS_FUNCTION: &str = "AnonymousFunction";

/// A file fetched from the repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Repository-relative path, `/`-separated
    pub path: String,

    /// Full text content
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Structural summary of one source file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Namespace the file declares; empty when it declares none
    pub package_name: String,

    /// Declared class/interface names, document order
    pub classes: Vec<String>,

    /// Declared function/method names, document order
    pub methods: Vec<String>,

    /// Top-level variable names for JavaScript, TypeScript and Python.
    ///
    /// Java has no top-level variables, so this holds the field names of every class
    /// in the file, nested classes included, in document order.
    pub fields: Vec<String>,

    /// Raw reference strings of import-like statements
    pub dependencies: Vec<String>,
}

impl DocumentMetadata {
    /// Fold one declaration into the summary
    pub fn record(&mut self, declaration: Declaration) {
        match declaration {
            Declaration::Package(name) => {
                if self.package_name.is_empty() {
                    self.package_name = name;
                }
            }
            Declaration::Class(name) => self
                .classes
                .push(name.unwrap_or_else(|| ANONYMOUS_CLASS.to_string())),
            Declaration::Function(name) => self
                .methods
                .push(name.unwrap_or_else(|| ANONYMOUS_FUNCTION.to_string())),
            Declaration::Variables(names) => self.fields.extend(names),
            Declaration::Dependency(reference) => self.dependencies.push(reference),
        }
    }

    /// Fully-qualified `package.Class` names this file declares.
    ///
    /// Empty when the file declares no package.
    pub fn qualified_class_names(&self) -> impl Iterator<Item = String> + '_ {
        let package = self.package_name.as_str();
        self.classes
            .iter()
            .filter(move |_| !package.is_empty())
            .map(move |class| format!("{package}.{class}"))
    }
}

/// One structural fact found while walking a syntax tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// Namespace/package the file belongs to
    Package(String),
    /// Class or interface; `None` when anonymous
    Class(Option<String>),
    /// Function or method; `None` when anonymous
    Function(Option<String>),
    /// Identifiers bound by one variable declaration
    Variables(Vec<String>),
    /// Raw module reference of an import or re-export
    Dependency(String),
}

/// A source file together with its syntax tree and structural summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedDocument {
    pub file_path: String,
    pub raw_content: String,
    /// S-expression rendering of the syntax tree
    pub serialized_tree: String,
    pub metadata: DocumentMetadata,
}

impl AnnotatedDocument {
    /// Content length in characters
    #[must_use]
    pub fn content_chars(&self) -> usize {
        self.raw_content.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_placeholders() {
        let mut metadata = DocumentMetadata::default();
        metadata.record(Declaration::Class(None));
        metadata.record(Declaration::Function(None));
        metadata.record(Declaration::Class(Some("Widget".to_string())));

        assert_eq!(metadata.classes, vec![ANONYMOUS_CLASS, "Widget"]);
        assert_eq!(metadata.methods, vec![ANONYMOUS_FUNCTION]);
    }

    #[test]
    fn test_first_package_wins() {
        let mut metadata = DocumentMetadata::default();
        metadata.record(Declaration::Package("app.core".to_string()));
        metadata.record(Declaration::Package("app.other".to_string()));
        assert_eq!(metadata.package_name, "app.core");
    }

    #[test]
    fn test_qualified_class_names() {
        let mut metadata = DocumentMetadata::default();
        metadata.record(Declaration::Class(Some("B".to_string())));
        assert_eq!(metadata.qualified_class_names().count(), 0);

        metadata.record(Declaration::Package("pkg".to_string()));
        let names: Vec<_> = metadata.qualified_class_names().collect();
        assert_eq!(names, vec!["pkg.B"]);
    }

    #[test]
    fn test_metadata_wire_names() {
        let metadata = DocumentMetadata {
            package_name: "pkg".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["packageName"], "pkg");
        assert!(json["classes"].as_array().unwrap().is_empty());
    }
}
