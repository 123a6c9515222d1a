use crate::dialect::Dialect;
use crate::error::{ExtractError, Result};
use crate::types::{AnnotatedDocument, Declaration, DocumentMetadata, SourceFile};
use tree_sitter::{Node, Parser};

/// Syntax-tree analyzer bound to one dialect
pub struct AstAnalyzer {
    parser: Parser,
    dialect: Dialect,
}

impl AstAnalyzer {
    /// Create new AST analyzer for a dialect
    pub fn new(dialect: Dialect) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&dialect.tree_sitter_language())
            .map_err(|e| ExtractError::tree_sitter(format!("Failed to set language {dialect}: {e}")))?;

        Ok(Self { parser, dialect })
    }

    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Parse a file and derive its annotated document
    pub fn analyze(&mut self, file: &SourceFile) -> Result<AnnotatedDocument> {
        let tree = self
            .parser
            .parse(&file.content, None)
            .ok_or_else(|| ExtractError::parse(&file.path, "parser produced no syntax tree"))?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(ExtractError::parse(&file.path, describe_first_error(root)));
        }

        let mut declarations = Vec::new();
        let source = file.content.as_bytes();
        walk_preorder(root, |node| {
            if node.is_named() {
                self.classify(node, source, &mut declarations);
            }
        });

        let mut metadata = DocumentMetadata::default();
        for declaration in declarations {
            metadata.record(declaration);
        }

        log::debug!(
            "Analyzed {} ({}): {} classes, {} methods, {} dependencies",
            file.path,
            self.dialect,
            metadata.classes.len(),
            metadata.methods.len(),
            metadata.dependencies.len()
        );

        Ok(AnnotatedDocument {
            file_path: file.path.clone(),
            raw_content: file.content.clone(),
            serialized_tree: root.to_sexp(),
            metadata,
        })
    }

    fn classify(&self, node: Node, source: &[u8], out: &mut Vec<Declaration>) {
        match self.dialect {
            Dialect::JavaScript | Dialect::TypeScript | Dialect::Tsx => {
                classify_module(node, source, out);
            }
            Dialect::Python => classify_python(node, source, out),
            Dialect::Java => classify_java(node, source, out),
        }
    }
}

/// ECMAScript module grammar, with or without type annotations and JSX
fn classify_module(node: Node, source: &[u8], out: &mut Vec<Declaration>) {
    match node.kind() {
        "class_declaration" | "abstract_class_declaration" | "class" | "interface_declaration" => {
            out.push(Declaration::Class(field_text(node, "name", source)));
        }
        "function_declaration"
        | "generator_function_declaration"
        | "function_expression"
        | "function"
        | "generator_function" => {
            out.push(Declaration::Function(field_text(node, "name", source)));
        }
        "lexical_declaration" | "variable_declaration" if is_top_level_module_item(node) => {
            let names = declarator_names(node, source);
            if !names.is_empty() {
                out.push(Declaration::Variables(names));
            }
        }
        "import_statement" | "export_statement" => {
            if let Some(reference) = node
                .child_by_field_name("source")
                .and_then(|source_node| string_literal(source_node, source))
            {
                out.push(Declaration::Dependency(reference));
            }
        }
        "internal_module" | "module" => {
            // `declare module "x"` names a string, not a namespace
            if let Some(name) = node
                .child_by_field_name("name")
                .filter(|name| name.kind() != "string")
                .and_then(|name| text(name, source))
            {
                out.push(Declaration::Package(name));
            }
        }
        _ => {}
    }
}

fn classify_python(node: Node, source: &[u8], out: &mut Vec<Declaration>) {
    match node.kind() {
        "class_definition" => out.push(Declaration::Class(field_text(node, "name", source))),
        "function_definition" => {
            out.push(Declaration::Function(field_text(node, "name", source)));
        }
        "assignment" => {
            let top_level = node
                .parent()
                .filter(|parent| parent.kind() == "expression_statement")
                .and_then(|parent| parent.parent())
                .is_some_and(|grand| grand.kind() == "module");
            if !top_level {
                return;
            }
            if let Some(name) = node
                .child_by_field_name("left")
                .filter(|left| left.kind() == "identifier")
                .and_then(|left| text(left, source))
            {
                out.push(Declaration::Variables(vec![name]));
            }
        }
        "import_statement" => {
            let mut cursor = node.walk();
            for imported in node.children_by_field_name("name", &mut cursor) {
                let dotted = if imported.kind() == "aliased_import" {
                    imported.child_by_field_name("name")
                } else {
                    Some(imported)
                };
                if let Some(reference) = dotted.and_then(|n| text(n, source)) {
                    out.push(Declaration::Dependency(reference));
                }
            }
        }
        "import_from_statement" => {
            if let Some(reference) = field_text(node, "module_name", source) {
                out.push(Declaration::Dependency(reference));
            }
        }
        _ => {}
    }
}

fn classify_java(node: Node, source: &[u8], out: &mut Vec<Declaration>) {
    match node.kind() {
        "package_declaration" => {
            if let Some(name) = qualified_identifier(node, source) {
                out.push(Declaration::Package(name));
            }
        }
        "class_declaration"
        | "interface_declaration"
        | "enum_declaration"
        | "record_declaration"
        | "annotation_type_declaration" => {
            out.push(Declaration::Class(field_text(node, "name", source)));
        }
        "method_declaration" => {
            out.push(Declaration::Function(field_text(node, "name", source)));
        }
        "field_declaration" => {
            let mut cursor = node.walk();
            let names: Vec<String> = node
                .children_by_field_name("declarator", &mut cursor)
                .filter_map(|declarator| field_text(declarator, "name", source))
                .collect();
            if !names.is_empty() {
                out.push(Declaration::Variables(names));
            }
        }
        "import_declaration" => {
            if let Some(reference) = qualified_identifier(node, source) {
                out.push(Declaration::Dependency(reference));
            }
        }
        _ => {}
    }
}

/// Statement sits directly in the program body (optionally behind `export`/`declare`)
fn is_top_level_module_item(node: Node) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    match parent.kind() {
        "program" => true,
        "export_statement" | "ambient_declaration" => {
            parent.parent().is_some_and(|grand| grand.kind() == "program")
        }
        _ => false,
    }
}

/// Identifiers bound by `var/let/const` declarators; destructuring patterns are skipped
fn declarator_names(node: Node, source: &[u8]) -> Vec<String> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() == "variable_declarator")
        .filter_map(|declarator| declarator.child_by_field_name("name"))
        .filter(|name| name.kind() == "identifier")
        .filter_map(|name| text(name, source))
        .collect()
}

/// First `a.b.c` / `a` identifier child (Java package and import declarations)
fn qualified_identifier(node: Node, source: &[u8]) -> Option<String> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|child| matches!(child.kind(), "scoped_identifier" | "identifier"));
    found.and_then(|child| text(child, source))
}

fn string_literal(node: Node, source: &[u8]) -> Option<String> {
    let raw = node.utf8_text(source).ok()?;
    Some(raw.trim_matches(|c| c == '"' || c == '\'' || c == '`').to_string())
}

fn field_text(node: Node, field: &str, source: &[u8]) -> Option<String> {
    node.child_by_field_name(field)
        .and_then(|child| text(child, source))
}

fn text(node: Node, source: &[u8]) -> Option<String> {
    node.utf8_text(source)
        .ok()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
}

/// Visit every node in document order
fn walk_preorder<'tree>(root: Node<'tree>, mut visit: impl FnMut(Node<'tree>)) {
    let mut cursor = root.walk();
    loop {
        visit(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

/// Locate the first ERROR/MISSING node for the parse failure message
fn describe_first_error(root: Node) -> String {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            let position = node.start_position();
            let what = if node.is_missing() {
                format!("missing `{}`", node.kind())
            } else {
                "unexpected syntax".to_string()
            };
            return format!(
                "{what} at line {}, column {}",
                position.row + 1,
                position.column + 1
            );
        }

        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return "syntax error".to_string();
            }
        }
    }
}
