use crate::models::{Language, ModuleReference, ReferenceKind};
use tree_sitter::{Node, Parser};

use super::ParserError;

/// Collects module-reference string literals from JavaScript/TypeScript
/// sources: `require("x")`, `import("x")`, `import ... from "x"` and
/// `export ... from "x"`. Each reference carries the byte span of the
/// literal's content so the caller can splice a replacement in place.
pub struct JavaScriptParser {
    parser: Parser,
    is_typescript: bool,
}

impl JavaScriptParser {
    pub fn new(typescript: bool) -> Result<Self, ParserError> {
        let mut parser = Parser::new();

        let language = if typescript {
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
        } else {
            tree_sitter_javascript::LANGUAGE.into()
        };

        parser
            .set_language(&language)
            .map_err(|e| ParserError::InitError(e.to_string()))?;

        Ok(Self {
            parser,
            is_typescript: typescript,
        })
    }

    pub fn language(&self) -> Language {
        if self.is_typescript {
            Language::TypeScript
        } else {
            Language::JavaScript
        }
    }

    /// Parse source code and extract module references in source order
    pub fn parse(&mut self, source: &str) -> Vec<ModuleReference> {
        match self.parser.parse(source, None) {
            Some(tree) => {
                let mut references = Vec::new();
                self.traverse_node(&tree.root_node(), source, &mut references);
                references
            }
            None => vec![],
        }
    }

    fn traverse_node(&self, node: &Node, source: &str, references: &mut Vec<ModuleReference>) {
        match node.kind() {
            "import_statement" => {
                self.collect_source_literal(node, source, ReferenceKind::Import, references);
            }
            "export_statement" => {
                // Only `export ... from 'module'` carries a source field
                self.collect_source_literal(node, source, ReferenceKind::Export, references);
            }
            "call_expression" => {
                self.collect_call(node, source, references);
            }
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.traverse_node(&child, source, references);
        }
    }

    fn collect_source_literal(
        &self,
        node: &Node,
        source: &str,
        kind: ReferenceKind,
        references: &mut Vec<ModuleReference>,
    ) {
        if let Some(string_node) = node.child_by_field_name("source") {
            self.push_reference(&string_node, source, kind, references);
        }
    }

    /// Collect `require("x")` and dynamic `import("x")` calls
    fn collect_call(&self, node: &Node, source: &str, references: &mut Vec<ModuleReference>) {
        let Some(function) = node.child_by_field_name("function") else {
            return;
        };
        let kind = match function.kind() {
            "identifier" if self.node_text(&function, source) == "require" => {
                ReferenceKind::Require
            }
            "import" => ReferenceKind::DynamicImport,
            _ => return,
        };

        let Some(arguments) = node.child_by_field_name("arguments") else {
            return;
        };
        let mut cursor = arguments.walk();
        for argument in arguments.named_children(&mut cursor) {
            if argument.kind() == "comment" {
                continue;
            }
            // Only a plain string literal in first-argument position
            if argument.kind() == "string" {
                self.push_reference(&argument, source, kind, references);
            }
            break;
        }
    }

    fn push_reference(
        &self,
        string_node: &Node,
        source: &str,
        kind: ReferenceKind,
        references: &mut Vec<ModuleReference>,
    ) {
        if string_node.kind() != "string" {
            return;
        }
        let range = string_node.byte_range();
        if range.len() < 2 {
            return;
        }
        // Quotes are one byte each; the span covers the content between them
        let span = range.start + 1..range.end - 1;
        let value = source[span.clone()].to_string();
        if value.is_empty() {
            return;
        }

        references.push(ModuleReference {
            value,
            span,
            line: string_node.start_position().row + 1,
            column: string_node.start_position().column,
            kind,
        });
    }

    fn node_text<'a>(&self, node: &Node, source: &'a str) -> &'a str {
        &source[node.byte_range()]
    }
}
