//! Comment discovery for JavaScript / TypeScript modules parsed with OXC.

use std::path::PathBuf;
use std::sync::Arc;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    BindingPattern, BindingPatternKind, Class, ClassElement, Comment, Declaration,
    ExportDefaultDeclarationKind, MethodDefinitionKind, Program, Statement, TSEnumMemberName,
};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::discovery::{CommentDiscovery, DocSymbol, ReflectionKind};
use crate::error::{CommentError, Result};
use crate::source::{CommentRange, DiscoveredComment, SourceUnit};

/// Which comments the index attaches to declarations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentStyle {
    /// Only `/** ... */` comments.
    #[default]
    JsDoc,
    /// Any comment directly preceding a declaration, `//` included.
    All,
}

/// A declaration found while indexing a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedSymbol {
    name: String,
    kind: ReflectionKind,
    start: u32,
    container: Option<String>,
    comment: Option<CommentRange>,
    constructor: Option<usize>,
}

impl IndexedSymbol {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ReflectionKind {
        self.kind
    }

    /// Offset of the statement or member that declares the symbol.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Name of the class or enum the symbol is a member of.
    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    pub fn comment(&self) -> Option<CommentRange> {
        self.comment
    }
}

impl DocSymbol for IndexedSymbol {
    fn is_source_unit(&self) -> bool {
        self.kind == ReflectionKind::Module
    }
}

/// Top-level declarations of one module and the comments attached to them.
///
/// The module itself is always the first symbol. It is offered the first
/// JSDoc comment preceding the first statement, which may also be the comment
/// of that statement; the resolver decides who keeps it.
#[derive(Debug)]
pub struct ModuleIndex {
    unit: Arc<SourceUnit>,
    symbols: Vec<IndexedSymbol>,
}

impl ModuleIndex {
    /// Index a module, attaching JSDoc comments only.
    pub fn parse(unit: Arc<SourceUnit>) -> Result<Self> {
        Self::parse_with(unit, CommentStyle::JsDoc)
    }

    pub fn parse_with(unit: Arc<SourceUnit>, style: CommentStyle) -> Result<Self> {
        let source_type = SourceType::from_path(unit.name()).unwrap_or(SourceType::mjs());
        let allocator = Allocator::default();
        let parsed = Parser::new(&allocator, unit.text(), source_type).parse();

        if !parsed.errors.is_empty() {
            let diagnostics: Vec<String> = parsed
                .errors
                .iter()
                .map(|err| format!("{:?}", err))
                .collect();
            return Err(CommentError::parse_error(
                PathBuf::from(unit.name()),
                &diagnostics,
            ));
        }

        let symbols = index_program(&parsed.program, unit.name(), style);
        tracing::debug!(
            module = unit.name(),
            symbols = symbols.len(),
            "indexed module declarations"
        );

        Ok(Self { unit, symbols })
    }

    pub fn unit(&self) -> &Arc<SourceUnit> {
        &self.unit
    }

    pub fn symbols(&self) -> &[IndexedSymbol] {
        &self.symbols
    }

    pub fn module_symbol(&self) -> &IndexedSymbol {
        &self.symbols[0]
    }

    /// First top-level symbol with the given name.
    pub fn symbol(&self, name: &str) -> Option<&IndexedSymbol> {
        self.symbols
            .iter()
            .skip(1)
            .find(|symbol| symbol.container.is_none() && symbol.name == name)
    }

    /// Member `name` of the class or enum `container`.
    pub fn member(&self, container: &str, name: &str) -> Option<&IndexedSymbol> {
        self.symbols
            .iter()
            .find(|symbol| symbol.container.as_deref() == Some(container) && symbol.name == name)
    }

    fn discovered(&self, range: Option<CommentRange>) -> Option<DiscoveredComment> {
        range.map(|range| DiscoveredComment::new(Arc::clone(&self.unit), range))
    }
}

impl CommentDiscovery for ModuleIndex {
    type Symbol = IndexedSymbol;
    type Signature = IndexedSymbol;

    fn discover_comment(
        &self,
        symbol: &IndexedSymbol,
        kind: ReflectionKind,
        _diagnostics: &dyn Diagnostics,
    ) -> Option<DiscoveredComment> {
        tracing::trace!(symbol = %symbol.name, ?kind, "discovering comment");
        self.discovered(symbol.comment)
    }

    fn discover_signature_comment(&self, signature: &IndexedSymbol) -> Option<DiscoveredComment> {
        if !signature.kind.has_signature() {
            return None;
        }
        self.discovered(signature.comment)
    }

    fn constructor_parameter(&self, symbol: &IndexedSymbol) -> Option<(&IndexedSymbol, String)> {
        let constructor = self.symbols.get(symbol.constructor?)?;
        Some((constructor, symbol.name.clone()))
    }
}

fn index_program(
    program: &Program<'_>,
    module_name: &str,
    style: CommentStyle,
) -> Vec<IndexedSymbol> {
    let first_statement = program.body.first().map(|statement| statement.span().start);
    let module_comment = program
        .comments
        .iter()
        .filter(|comment| comment.is_jsdoc())
        .find(|comment| first_statement.is_none_or(|start| comment.span.end <= start))
        .map(|comment| CommentRange::block(comment.span.start, comment.span.end));

    let mut indexer = Indexer {
        comments: build_comment_map(program.comments.iter(), style),
        symbols: vec![IndexedSymbol {
            name: module_name.to_string(),
            kind: ReflectionKind::Module,
            start: 0,
            container: None,
            comment: module_comment,
            constructor: None,
        }],
    };

    for statement in program.body.iter() {
        indexer.statement(statement);
    }
    indexer.symbols
}

/// Comment ranges keyed by the start of the node they lead.
type CommentMap = FxHashMap<u32, CommentRange>;

fn build_comment_map<'a, I>(comments: I, style: CommentStyle) -> CommentMap
where
    I: IntoIterator<Item = &'a Comment>,
{
    let mut map = CommentMap::default();
    for comment in comments {
        // Offset 0 marks a comment that leads no node.
        if comment.attached_to == 0 {
            continue;
        }
        let range = if comment.is_jsdoc() {
            CommentRange::block(comment.span.start, comment.span.end)
        } else if style == CommentStyle::JsDoc {
            continue;
        } else if comment.is_line() {
            CommentRange::line(comment.span.start, comment.span.end)
        } else {
            CommentRange::block(comment.span.start, comment.span.end)
        };
        // Comments arrive in source order, so the closest one wins.
        map.insert(comment.attached_to, range);
    }
    map
}

struct Indexer {
    comments: CommentMap,
    symbols: Vec<IndexedSymbol>,
}

impl Indexer {
    fn push(
        &mut self,
        name: impl Into<String>,
        kind: ReflectionKind,
        start: u32,
        container: Option<&str>,
    ) -> usize {
        self.symbols.push(IndexedSymbol {
            name: name.into(),
            kind,
            start,
            container: container.map(str::to_string),
            comment: self.comments.get(&start).copied(),
            constructor: None,
        });
        self.symbols.len() - 1
    }

    fn statement(&mut self, statement: &Statement<'_>) {
        match statement {
            Statement::ExportNamedDeclaration(export) => {
                if let Some(declaration) = &export.declaration {
                    self.declaration(declaration, export.span.start);
                }
            }
            Statement::ExportDefaultDeclaration(export) => match &export.declaration {
                ExportDefaultDeclarationKind::FunctionDeclaration(function) => {
                    let name = function
                        .id
                        .as_ref()
                        .map(|id| id.name.to_string())
                        .unwrap_or_else(|| "default".to_string());
                    self.push(name, ReflectionKind::Function, export.span.start, None);
                }
                ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                    self.class(class, export.span.start);
                }
                _ => {
                    self.push("default", ReflectionKind::Variable, export.span.start, None);
                }
            },
            _ => {
                if let Some(declaration) = statement.as_declaration() {
                    self.declaration(declaration, statement.span().start);
                }
            }
        }
    }

    fn declaration(&mut self, declaration: &Declaration<'_>, start: u32) {
        match declaration {
            Declaration::VariableDeclaration(variable) => {
                for declarator in variable.declarations.iter() {
                    if let Some(name) = binding_pattern_to_name(&declarator.id) {
                        self.push(name, ReflectionKind::Variable, start, None);
                    }
                }
            }
            Declaration::FunctionDeclaration(function) => {
                if let Some(id) = &function.id {
                    self.push(id.name.to_string(), ReflectionKind::Function, start, None);
                }
            }
            Declaration::ClassDeclaration(class) => self.class(class, start),
            Declaration::TSTypeAliasDeclaration(alias) => {
                let name = alias.id.name.to_string();
                self.push(name, ReflectionKind::TypeAlias, start, None);
            }
            Declaration::TSInterfaceDeclaration(interface) => {
                let name = interface.id.name.to_string();
                self.push(name, ReflectionKind::Interface, start, None);
            }
            Declaration::TSEnumDeclaration(enumeration) => {
                let name = enumeration.id.name.to_string();
                self.push(name.as_str(), ReflectionKind::Enum, start, None);
                for member in &enumeration.body.members {
                    let member_name = match &member.id {
                        TSEnumMemberName::Identifier(ident) => Some(ident.name.to_string()),
                        TSEnumMemberName::String(lit) => Some(lit.value.to_string()),
                        _ => None,
                    };
                    if let Some(member_name) = member_name {
                        self.push(
                            member_name,
                            ReflectionKind::EnumMember,
                            member.span.start,
                            Some(name.as_str()),
                        );
                    }
                }
            }
            Declaration::TSModuleDeclaration(module) => {
                let name = module.id.name().to_string();
                self.push(name, ReflectionKind::Namespace, start, None);
            }
            Declaration::TSGlobalDeclaration(_) => {
                self.push("global", ReflectionKind::Namespace, start, None);
            }
            Declaration::TSImportEqualsDeclaration(_) => {}
        }
    }

    fn class(&mut self, class: &Class<'_>, start: u32) {
        let class_name = class
            .id
            .as_ref()
            .map(|id| id.name.to_string())
            .unwrap_or_else(|| "default".to_string());
        self.push(class_name.as_str(), ReflectionKind::Class, start, None);

        for element in &class.body.body {
            match element {
                ClassElement::MethodDefinition(method) => {
                    let Some(name) = method.key.static_name() else {
                        continue;
                    };
                    let kind = match method.kind {
                        MethodDefinitionKind::Constructor => ReflectionKind::Constructor,
                        MethodDefinitionKind::Get | MethodDefinitionKind::Set => {
                            ReflectionKind::Accessor
                        }
                        MethodDefinitionKind::Method => ReflectionKind::Method,
                    };
                    let index = self.push(
                        name.to_string(),
                        kind,
                        method.span.start,
                        Some(class_name.as_str()),
                    );

                    if kind == ReflectionKind::Constructor {
                        self.parameter_properties(&method.value.params.items, index, &class_name);
                    }
                }
                ClassElement::PropertyDefinition(property) => {
                    if let Some(name) = property.key.static_name() {
                        self.push(
                            name.to_string(),
                            ReflectionKind::Property,
                            property.span.start,
                            Some(class_name.as_str()),
                        );
                    }
                }
                ClassElement::AccessorProperty(accessor) => {
                    if let Some(name) = accessor.key.static_name() {
                        self.push(
                            name.to_string(),
                            ReflectionKind::Accessor,
                            accessor.span.start,
                            Some(class_name.as_str()),
                        );
                    }
                }
                _ => {}
            }
        }
    }

    /// Constructor parameters with an accessibility or `readonly` modifier
    /// also declare properties of the class.
    fn parameter_properties(
        &mut self,
        params: &[oxc_ast::ast::FormalParameter<'_>],
        constructor: usize,
        class_name: &str,
    ) {
        for param in params {
            if param.accessibility.is_none() && !param.readonly {
                continue;
            }
            if let Some(name) = binding_pattern_to_name(&param.pattern) {
                let index = self.push(
                    name,
                    ReflectionKind::Property,
                    param.span.start,
                    Some(class_name),
                );
                self.symbols[index].constructor = Some(constructor);
            }
        }
    }
}

fn binding_pattern_to_name(pattern: &BindingPattern<'_>) -> Option<String> {
    match &pattern.kind {
        BindingPatternKind::BindingIdentifier(ident) => Some(ident.name.to_string()),
        _ => None,
    }
}
