mod helpers;

use std::sync::Arc;

use fob_comments::{
    CommentError, CommentKind, CommentParserConfig, CommentRange, CommentResolver,
    DiagnosticCollector, JsDocNode, JsDocNodeKind, JsDocTree, LineCommentPolicy, ReflectionKind,
    ResolverOptions, SourceUnit,
};
use helpers::{CountingParser, FakeHost, FakeSymbol, block_range, init_tracing};

fn counting_resolver() -> CommentResolver<CountingParser> {
    init_tracing();
    CommentResolver::with_parser(CountingParser::default(), ResolverOptions::default())
}

#[test]
fn parses_each_comment_once_and_hands_out_copies() {
    let source = "/**\n * Adds numbers.\n * @param a first\n */\nexport function add(a) {}\n";
    let unit = SourceUnit::new("src/add.js", source);
    let range = block_range(&unit, "/**\n * Adds numbers.\n * @param a first\n */");
    let symbol = FakeSymbol::named("add").with_comment(&unit, range);
    let host = FakeHost::default();
    let resolver = counting_resolver();
    let config = CommentParserConfig::default();
    let diagnostics = DiagnosticCollector::new();

    let mut first = resolver
        .resolve_symbol(
            &host,
            &symbol,
            ReflectionKind::Function,
            &config,
            &diagnostics,
        )
        .unwrap()
        .unwrap();
    first.summary.clear();
    first.block_tags.clear();
    first.modifier_tags.insert("@internal".to_string());

    for _ in 0..3 {
        let again = resolver
            .resolve_symbol(
                &host,
                &symbol,
                ReflectionKind::Function,
                &config,
                &diagnostics,
            )
            .unwrap()
            .unwrap();
        assert_eq!(again.summary_text(), "Adds numbers.");
        let param = again.get_identified_tag("a", "@param").unwrap();
        assert_eq!(param.content_text(), "first");
        assert!(!again.has_modifier("@internal"));
    }

    assert_eq!(resolver.parser().parses(), 1);
    assert!(diagnostics.is_empty());
}

#[test]
fn module_symbol_keeps_package_documentation() {
    let source = "/** Utilities for strings.\n * @packageDocumentation */\n\nexport const a = 1;\n";
    let unit = SourceUnit::new("src/strings.js", source);
    let range = block_range(
        &unit,
        "/** Utilities for strings.\n * @packageDocumentation */",
    );
    let module = FakeSymbol::module("strings").with_comment(&unit, range);

    let comment = CommentResolver::default()
        .resolve_symbol(
            &FakeHost::default(),
            &module,
            ReflectionKind::Module,
            &CommentParserConfig::default(),
            &DiagnosticCollector::new(),
        )
        .unwrap()
        .unwrap();

    assert_eq!(comment.summary_text(), "Utilities for strings.");
    assert!(comment.is_module_scoped());
}

#[test]
fn module_tag_also_marks_module_comment() {
    let source = "/** @module strings */\nexport const a = 1;\n";
    let unit = SourceUnit::new("src/strings.js", source);
    let range = block_range(&unit, "/** @module strings */");
    let module = FakeSymbol::module("strings").with_comment(&unit, range);

    let comment = CommentResolver::default()
        .resolve_symbol(
            &FakeHost::default(),
            &module,
            ReflectionKind::Module,
            &CommentParserConfig::default(),
            &DiagnosticCollector::new(),
        )
        .unwrap();
    assert!(comment.is_some());
}

#[test]
fn first_statement_comment_is_not_module_documentation() {
    let source = "/** Only for foo. */\nexport function foo() {}\n";
    let unit = SourceUnit::new("src/foo.js", source);
    let range = block_range(&unit, "/** Only for foo. */");
    let module = FakeSymbol::module("foo").with_comment(&unit, range);
    let foo = FakeSymbol::named("foo").with_comment(&unit, range);

    let resolver = counting_resolver();
    let host = FakeHost::default();
    let config = CommentParserConfig::default();
    let diagnostics = DiagnosticCollector::new();

    let module_comment = resolver
        .resolve_symbol(
            &host,
            &module,
            ReflectionKind::Module,
            &config,
            &diagnostics,
        )
        .unwrap();
    assert!(module_comment.is_none());

    let foo_comment = resolver
        .resolve_symbol(&host, &foo, ReflectionKind::Function, &config, &diagnostics)
        .unwrap()
        .unwrap();
    assert_eq!(foo_comment.summary_text(), "Only for foo.");
    assert_eq!(resolver.parser().parses(), 1);
    assert!(diagnostics.is_empty());
}

#[test]
fn module_comment_is_not_attributed_to_declarations() {
    let source = "/** @packageDocumentation */\nexport function foo() {}\n";
    let unit = SourceUnit::new("src/foo.js", source);
    let range = block_range(&unit, "/** @packageDocumentation */");
    let foo = FakeSymbol::named("foo").with_comment(&unit, range);

    let comment = CommentResolver::default()
        .resolve_symbol(
            &FakeHost::default(),
            &foo,
            ReflectionKind::Function,
            &CommentParserConfig::default(),
            &DiagnosticCollector::new(),
        )
        .unwrap();
    assert!(comment.is_none());
}

#[test]
fn signatures_skip_module_filter() {
    let source = "/** @packageDocumentation Odd but allowed. */\nfunction f() {}\n";
    let unit = SourceUnit::new("src/f.js", source);
    let range = block_range(&unit, "/** @packageDocumentation Odd but allowed. */");
    let signature = FakeSymbol::named("f").with_comment(&unit, range);

    let comment = CommentResolver::default()
        .resolve_signature(
            &FakeHost::default(),
            &signature,
            &CommentParserConfig::default(),
            &DiagnosticCollector::new(),
        )
        .unwrap()
        .unwrap();
    assert_eq!(comment.summary_text(), "Odd but allowed.");
}

#[test]
fn symbols_without_comments_resolve_to_none() {
    let resolver = CommentResolver::default();
    let diagnostics = DiagnosticCollector::new();
    let config = CommentParserConfig::default();
    let host = FakeHost::default();

    let plain = FakeSymbol::named("plain");
    assert!(
        resolver
            .resolve_symbol(
                &host,
                &plain,
                ReflectionKind::Variable,
                &config,
                &diagnostics,
            )
            .unwrap()
            .is_none()
    );
    assert!(
        resolver
            .resolve_signature(&host, &plain, &config, &diagnostics)
            .unwrap()
            .is_none()
    );
    assert!(diagnostics.is_empty());
}

#[test]
fn line_comments_warn_or_fail_by_policy() {
    let source = "// Adds numbers\nexport function add() {}\n";
    let unit = SourceUnit::new("src/add.js", source);
    let symbol = FakeSymbol::named("add").with_comment(&unit, CommentRange::line(0, 15));
    let host = FakeHost::default();
    let config = CommentParserConfig::default();

    let diagnostics = DiagnosticCollector::new();
    let warned = CommentResolver::default()
        .resolve_symbol(
            &host,
            &symbol,
            ReflectionKind::Function,
            &config,
            &diagnostics,
        )
        .unwrap();
    assert!(warned.is_none());
    let warnings = diagnostics.warnings();
    assert_eq!(warnings.len(), 1);
    let location = warnings[0].location.as_ref().unwrap();
    assert_eq!(location.to_string(), "src/add.js:1:1");

    let strict = CommentResolver::new(ResolverOptions {
        line_comments: LineCommentPolicy::Reject,
    });
    let err = strict
        .resolve_symbol(
            &host,
            &symbol,
            ReflectionKind::Function,
            &config,
            &diagnostics,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        CommentError::UnsupportedCommentStyle {
            kind: CommentKind::Line,
            ..
        }
    ));
    assert!(!err.is_invariant_violation());
}

#[test]
fn property_falls_back_to_constructor_param() {
    let source = "class Point {\n  /**\n   * Creates a point.\n   * @param x The x value\n   */\n  constructor(public x) {}\n}\n";
    let unit = SourceUnit::new("src/point.ts", source);
    let constructor = FakeSymbol::named("constructor").with_comment(
        &unit,
        block_range(
            &unit,
            "/**\n   * Creates a point.\n   * @param x The x value\n   */",
        ),
    );
    let host = FakeHost {
        signatures: vec![constructor],
    };
    let property = FakeSymbol {
        constructor_parameter: Some((0, "x".to_string())),
        ..FakeSymbol::named("x")
    };
    let resolver = CommentResolver::default();
    let config = CommentParserConfig::default();
    let diagnostics = DiagnosticCollector::new();

    let comment = resolver
        .resolve_symbol(
            &host,
            &property,
            ReflectionKind::Property,
            &config,
            &diagnostics,
        )
        .unwrap()
        .unwrap();
    assert_eq!(comment.summary_text(), "The x value");

    // Only properties fall back.
    let variable = resolver
        .resolve_symbol(
            &host,
            &property,
            ReflectionKind::Variable,
            &config,
            &diagnostics,
        )
        .unwrap();
    assert!(variable.is_none());

    let unknown = FakeSymbol {
        constructor_parameter: Some((0, "y".to_string())),
        ..FakeSymbol::named("y")
    };
    assert!(
        resolver
            .resolve_symbol(
                &host,
                &unknown,
                ReflectionKind::Property,
                &config,
                &diagnostics,
            )
            .unwrap()
            .is_none()
    );
}

#[test]
fn enum_members_share_enum_description() {
    let source = "/**\n * Light states.\n * @enum {string} Traffic light colors\n */\nconst Light = { Red: 'r', Amber: 'a', Green: 'g' };\n";
    let unit = SourceUnit::new("src/light.js", source);
    let block = block_range(
        &unit,
        "/**\n * Light states.\n * @enum {string} Traffic light colors\n */",
    );

    let mut builder = JsDocTree::builder(Arc::clone(&unit));
    let comment = builder.comment(block.start, block.end);
    let enum_tag = builder.child(comment, JsDocNode::new(JsDocNodeKind::EnumTag, 24, 59));
    let tree = Arc::new(builder.build());

    let members: Vec<FakeSymbol> = ["Red", "Amber", "Green"]
        .into_iter()
        .map(|name| FakeSymbol::named(name).declared_by(&tree, enum_tag))
        .collect();

    let resolver = counting_resolver();
    let host = FakeHost::default();
    let config = CommentParserConfig::default();
    let diagnostics = DiagnosticCollector::new();

    let comments: Vec<_> = members
        .iter()
        .map(|member| {
            resolver
                .resolve_symbol(
                    &host,
                    member,
                    ReflectionKind::EnumMember,
                    &config,
                    &diagnostics,
                )
                .unwrap()
                .unwrap()
        })
        .collect();

    // `{string}` is a type annotation and never part of the content, and the
    // block summary is not the enum description.
    for comment in &comments {
        assert_eq!(comment.summary_text(), "Traffic light colors");
    }
    assert_eq!(resolver.parser().parses(), 1);
}

#[test]
fn enum_tag_content_is_copied_to_members() {
    let source = "/** @enum {number} Sizes in pixels */\nconst Size = { S: 1, M: 2 };\n";
    let unit = SourceUnit::new("src/size.js", source);
    let block = block_range(&unit, "/** @enum {number} Sizes in pixels */");

    let mut builder = JsDocTree::builder(Arc::clone(&unit));
    let comment = builder.comment(block.start, block.end);
    let enum_tag = builder.child(comment, JsDocNode::new(JsDocNodeKind::EnumTag, 4, 35));
    let tree = builder.build();

    let resolver = CommentResolver::default();
    let resolved = resolver
        .resolve_jsdoc(
            tree.declaration(enum_tag),
            &CommentParserConfig::default(),
            &DiagnosticCollector::new(),
        )
        .unwrap()
        .unwrap();
    assert_eq!(resolved.summary_text(), "Sizes in pixels");
    assert!(resolved.block_tags.is_empty());
}

#[test]
fn described_template_with_several_parameters_is_ambiguous() {
    let source = "/**\n * Pairs things.\n * @template K, V the key and value\n */\nfunction pair(k, v) {}\n";
    let unit = SourceUnit::new("src/pair.js", source);
    let block = block_range(
        &unit,
        "/**\n * Pairs things.\n * @template K, V the key and value\n */",
    );

    let mut builder = JsDocTree::builder(Arc::clone(&unit));
    let comment = builder.comment(block.start, block.end);
    let template = builder.child(
        comment,
        JsDocNode::new(JsDocNodeKind::TemplateTag, 23, 57)
            .with_type_parameters(["K", "V"])
            .with_comment("the key and value"),
    );
    let k = builder.child(
        template,
        JsDocNode::new(JsDocNodeKind::TypeParameter, 34, 35).named("K"),
    );
    let v = builder.child(
        template,
        JsDocNode::new(JsDocNodeKind::TypeParameter, 37, 38).named("V"),
    );
    let tree = builder.build();

    let resolver = CommentResolver::default();
    let config = CommentParserConfig::default();
    let diagnostics = DiagnosticCollector::new();
    for parameter in [k, v, k] {
        let resolved = resolver
            .resolve_jsdoc(tree.declaration(parameter), &config, &diagnostics)
            .unwrap();
        assert!(resolved.is_none());
    }

    let warnings = diagnostics.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("multiple type parameters"));
    assert_eq!(warnings[0].location.as_ref().unwrap().line, 3);
}

#[test]
fn single_template_parameter_resolves_its_tag() {
    let source = "/**\n * @template T the element type\n */\nfunction first(items) {}\n";
    let unit = SourceUnit::new("src/first.js", source);
    let block = block_range(&unit, "/**\n * @template T the element type\n */");

    let mut builder = JsDocTree::builder(Arc::clone(&unit));
    let comment = builder.comment(block.start, block.end);
    let template = builder.child(
        comment,
        JsDocNode::new(JsDocNodeKind::TemplateTag, 7, 35)
            .with_type_parameters(["T"])
            .with_comment("the element type"),
    );
    let t = builder.child(
        template,
        JsDocNode::new(JsDocNodeKind::TypeParameter, 17, 18).named("T"),
    );
    let tree = builder.build();

    let diagnostics = DiagnosticCollector::new();
    let resolved = CommentResolver::default()
        .resolve_jsdoc(
            tree.declaration(t),
            &CommentParserConfig::default(),
            &diagnostics,
        )
        .unwrap()
        .unwrap();
    assert_eq!(resolved.summary_text(), "the element type");
    assert!(diagnostics.is_empty());
}

#[test]
fn missing_tag_is_reported_as_bug() {
    init_tracing();
    let source = "/**\n * @param present here\n */\nfunction f(present) {}\n";
    let unit = SourceUnit::new("src/f.js", source);
    let block = block_range(&unit, "/**\n * @param present here\n */");

    let mut builder = JsDocTree::builder(Arc::clone(&unit));
    let comment = builder.comment(block.start, block.end);
    let present = builder.child(
        comment,
        JsDocNode::new(JsDocNodeKind::ParameterTag, 7, 26).named("present"),
    );
    let absent = builder.child(
        comment,
        JsDocNode::new(JsDocNodeKind::ParameterTag, 7, 26).named("absent"),
    );
    let tree = builder.build();

    let resolver = CommentResolver::default();
    let config = CommentParserConfig::default();
    let diagnostics = DiagnosticCollector::new();

    let found = resolver
        .resolve_jsdoc(tree.declaration(present), &config, &diagnostics)
        .unwrap()
        .unwrap();
    assert_eq!(found.summary_text(), "here");

    let err = resolver
        .resolve_jsdoc(tree.declaration(absent), &config, &diagnostics)
        .unwrap_err();
    assert!(err.is_invariant_violation());
    match &err {
        CommentError::MissingJsDocTag { name, tag, .. } => {
            assert_eq!(name, "absent");
            assert_eq!(tag, "@param");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("please file a bug report"));
}

#[test]
fn property_spelled_prop_uses_written_tag() {
    let source = "/**\n * @typedef {Object} Opts\n * @prop {boolean} fast - go fast\n */\n";
    let unit = SourceUnit::new("src/opts.js", source);
    let block = block_range(
        &unit,
        "/**\n * @typedef {Object} Opts\n * @prop {boolean} fast - go fast\n */",
    );

    let mut builder = JsDocTree::builder(Arc::clone(&unit));
    let comment = builder.comment(block.start, block.end);
    let typedef = builder.child(
        comment,
        JsDocNode::new(JsDocNodeKind::TypedefTag, 7, 29).named("Opts"),
    );
    let fast = builder.child(
        typedef,
        JsDocNode::new(JsDocNodeKind::PropertyTag, 33, 65)
            .named("fast")
            .with_tag_name("prop"),
    );
    let tree = Arc::new(builder.build());
    let symbol = FakeSymbol::named("fast").declared_by(&tree, fast);

    let comment = CommentResolver::default()
        .resolve_symbol(
            &FakeHost::default(),
            &symbol,
            ReflectionKind::Property,
            &CommentParserConfig::default(),
            &DiagnosticCollector::new(),
        )
        .unwrap()
        .unwrap();
    assert_eq!(comment.summary_text(), "go fast");
}

#[test]
fn concurrent_resolution_agrees_on_one_comment() {
    use rayon::prelude::*;

    let source = "/**\n * Shared.\n * @param a first\n * @beta\n */\nexport function shared(a) {}\n";
    let unit = SourceUnit::new("src/shared.js", source);
    let range = block_range(&unit, "/**\n * Shared.\n * @param a first\n * @beta\n */");
    let symbol = FakeSymbol::named("shared").with_comment(&unit, range);
    let resolver = counting_resolver();
    let host = FakeHost::default();
    let config = CommentParserConfig::default();
    let diagnostics = DiagnosticCollector::new();

    let comments: Vec<_> = (0..128)
        .into_par_iter()
        .map(|_| {
            resolver
                .resolve_symbol(
                    &host,
                    &symbol,
                    ReflectionKind::Function,
                    &config,
                    &diagnostics,
                )
                .unwrap()
                .unwrap()
        })
        .collect();

    assert!(comments.iter().all(|comment| *comment == comments[0]));
    assert!(comments[0].has_modifier("@beta"));

    let stats = resolver.cache().stats();
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.misses, resolver.parser().parses());
    assert_eq!(stats.discarded, stats.misses - 1);
}
