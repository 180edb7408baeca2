//! Shared utilities for deptrace benchmarks.

// Benchmark utilities - pedantic lints not critical here
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]

use deptrace::ast::{
    ClassDecl, Expr, FunctionDecl, Hint, MemberDecl, MethodDecl, Param, SourceFile, Stmt,
};

/// Generate a layered project: `layers` levels of `width` classes each.
///
/// ```text
/// L0_0  L0_1  ...        (roots)
///   ^     ^
/// L1_0  L1_1  ...        extends L0_i, run() calls L0_{i+1}::run()
///   ^     ^
/// ...
/// entry_j                 one function per class of the last layer
/// ```
pub fn layered_project(layers: usize, width: usize) -> Vec<SourceFile> {
    let mut files = Vec::with_capacity(layers + 1);

    for layer in 0..layers {
        let mut file = SourceFile::new(format!("layer{layer}.php"));
        for i in 0..width {
            let mut class = ClassDecl {
                name: format!("L{layer}_{i}"),
                ..ClassDecl::default()
            };
            let mut body = Vec::new();
            if layer > 0 {
                class.extends = vec![Hint::named(format!("L{}_{i}", layer - 1))];
                body.push(Stmt::expr(Expr::static_call(
                    format!("L{}_{}", layer - 1, (i + 1) % width),
                    "run",
                    Vec::new(),
                )));
            }
            class.members = vec![MemberDecl::from(MethodDecl {
                name: "run".to_string(),
                params: vec![Param {
                    name: "peer".to_string(),
                    hint: Some(Hint::nullable(Hint::named(format!(
                        "L{layer}_{}",
                        (i + 1) % width
                    )))),
                    ..Param::default()
                }],
                return_type: Some(Hint::named("void")),
                body: Some(body),
                ..MethodDecl::default()
            })];
            file = file.with(class);
        }
        files.push(file);
    }

    let last = layers.saturating_sub(1);
    let mut entries = SourceFile::new("entries.php");
    for i in 0..width {
        entries = entries.with(FunctionDecl {
            name: format!("entry_{i}"),
            body: vec![Stmt::expr(Expr::method_call(
                Expr::new_object(format!("L{last}_{i}"), Vec::new()),
                "run",
                vec![Expr::Const {
                    name: "null".to_string(),
                }],
            ))],
            ..FunctionDecl::default()
        });
    }
    files.push(entries);
    files
}
