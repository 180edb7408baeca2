//! Closure, dependents, cycle and statistics queries over the fixture project.

mod common;

use common::{analyze_all, analyze_all_with_builtins};
use deptrace::ast::{Expr, FunctionDecl, SourceFile, Stmt};
use deptrace::{Analysis, Config, Cycle, DependencyKind, Error, SymbolKind};
use rstest::rstest;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

// === Coarse closures ===

#[test]
fn coarse_closure_contains_every_ancestor() {
    let analysis = analyze_all();

    let closure = analysis.coarse_closure("Derived").expect("Derived is declared");

    assert_eq!(closure.seed, "Derived");
    assert_eq!(closure.symbols.first().map(String::as_str), Some("ImplementingBase"));
    assert!(closure.symbols.contains(&"AbstractBase".to_string()));
    assert!(closure.unresolved.is_empty());
}

#[test]
fn requirement_is_retained_in_the_closure_of_a_user() {
    let analysis = analyze_all();

    let closure = analysis
        .coarse_closure("with_requiring_interface")
        .expect("declared");

    assert_eq!(closure.symbols, names(&["IWithRequirement", "A", "A0", "I1"]));
}

#[test]
fn closure_excludes_the_seed_without_a_cycle() {
    let analysis = analyze_all();

    let closure = analysis.coarse_closure("g").expect("declared");

    assert_eq!(closure.symbols, names(&["B", "I1"]));
}

#[rstest]
#[case("recursive_function")]
#[case("WithRecursiveMethods")]
#[case("WithRecursiveMethods::recursive_static")]
fn recursion_puts_the_seed_in_its_own_closure(#[case] seed: &str) {
    let analysis = analyze_all();

    let closure = analysis.coarse_closure(seed).expect("declared");
    let owner = seed.split("::").next().unwrap_or(seed);

    assert_eq!(closure.symbols, names(&[owner]));
}

#[test]
fn unresolved_names_are_reported_alongside() {
    let analysis = analyze_all();

    let closure = analysis
        .coarse_closure("nonexistent_dependency")
        .expect("declared");

    assert!(closure.symbols.is_empty());
    assert_eq!(closure.unresolved, names(&["BogusType"]));
}

// === Fine closures ===

#[test]
fn fine_closure_skips_unrelated_members() {
    let analysis = analyze_all();

    let fine = analysis.fine_closure("with_constants").expect("declared");
    let coarse = analysis.coarse_closure("with_constants").expect("declared");

    assert!(fine.symbols.contains(&"WithConst".to_string()));
    assert!(
        !fine.symbols.contains(&"A0".to_string()),
        "A0 is only needed by WithConst::WITH_CONSTRAINT"
    );
    assert!(coarse.symbols.contains(&"A0".to_string()));
}

#[test]
fn fine_closure_follows_type_constant_values() {
    let analysis = analyze_all();

    let fine = analysis.fine_closure("with_type_constants").expect("declared");

    assert_eq!(fine.symbols, names(&["WithAbstractConst", "WithConst", "A0"]));
}

#[test]
fn fine_closure_of_a_member_seed() {
    let analysis = analyze_all();

    let fine = analysis.fine_closure("WithConst::CENUM").expect("declared");

    assert_eq!(fine.symbols, names(&["SomeEnum"]));
}

#[test]
fn inherited_member_seed_includes_the_declaring_class() {
    let analysis = analyze_all();

    let seed = deptrace::query::resolve_seed(&analysis.table, "Derived::inherited")
        .expect("inherited through ImplementingBase");
    assert_eq!(analysis.table.get(seed.symbol).name, "Derived");
    let owner = seed.inherited_from().expect("declared on an ancestor");
    assert_eq!(analysis.table.get(owner).name, "ImplementingBase");

    let coarse = analysis.coarse_closure("Derived::inherited").expect("declared");
    let fine = analysis.fine_closure("Derived::inherited").expect("declared");

    assert_eq!(coarse.symbols, names(&["ImplementingBase", "AbstractBase"]));
    assert_eq!(fine.symbols, names(&["ImplementingBase", "AbstractBase"]));
}

#[test]
fn own_member_seed_is_not_inherited() {
    let analysis = analyze_all();

    let seed = deptrace::query::resolve_seed(&analysis.table, "ImplementingBase::inherited")
        .expect("declared");

    assert_eq!(seed.inherited_from(), None);
    assert_eq!(seed.node.symbol, seed.symbol);
}

#[test]
fn fine_closure_keeps_headers_of_reached_classes() {
    let analysis = analyze_all();

    let fine = analysis.fine_closure("with_overriding").expect("declared");

    // Derived's header pulls in the whole inheritance chain
    assert_eq!(fine.symbols, names(&["Derived", "ImplementingBase", "AbstractBase"]));
}

#[rstest]
#[case("Derived")]
#[case("with_constants")]
#[case("with_type_constants")]
#[case("WithStaticProperty")]
#[case("call_with_default_and_variadic")]
#[case("SimpleDerived::call_parent_method")]
#[case("Derived::inherited")]
fn fine_is_a_subset_of_coarse(#[case] seed: &str) {
    let analysis = analyze_all();

    let fine = analysis.fine_closure(seed).expect("declared");
    let coarse = analysis.coarse_closure(seed).expect("declared");

    for symbol in &fine.symbols {
        assert!(coarse.symbols.contains(symbol), "{symbol} missing from coarse");
    }
    for name in &fine.unresolved {
        assert!(coarse.unresolved.contains(name), "{name} missing from coarse");
    }
}

// === Seeds ===

#[test]
fn space_prefix_selects_between_same_named_symbols() {
    let analysis = analyze_all();

    let class = analysis
        .coarse_closure("WithNameMatchingClassName")
        .expect("declared");
    let function = analysis
        .coarse_closure("function:WithNameMatchingClassName")
        .expect("declared");

    assert!(class.symbols.is_empty(), "the class is preferred and has no edges");
    assert_eq!(function.symbols, names(&["WithNameMatchingClassName"]));
}

#[test]
fn property_seeds_accept_a_dollar_prefix() {
    let analysis = analyze_all_with_builtins();

    let closure = analysis
        .coarse_closure("WithStaticProperty::$vector")
        .expect("declared");

    assert!(closure.symbols.contains(&"Vector".to_string()));
    assert!(closure.symbols.contains(&"A".to_string()));
}

#[rstest]
#[case("Nope")]
#[case("Derived::nope")]
#[case("constant:Derived")]
fn unknown_seed_is_an_error(#[case] seed: &str) {
    let analysis = analyze_all();

    let err = analysis.coarse_closure(seed).expect_err("unknown seed");

    assert!(matches!(err, Error::UnknownSymbol(ref e) if e.name == seed));
    assert!(analysis.fine_closure(seed).is_err());
    assert!(analysis.dependents(seed).is_err());
}

// === Dependents ===

#[test]
fn dependents_group_kinds_by_symbol() {
    let analysis = analyze_all();

    let dependents = analysis.dependents("AbstractBase").expect("declared");

    let summary: Vec<_> = dependents
        .iter()
        .map(|d| (d.symbol.as_str(), d.kinds.clone()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("ImplementingBase", vec![DependencyKind::Extends]),
            (
                "with_abstract",
                vec![
                    DependencyKind::ReadsProperty,
                    DependencyKind::ReadsStaticProperty,
                    DependencyKind::ReadsClassConstant,
                    DependencyKind::UsesType,
                ]
            ),
        ]
    );
}

#[test]
fn member_dependents_only_count_that_member() {
    let analysis = analyze_all();

    let dependents = analysis
        .dependents("AbstractBase::BASE_CONSTANT")
        .expect("declared");

    assert_eq!(dependents.len(), 1);
    assert_eq!(dependents[0].symbol, "with_abstract");
    assert_eq!(dependents[0].kinds, vec![DependencyKind::ReadsClassConstant]);
}

#[test]
fn dependents_skip_the_seed_itself() {
    let analysis = analyze_all();

    let dependents = analysis.dependents("WithRecursiveMethods").expect("declared");

    assert!(dependents.is_empty());
}

#[test]
fn dependents_across_files() {
    let analysis = analyze_all();

    let symbols: Vec<_> = analysis
        .dependents("A")
        .expect("declared")
        .into_iter()
        .map(|d| d.symbol)
        .collect();

    assert_eq!(symbols, names(&["C", "IWithRequirement", "WithStaticProperty"]));
}

// === Cycles ===

#[test]
fn fixtures_have_only_self_loops() {
    let analysis = analyze_all();

    assert!(analysis.cycles(false).is_empty());

    let loops = analysis.cycles(true);
    assert!(loops.iter().all(|c| c.symbols.len() == 1));
    for name in ["recursive_function", "WithRecursiveMethods", "Derived"] {
        assert!(
            loops.contains(&Cycle {
                symbols: names(&[name])
            }),
            "{name} should be reported"
        );
    }
    assert!(loops.windows(2).all(|w| w[0].symbols <= w[1].symbols));
}

#[test]
fn mutual_recursion_is_one_cycle() {
    let calls = |name: &str, callee: &str| FunctionDecl {
        name: name.to_string(),
        body: vec![Stmt::expr(Expr::call(callee, Vec::new()))],
        ..FunctionDecl::default()
    };
    let file = SourceFile::new("mutual.php")
        .with(calls("ping", "pong"))
        .with(calls("pong", "ping"))
        .with(calls("entry", "ping"));

    let analysis = Analysis::build(&[file], &Config::default());

    assert_eq!(
        analysis.cycles(false),
        vec![Cycle {
            symbols: names(&["ping", "pong"])
        }]
    );
    assert_eq!(
        analysis.coarse_closure("ping").expect("declared").symbols,
        names(&["pong", "ping"])
    );
    assert_eq!(
        analysis.coarse_closure("entry").expect("declared").symbols,
        names(&["ping", "pong"])
    );
}

#[test]
fn cycles_report_members_as_a_set() {
    let calls = |name: &str, callee: &str| FunctionDecl {
        name: name.to_string(),
        body: vec![Stmt::expr(Expr::call(callee, Vec::new()))],
        ..FunctionDecl::default()
    };
    // Traversal order is c -> a -> b; the report is sorted
    let file = SourceFile::new("ring.php")
        .with(calls("c", "a"))
        .with(calls("a", "b"))
        .with(calls("b", "c"));

    let analysis = Analysis::build(&[file], &Config::default());
    let cycles = analysis.cycles(false);

    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].to_string(), "{a, b, c}");
    assert_eq!(
        serde_json::to_value(&cycles).expect("cycles serialize"),
        serde_json::json!([{ "symbols": ["a", "b", "c"] }])
    );
}

// === Statistics ===

#[test]
fn stats_count_symbols_and_edges() {
    let analysis = analyze_all_with_builtins();

    let stats = analysis.stats();

    assert_eq!(stats.symbols, analysis.table.len());
    assert_eq!(stats.symbols_by_kind.values().sum::<usize>(), stats.symbols);
    assert_eq!(stats.symbols_by_kind.get(&SymbolKind::Interface), Some(&2));
    assert_eq!(stats.symbols_by_kind.get(&SymbolKind::AbstractClass), Some(&2));
    assert_eq!(stats.edges, analysis.edge_records().len());
    assert_eq!(stats.edges_by_kind.values().sum::<usize>(), stats.edges);
    assert_eq!(stats.unresolved_edges, 1);
    assert_eq!(stats.external_edges, 5);
}
