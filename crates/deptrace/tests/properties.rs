//! Property tests for graph construction and closure queries.
//!
//! Programs are generated as small sets of classes `C0..Cn` and functions
//! `f0..fm` that reference each other at random, including through cycles,
//! inheritance loops and undeclared names.

use proptest::prelude::*;

use deptrace::ast::{
    ClassConstDecl, ClassDecl, Expr, FunctionDecl, Hint, MemberDecl, MethodDecl, Param,
    SourceFile, Stmt,
};
use deptrace::{Analysis, Config};

const MAX_CLASSES: usize = 6;
const MAX_FUNCTIONS: usize = 5;

/// A body reference, with indices taken modulo the declared counts.
#[derive(Debug, Clone)]
enum Ref {
    New(usize),
    Call(usize),
    StaticCall(usize),
    ConstRead(usize),
    Missing,
}

#[derive(Debug, Clone)]
struct ClassShape {
    parent: Option<usize>,
    const_hint: Option<usize>,
    params: Vec<usize>,
    body: Vec<Ref>,
}

#[derive(Debug, Clone)]
struct FunctionShape {
    params: Vec<usize>,
    body: Vec<Ref>,
}

#[derive(Debug, Clone)]
struct Program {
    classes: Vec<ClassShape>,
    functions: Vec<FunctionShape>,
}

fn arb_ref() -> impl Strategy<Value = Ref> {
    prop_oneof![
        (0..MAX_CLASSES).prop_map(Ref::New),
        (0..MAX_FUNCTIONS).prop_map(Ref::Call),
        (0..MAX_CLASSES).prop_map(Ref::StaticCall),
        (0..MAX_CLASSES).prop_map(Ref::ConstRead),
        Just(Ref::Missing),
    ]
}

fn arb_body() -> impl Strategy<Value = Vec<Ref>> {
    prop::collection::vec(arb_ref(), 0..4)
}

fn arb_params() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..MAX_CLASSES, 0..3)
}

fn arb_class() -> impl Strategy<Value = ClassShape> {
    (
        prop::option::of(0..MAX_CLASSES),
        prop::option::of(0..MAX_CLASSES),
        arb_params(),
        arb_body(),
    )
        .prop_map(|(parent, const_hint, params, body)| ClassShape {
            parent,
            const_hint,
            params,
            body,
        })
}

fn arb_function() -> impl Strategy<Value = FunctionShape> {
    (arb_params(), arb_body()).prop_map(|(params, body)| FunctionShape { params, body })
}

fn arb_program() -> impl Strategy<Value = Program> {
    (
        prop::collection::vec(arb_class(), 1..MAX_CLASSES),
        prop::collection::vec(arb_function(), 1..MAX_FUNCTIONS),
    )
        .prop_map(|(classes, functions)| Program { classes, functions })
}

impl Program {
    fn class_name(&self, idx: usize) -> String {
        format!("C{}", idx % self.classes.len())
    }

    fn function_name(&self, idx: usize) -> String {
        format!("f{}", idx % self.functions.len())
    }

    fn params(&self, classes: &[usize]) -> Vec<Param> {
        classes
            .iter()
            .enumerate()
            .map(|(i, class)| Param {
                name: format!("p{i}"),
                hint: Some(Hint::named(self.class_name(*class))),
                ..Param::default()
            })
            .collect()
    }

    fn body(&self, refs: &[Ref]) -> Vec<Stmt> {
        refs.iter()
            .map(|r| {
                Stmt::expr(match r {
                    Ref::New(c) => Expr::new_object(self.class_name(*c), Vec::new()),
                    Ref::Call(f) => Expr::call(self.function_name(*f), Vec::new()),
                    Ref::StaticCall(c) => Expr::static_call(self.class_name(*c), "m", Vec::new()),
                    Ref::ConstRead(c) => Expr::class_const(self.class_name(*c), "K"),
                    Ref::Missing => Expr::call("missing_function", Vec::new()),
                })
            })
            .collect()
    }

    fn source(&self) -> SourceFile {
        let mut file = SourceFile::new("generated.php");
        for (idx, class) in self.classes.iter().enumerate() {
            let members: Vec<MemberDecl> = vec![
                MethodDecl {
                    name: "m".to_string(),
                    params: self.params(&class.params),
                    body: Some(self.body(&class.body)),
                    ..MethodDecl::default()
                }
                .into(),
                ClassConstDecl {
                    name: "K".to_string(),
                    hint: class.const_hint.map(|c| Hint::named(self.class_name(c))),
                    value: Some(Expr::lit("1")),
                }
                .into(),
            ];
            file = file.with(ClassDecl {
                name: format!("C{idx}"),
                extends: class
                    .parent
                    .map(|p| Hint::named(self.class_name(p)))
                    .into_iter()
                    .collect(),
                members,
                ..ClassDecl::default()
            });
        }
        for (idx, function) in self.functions.iter().enumerate() {
            file = file.with(FunctionDecl {
                name: format!("f{idx}"),
                params: self.params(&function.params),
                body: self.body(&function.body),
                ..FunctionDecl::default()
            });
        }
        file
    }

    /// Every symbol and method seed.
    fn seeds(&self) -> Vec<String> {
        let classes = (0..self.classes.len()).flat_map(|i| [format!("C{i}"), format!("C{i}::m")]);
        let functions = (0..self.functions.len()).map(|i| format!("f{i}"));
        classes.chain(functions).collect()
    }

    fn symbols(&self) -> Vec<String> {
        (0..self.classes.len())
            .map(|i| format!("C{i}"))
            .chain((0..self.functions.len()).map(|i| format!("f{i}")))
            .collect()
    }
}

fn build(program: &Program, parallel: bool) -> Analysis {
    let config = Config {
        parallel,
        ..Config::default()
    };
    Analysis::build(&[program.source()], &config)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn fine_closure_is_subset_of_coarse(program in arb_program()) {
        let analysis = build(&program, false);

        for seed in program.seeds() {
            let fine = analysis.fine_closure(&seed).expect("generated seed exists");
            let coarse = analysis.coarse_closure(&seed).expect("generated seed exists");

            for symbol in &fine.symbols {
                prop_assert!(
                    coarse.symbols.contains(symbol),
                    "{} in fine but not coarse closure of {}", symbol, seed
                );
            }
            for name in &fine.unresolved {
                prop_assert!(coarse.unresolved.contains(name));
            }
        }
    }

    #[test]
    fn seed_is_in_its_closure_only_through_a_cycle(program in arb_program()) {
        let analysis = build(&program, false);
        let cycles = analysis.cycles(true);

        for seed in program.symbols() {
            let closure = analysis.coarse_closure(&seed).expect("generated seed exists");
            let in_cycle = cycles.iter().any(|c| c.symbols.contains(&seed));
            prop_assert_eq!(closure.symbols.contains(&seed), in_cycle, "seed {}", seed);
        }
    }

    #[test]
    fn closures_report_each_symbol_once(program in arb_program()) {
        let analysis = build(&program, false);

        for seed in program.seeds() {
            let closure = analysis.coarse_closure(&seed).expect("generated seed exists");
            let mut sorted = closure.symbols.clone();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(sorted.len(), closure.symbols.len());
        }
    }

    #[test]
    fn dependents_are_reverse_edges(program in arb_program()) {
        let analysis = build(&program, false);

        for seed in program.symbols() {
            for dependent in analysis.dependents(&seed).expect("generated seed exists") {
                let closure = analysis
                    .coarse_closure(&dependent.symbol)
                    .expect("dependent exists");
                prop_assert!(
                    closure.symbols.contains(&seed),
                    "{} depends on {} but does not reach it", dependent.symbol, seed
                );
            }
        }
    }

    #[test]
    fn build_is_deterministic(program in arb_program()) {
        let sequential = build(&program, false);
        let parallel = build(&program, true);
        let again = build(&program, true);

        prop_assert_eq!(sequential.edge_records(), parallel.edge_records());
        prop_assert_eq!(sequential.fingerprint(), parallel.fingerprint());
        prop_assert_eq!(parallel.fingerprint(), again.fingerprint());
        prop_assert_eq!(sequential.diagnostics.len(), parallel.diagnostics.len());
    }
}
