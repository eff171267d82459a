use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tinyrule::{CompiledFormula, CompiledRule, MathEngine, ParseNode, Rule, RuleEngine, Schema};

struct Car {
    year: i64,
    make: String,
}

struct Circuit {
    l: f64,
    c: f64,
}

fn car_schema() -> Schema<Car> {
    Schema::builder("CarDTO")
        .int("Year", |c: &Car| c.year)
        .string("Make", |c: &Car| c.make.clone())
        .build()
}

/// A predicate ORing `n` leaf tests, none of which match the bench subject,
/// so evaluation walks the whole tree.
fn build_predicate(n: usize) -> CompiledRule<Car> {
    let mut engine = RuleEngine::new(car_schema());
    let mut pred = engine
        .expression(&Rule::new("Year", "0", "Equal"))
        .unwrap();
    for i in 1..n {
        pred = pred.or(engine
            .expression(&Rule::new("Year", &i.to_string(), "Equal"))
            .unwrap());
    }
    engine.load("wide", pred).unwrap();
    engine.compile("wide").unwrap()
}

fn value(item: &str) -> ParseNode {
    ParseNode::element("value").attr("item", item)
}

// 1 / (2 * pi * sqrt(L * C))
fn build_formula() -> CompiledFormula<Circuit> {
    let schema = Schema::builder("CircuitDTO")
        .float("InductanceInHenries", |s: &Circuit| s.l)
        .float("CapacitanceInFarads", |s: &Circuit| s.c)
        .build();
    let doc = ParseNode::element("mathexps").child(
        ParseNode::element("mathexp")
            .attr("name", "resonant")
            .attr("appliesto", "CircuitDTO")
            .child(
                ParseNode::element("divide").child(value("@1")).child(
                    ParseNode::element("multiply")
                        .child(
                            ParseNode::element("multiply")
                                .child(value("@@2"))
                                .child(value("@Pi")),
                        )
                        .child(
                            ParseNode::element("sqrt").child(
                                ParseNode::element("multiply")
                                    .child(value("InductanceInHenries"))
                                    .child(value("CapacitanceInFarads")),
                            ),
                        ),
                ),
            ),
    );
    let mut engine = MathEngine::new(schema);
    engine.load_from_nodes(&doc, "/mathexps/mathexp").unwrap();
    engine.compile("resonant").unwrap()
}

fn bench_predicate(c: &mut Criterion) {
    let mut group = c.benchmark_group("predicate_eval");

    let subject = Car {
        year: -1,
        make: "Ford".to_owned(),
    };
    for &n in &[5, 20, 50] {
        let compiled = build_predicate(n);
        group.bench_function(&format!("{n}_leaves"), |b| {
            b.iter(|| compiled.matches(black_box(&subject)));
        });
    }

    group.finish();
}

fn bench_formula(c: &mut Criterion) {
    let mut group = c.benchmark_group("formula_eval");

    let compiled = build_formula();
    let subject = Circuit {
        l: 0.1,
        c: 0.00001,
    };
    group.bench_function("resonant_frequency", |b| {
        b.iter(|| compiled.evaluate(black_box(&subject)));
    });

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("expression_build");

    for &n in &[5, 20, 50] {
        group.bench_function(&format!("{n}_leaves"), |b| {
            b.iter(|| black_box(build_predicate(n)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_predicate, bench_formula, bench_build);
criterion_main!(benches);
