use tinyrule::{Rule, RuleEngine, Schema};

struct Car {
    year: i64,
    make: String,
}

fn main() {
    let schema = Schema::builder("CarDTO")
        .int("Year", |c: &Car| c.year)
        .string("Make", |c: &Car| c.make.clone())
        .build();
    let mut engine = RuleEngine::new(schema);

    // Build a predicate from rule descriptors and combinators
    let rule = engine
        .expression(&Rule::new("Make", "Ford", "Equal"))
        .expect("failed to build leaf")
        .or(engine
            .expression(&Rule::new("Year", "2010", "GreaterThanOrEqual"))
            .expect("failed to build leaf"));

    println!("{rule}");

    engine.load("FordOrRecent", rule).expect("duplicate key");
    let compiled = engine.compile("FordOrRecent").expect("unknown key");

    let subjects = [
        Car {
            year: 2005,
            make: "Ford".to_owned(),
        },
        Car {
            year: 2012,
            make: "Honda".to_owned(),
        },
        Car {
            year: 2005,
            make: "Honda".to_owned(),
        },
    ];
    for car in &subjects {
        println!(
            "{} {} -> {}",
            car.year,
            car.make,
            compiled.matches(car)
        );
    }
}
