use tinyrule::{MathEngine, RuleEngine, Schema};

struct Car {
    year: i64,
    make: String,
}

struct Circuit {
    inductance: f64,
    capacitance: f64,
}

const RULES: &str = r#"
<rules>
  <rule name="FordOrRecent" appliesto="CarDTO">
    <or>
      <ruleitem membername="Make" targetvalue="Ford" operator="Equal"/>
      <ruleitem membername="Year" targetvalue="2010" operator="GreaterThanOrEqual"/>
    </or>
  </rule>
</rules>
"#;

const FORMULAS: &str = r#"
<mathexps>
  <mathexp name="ResonantFrequency" appliesto="CircuitDTO">
    <divide>
      <value item="@1"/>
      <multiply>
        <multiply>
          <value item="@@2"/>
          <value item="@Pi"/>
        </multiply>
        <sqrt>
          <multiply>
            <value item="InductanceInHenries"/>
            <value item="CapacitanceInFarads"/>
          </multiply>
        </sqrt>
      </multiply>
    </divide>
  </mathexp>
</mathexps>
"#;

fn main() {
    let car_schema = Schema::builder("CarDTO")
        .int("Year", |c: &Car| c.year)
        .string("Make", |c: &Car| c.make.clone())
        .build();
    let mut rules = RuleEngine::new(car_schema);
    rules
        .load_from_markup(RULES, "/rules/rule")
        .expect("failed to load rules");

    let ford = Car {
        year: 2005,
        make: "Ford".to_owned(),
    };
    let rule = rules.get("FordOrRecent").expect("unknown key");
    println!("{rule}");
    println!("matches 2005 Ford: {}", rule.matches(&ford));

    let circuit_schema = Schema::builder("CircuitDTO")
        .float("InductanceInHenries", |c: &Circuit| c.inductance)
        .float("CapacitanceInFarads", |c: &Circuit| c.capacitance)
        .build();
    let mut formulas = MathEngine::new(circuit_schema);
    formulas
        .load_from_markup(FORMULAS, "/mathexps/mathexp")
        .expect("failed to load formulas");

    let tank = Circuit {
        inductance: 0.1,
        capacitance: 0.00001,
    };
    let frequency = formulas
        .compile("ResonantFrequency")
        .expect("unknown key")
        .evaluate(&tank);
    println!("resonant frequency: {frequency:.1} Hz");
}
