use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use schema_pipeline::{FieldType, Parser, Schema};

fn config_schemas() -> Vec<Schema> {
    vec![
        Schema::record("Config").field("entries", FieldType::list(FieldType::structure("Entry")), "{ @@ }"),
        Schema::union("Entry")
            .variant("attribute", FieldType::structure("Attribute"), "@@")
            .variant("group", FieldType::structure("Group"), "| @@"),
        Schema::record("Attribute")
            .field("key", FieldType::String, r#"@Ident "=""#)
            .field("value", FieldType::String, "@(String | Int | Float | Ident)"),
        Schema::record("Group")
            .field("name", FieldType::String, r#"@Ident "{""#)
            .field("entries", FieldType::list(FieldType::structure("Entry")), r#"{ @@ } "}""#),
    ]
}

fn generate_config(size_kb: usize) -> String {
    let mut s = String::with_capacity(size_kb * 1024);
    let mut n = 0;
    while s.len() < size_kb * 1024 {
        s.push_str(&format!("service_{n} {{\n"));
        s.push_str("    host = \"localhost\"\n    port = 8080\n");
        s.push_str("    limits {\n        rate = 0.5\n        burst = 20\n    }\n");
        s.push_str("}\n");
        s.push_str(&format!("flag_{n} = on\n"));
        n += 1;
    }
    s
}

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile_config_schema", |b| {
        b.iter(|| {
            Parser::builder()
                .schemas(config_schemas())
                .build(black_box("Config"))
                .unwrap()
        })
    });
}

fn bench_parse(c: &mut Criterion) {
    let parser = Parser::builder().schemas(config_schemas()).build("Config").unwrap();
    let mut group = c.benchmark_group("parse");

    for size_kb in [10, 100] {
        let input = generate_config(size_kb);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_function(format!("config_{size_kb}kb"), |b| {
            b.iter(|| parser.parse_str(black_box(&input)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compile, bench_parse);
criterion_main!(benches);
