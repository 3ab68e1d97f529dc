use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mdl_dsl::{parse_command, serialize_command, SchemaModel, Validator};

const MDL_ALTER: &str = r#"
ALTER Object product__v (
    label('Product'),
    active(true),
    list_column ADD ('name__v', 'status__v'),
    ADD Field color__c (
        label('Color'),
        type('Picklist'),
        max_length(40)
    );
    MODIFY Field name__v (
        label('Name')
    );
    DROP Field legacy__c;
    RENAME Field old__c TO new__c;
)
"#;

const SCHEMA: &str = r#"{
    "Object": {
        "attributes": {
            "label": {"type_data": "Type : String\nMaximum length : 40"},
            "active": {"type_data": "Type : Boolean"},
            "list_column": {"type_data": "Type : String\nAllows multiple values"}
        },
        "subcomponents": {
            "Field": {
                "attributes": {
                    "label": {"type_data": "Type : String\nMaximum length : 40"},
                    "type": {"type_data": "Type : Enum\nAllowed values : String|Number|Picklist"},
                    "max_length": {"type_data": "Type : Number\nMinimum value : 1\nMaximum value : 1500"}
                }
            }
        }
    }
}"#;

fn bench_parse(c: &mut Criterion) {
    c.bench_function("mdl/parse_alter", |b| {
        b.iter(|| {
            let command = parse_command(black_box(MDL_ALTER)).expect("parse MDL");
            black_box(command.subcommands.map(|s| s.len()));
        });
    });
}

fn bench_serialize(c: &mut Criterion) {
    let command = parse_command(MDL_ALTER).expect("parse MDL");
    c.bench_function("mdl/serialize_alter", |b| {
        b.iter(|| black_box(serialize_command(black_box(&command))));
    });
}

fn bench_validate(c: &mut Criterion) {
    let schema = SchemaModel::from_json_str(SCHEMA).expect("load schema");
    let command = parse_command(MDL_ALTER).expect("parse MDL");
    let validator = Validator::new(&schema);

    c.bench_function("mdl/validate_alter", |b| {
        b.iter(|| {
            validator.validate(black_box(&command)).expect("valid MDL");
        });
    });
}

criterion_group!(benches, bench_parse, bench_serialize, bench_validate);
criterion_main!(benches);
