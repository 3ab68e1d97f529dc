/// MDL Tracer - Shows the flow through Source → Tree → Canonical MDL → Validation
///
/// Usage: cargo run --bin mdl_trace <mdl-file> [entry-rule]

use mdl_dsl::{parse_entry, serialize_parsed, EntryPoint, MdlConfig, Parsed, SchemaModel, Validator};
use std::fs;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mdl_dsl=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --bin mdl_trace <mdl-file> [entry-rule]");
        eprintln!();
        eprintln!("Example:");
        eprintln!("  MDL_SCHEMA_PATH=components.json cargo run --bin mdl_trace alter.mdl");
        eprintln!("  cargo run --bin mdl_trace attrs.mdl attributes");
        std::process::exit(1);
    }

    let path = &args[1];
    let entry = match args.get(2) {
        Some(rule) => match EntryPoint::from_rule_name(rule) {
            Some(entry) => entry,
            None => {
                let rules: Vec<&str> = EntryPoint::ALL.iter().map(|e| e.rule_name()).collect();
                eprintln!("❌ Unknown entry rule '{}'. Options are: {}", rule, rules.join(", "));
                std::process::exit(1);
            }
        },
        None => EntryPoint::MdlCommand,
    };

    println!("╔═══════════════════════════════════════════════════════════════");
    println!("║ MDL PARSER TRACER");
    println!("╚═══════════════════════════════════════════════════════════════\n");

    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ Failed to read {}: {}", path, e);
            std::process::exit(1);
        }
    };

    println!("📝 INPUT MDL ({}):", entry.rule_name());
    println!("{}", content);
    println!();

    let parsed = match parse_entry(entry, &content) {
        Ok(parsed) => parsed,
        Err(e) => {
            println!("❌ Parse error: {}", e);
            std::process::exit(2);
        }
    };

    println!("🌳 TREE:");
    println!("─────────────────────────────────────────────────────────────");
    println!("{:#?}", parsed);
    println!();

    println!("🔄 CANONICAL MDL:");
    println!("─────────────────────────────────────────────────────────────");
    println!("{}", serialize_parsed(&parsed));
    println!();

    let Parsed::Command(command) = parsed else {
        println!("✅ Parse succeeded!");
        return;
    };

    let config = match MdlConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    if config.schema_path.is_none() {
        println!("✅ Parse succeeded! (set MDL_SCHEMA_PATH to validate)");
        return;
    }

    println!("🔎 VALIDATION:");
    println!("─────────────────────────────────────────────────────────────");
    let schema = match SchemaModel::global() {
        Ok(schema) => schema,
        Err(e) => {
            println!("❌ Schema error: {}", e);
            std::process::exit(1);
        }
    };

    match Validator::from_config(schema, &config).run(&command) {
        Ok(()) => println!("✅ Valid against {} top-level component types", schema.len()),
        Err(violations) => {
            for violation in &violations {
                println!("❌ {}", violation);
            }
            std::process::exit(3);
        }
    }
}
