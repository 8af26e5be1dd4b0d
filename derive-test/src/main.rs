use argsnip::Schema;

fn main() {
    let data = r#"
    {
        "name": "derive-test",
        "description": "example using serde",
        "positionals": [{
            "name": "file",
            "description": "file to read",
            "required": true
        }, {
            "value_kind": "Integer"
        }],
        "options": [{
            "short_name": "v",
            "long_name": "verbose",
            "description": "print more"
        }, {
            "long_name": "ratio",
            "value_kind": "Float",
            "needs_value": true
        }]
    }"#;

    let schema: Schema = match serde_json::from_str(data) {
        Ok(schema) => schema,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    let results = schema.parse_env();
    println!("{}", serde_json::to_string_pretty(&results).unwrap_or_default());
}
