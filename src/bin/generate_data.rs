use std::path::Path;

use latency_benchmark::data_generator::{self, GeneratorVariant};

fn main() {
    let project_root = env!("CARGO_MANIFEST_DIR");
    let records = 10_000;
    let outputs = [
        ("users.json", GeneratorVariant::Standard),
        ("users_di.json", GeneratorVariant::FixedInstants),
    ];

    for (file_name, variant) in outputs {
        let path = Path::new(project_root).join("test_data").join(file_name);
        match data_generator::generate_and_save_data(&path, records, variant) {
            Ok(()) => println!("Generated {} records into {}", records, path.display()),
            Err(e) => eprintln!("Failed to generate {}: {}", path.display(), e),
        }
    }
}
