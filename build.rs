use std::io::Write;

fn main() {
    let out_dir = std::env::var("OUT_DIR").unwrap();
    let test_file = std::path::Path::new(&out_dir).join("generated_tests.rs");
    let mut f = std::fs::File::create(&test_file).unwrap();

    let files = std::fs::read_dir("tests/data")
        .unwrap()
        .map(|entry| entry.unwrap().path());

    println!("cargo:rerun-if-changed=tests/data");

    for file in files {
        let scenario_file = file.canonicalize().unwrap();
        let scenario_name = file.file_stem().and_then(|e| e.to_str()).unwrap().to_owned();

        write!(
            f,
            "
#[test]
fn {name}_test() {{
    let cases = include_str!(\"{scenario_file}\");
    run_test(\"{name}\", cases);
}}",
            name = scenario_name,
            scenario_file = scenario_file.display()
        )
        .unwrap();
    }
}
