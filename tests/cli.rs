//! Lives outside `src/tests/` because only integration tests are given
//! `CARGO_BIN_EXE_forestgen`, the path of the built binary.

use std::process::Command;

fn forestgen(path: &std::path::Path) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_forestgen"))
        .arg(path)
        .output()
        .unwrap()
}

#[test]
fn writes_generated_source_to_stdout() {
    let spec = "use engine::*;\n%%\nS ::= A {{ $$ = $0; }}\nA ~ \"a\"\n%%\nfn main() {}\n";
    let file = temp_file::with_contents(spec.as_bytes());
    let output = forestgen(file.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("use engine::*;\n"), "{}", stdout);
    assert!(stdout.contains("        stack[v.result] = stack[v.arg_0];\n"), "{}", stdout);
    assert!(stdout.ends_with("\nfn main() {}\n"), "{}", stdout);
    assert_eq!(stdout, forestgen::compile(spec).unwrap().to_string());
}

#[test]
fn failures_print_nothing_to_stdout() {
    let file = temp_file::with_contents(b"%% S ::= A\nnull ::= B %%");
    let output = forestgen(file.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.starts_with("forestgen: at offset 11:"), "{}", stderr);
}

#[test]
fn missing_file_is_reported() {
    let dir = temp_dir::TempDir::new().unwrap();
    let output = forestgen(&dir.path().join("absent.grammar"));
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("absent.grammar"));
}
