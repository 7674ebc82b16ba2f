//! End-to-end tests for the recibo binary.

use assert_cmd::Command;
use predicates::prelude::*;

const WILL_BANK_TEXT: &str = "\
Comprovante Pix - Will Bank
R$ 33,00
Para Ana Cleuma Sousa Dos Santos
CPF/CNPJ ***.120.983-**
De Antonio Valmi Passos Da Rocha
20/05/2025
17:51:22
";

#[test]
fn process_outputs_canonical_record() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("antonio.txt");
    std::fs::write(&input, WILL_BANK_TEXT).unwrap();

    Command::cargo_bin("recibo")
        .unwrap()
        .arg("process")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("id_transacao"))
        .stdout(predicate::str::contains("Ana Cleuma Sousa Dos Santos"))
        .stdout(predicate::str::contains("R$ 33,00"));
}

#[test]
fn process_text_format() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("antonio.txt");
    std::fs::write(&input, WILL_BANK_TEXT).unwrap();

    Command::cargo_bin("recibo")
        .unwrap()
        .args(["process", "--format", "text"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Layout: Will Bank"))
        .stdout(predicate::str::contains("Payee:"));
}

#[test]
fn process_missing_file_fails() {
    Command::cargo_bin("recibo")
        .unwrap()
        .args(["process", "nao_existe.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn batch_writes_both_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), WILL_BANK_TEXT).unwrap();
    std::fs::write(dir.path().join("b.txt"), "Santander\nValor: R$ 120,00\n").unwrap();
    std::fs::write(dir.path().join("vazio.txt"), "   \n").unwrap();

    let out = dir.path().join("processed");
    let pattern = format!("{}/*.txt", dir.path().display());

    Command::cargo_bin("recibo")
        .unwrap()
        .args(["batch", &pattern, "--output-dir"])
        .arg(&out)
        .assert()
        .success();

    let report: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(out.join("comprovantes_estruturados.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(report["metadata"]["total_processados"], 3);
    assert_eq!(report["metadata"]["com_erro"], 1);

    let export: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(out.join("dados_chatbot.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(export["metadata"]["total_transacoes"], 2);
    assert!(export["indices_busca"]["por_banco"].get("Will Bank").is_some());
}

#[test]
fn batch_with_no_matches_fails() {
    Command::cargo_bin("recibo")
        .unwrap()
        .args(["batch", "/tmp/definitely-missing-*.txt"])
        .assert()
        .failure();
}
