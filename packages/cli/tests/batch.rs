//! Tests for batch minting and the token artifacts it writes

use chrono::{DateTime, Utc};
use clap::Parser;
use ledger_jwt::{verify_token, KeyMaterial, TokenSigner, VerifyingKey};
use ledger_jwt_cli::output::{export_lines, export_var_name, render_script};
use ledger_jwt_cli::{mint_batch, run, BatchError, BatchFile, Cli, KeySource, SigningConfig};
use std::collections::BTreeMap;
use std::path::Path;

const BATCH_JSON: &str = r#"{
  "application_id": "rwa-json-api",
  "issuer": "rwa-platform",
  "expiry_seconds": 86400,
  "parties": {
    "bank": "Bank::1220ab",
    "alice": "Alice::1220ab",
    "bob": "Bob::1220ab"
  },
  "tokens": {
    "bank": ["bank"],
    "alice": ["alice"],
    "bank_alice": ["bank", "alice"],
    "bank_bob": ["bank", "bob"]
  }
}"#;

fn fixed_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
}

fn hs256_config() -> SigningConfig {
    SigningConfig {
        algorithm: ledger_jwt::Algorithm::Hs256,
        key: KeySource::Secret("development-secret".to_string().into()),
        ledger_id: "participant1".to_string(),
        application_id: "json-api".to_string(),
        issuer: None,
        expiry_seconds: None,
    }
}

fn hs256_signer() -> TokenSigner {
    TokenSigner::new(KeyMaterial::secret("development-secret").expect("secret accepted"))
}

fn run_batch(dir: &Path, batch_json: &str, print: bool) -> anyhow::Result<String> {
    let config = dir.join("batch.json");
    std::fs::write(&config, batch_json).expect("write batch file");

    let config = config.to_str().expect("utf-8 path").to_string();
    let out = dir.join("jwt-tokens.json").to_str().expect("utf-8 path").to_string();
    let script = dir.join("load_jwt_tokens.sh").to_str().expect("utf-8 path").to_string();

    let mut args = vec![
        "ledger-jwt",
        "--algorithm",
        "hs256",
        "--secret",
        "development-secret",
        "batch",
        "--config",
        config.as_str(),
        "--out",
        out.as_str(),
        "--script",
        script.as_str(),
    ];
    if print {
        args.push("--print");
    }

    let cli = Cli::try_parse_from(args)?;
    let mut stdout = Vec::new();
    run(cli, &mut stdout)?;
    Ok(String::from_utf8(stdout)?)
}

#[test]
fn test_batch_writes_json_and_script() {
    let dir = tempfile::tempdir().expect("temp dir");
    run_batch(dir.path(), BATCH_JSON, false).expect("batch succeeds");

    let json = std::fs::read_to_string(dir.path().join("jwt-tokens.json")).expect("json written");
    let tokens: BTreeMap<String, String> = serde_json::from_str(&json).expect("valid JSON");
    assert_eq!(
        tokens.keys().map(String::as_str).collect::<Vec<_>>(),
        ["alice", "bank", "bank_alice", "bank_bob"]
    );

    let key = VerifyingKey::secret("development-secret").expect("secret accepted");
    let bank_bob = verify_token(&tokens["bank_bob"], &key).expect("signature valid");
    assert_eq!(
        bank_bob.claims.act_as(),
        ["Bank::1220ab".to_string(), "Bob::1220ab".to_string()]
    );
    assert_eq!(bank_bob.claims.iss.as_deref(), Some("rwa-platform"));
    let ledger_api = bank_bob.claims.ledger_api.expect("custom claim");
    assert_eq!(ledger_api.application_id, "rwa-json-api");
    assert_eq!(ledger_api.ledger_id, "participant1");
    assert_eq!(
        bank_bob.claims.exp.zip(bank_bob.claims.iat).map(|(exp, iat)| exp - iat),
        Some(86_400)
    );

    let script_path = dir.path().join("load_jwt_tokens.sh");
    let script = std::fs::read_to_string(&script_path).expect("script written");
    assert!(script.starts_with("#!/bin/bash\n"));
    assert!(script.contains(&format!("export BANK_ALICE_TOKEN=\"{}\"\n", tokens["bank_alice"])));
    assert!(script.contains("echo \"Available tokens: ALICE_TOKEN, BANK_TOKEN, BANK_ALICE_TOKEN, BANK_BOB_TOKEN\""));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&script_path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}

#[test]
fn test_batch_print_echoes_exports() {
    let dir = tempfile::tempdir().expect("temp dir");
    let stdout = run_batch(dir.path(), BATCH_JSON, true).expect("batch succeeds");

    assert!(stdout.starts_with("Minted 4 tokens"));
    let exports: Vec<&str> = stdout.lines().filter(|l| l.starts_with("export ")).collect();
    assert_eq!(exports.len(), 4);
    assert!(exports[0].starts_with("export ALICE_TOKEN=\"eyJ"));
}

#[test]
fn test_unknown_alias_writes_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let batch = r#"{
      "parties": { "bank": "Bank::1220ab" },
      "tokens": { "bank": ["bank"], "bank_carol": ["bank", "carol"] }
    }"#;

    let err = run_batch(dir.path(), batch, false).expect_err("unknown alias must fail");

    match err.downcast_ref::<BatchError>() {
        Some(BatchError::UnknownAlias { token, alias }) => {
            assert_eq!(token, "bank_carol");
            assert_eq!(alias, "carol");
        }
        other => panic!("expected UnknownAlias, got {other:?}"),
    }
    assert!(!dir.path().join("jwt-tokens.json").exists());
    assert!(!dir.path().join("load_jwt_tokens.sh").exists());
}

#[test]
fn test_token_without_aliases_fails_whole_batch() {
    let batch = BatchFile::from_json(
        r#"{ "parties": { "bank": "Bank::1220ab" }, "tokens": { "bank": ["bank"], "nobody": [] } }"#,
    )
    .expect("batch parses");

    let err = mint_batch(&batch, &hs256_config(), &hs256_signer(), fixed_now())
        .expect_err("empty token set must fail");

    match err {
        BatchError::Mint { token, source } => {
            assert_eq!(token, "nobody");
            assert!(matches!(source, ledger_jwt::JwtError::InvalidInput(_)));
        }
        other => panic!("expected Mint error, got {other:?}"),
    }
}

#[test]
fn test_empty_batch_rejected() {
    let batch = BatchFile::from_json(r#"{ "tokens": {} }"#).expect("batch parses");

    assert!(matches!(
        mint_batch(&batch, &hs256_config(), &hs256_signer(), fixed_now()),
        Err(BatchError::Empty)
    ));
}

#[test]
fn test_mint_batch_is_deterministic_for_fixed_clock() {
    let batch = BatchFile::from_json(BATCH_JSON).expect("batch parses");
    let config = hs256_config().with_batch_overrides(&batch);

    let first = mint_batch(&batch, &config, &hs256_signer(), fixed_now()).expect("mints");
    let second = mint_batch(&batch, &config, &hs256_signer(), fixed_now()).expect("mints");

    assert_eq!(first, second);
    assert_eq!(config.application_id, "rwa-json-api");
    assert_eq!(config.expiry_seconds, Some(86_400));
}

#[test]
fn test_batch_file_rejects_unknown_fields() {
    assert!(BatchFile::from_json(r#"{ "tokens": {}, "secret": "leak" }"#).is_err());
    assert!(BatchFile::from_json(r#"{ "parties": {} }"#).is_err());
}

#[test]
fn test_missing_batch_file_reports_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = BatchFile::load(&dir.path().join("absent.json")).expect_err("must fail");

    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn test_export_var_names() {
    assert_eq!(export_var_name("bank"), "BANK_TOKEN");
    assert_eq!(export_var_name("bank_alice"), "BANK_ALICE_TOKEN");
    assert_eq!(export_var_name("bank-bob.v2"), "BANK_BOB_V2_TOKEN");
}

#[test]
fn test_rendered_script_layout() {
    let tokens = BTreeMap::from([
        ("bank".to_string(), "t.b.s".to_string()),
        ("alice".to_string(), "t.a.s".to_string()),
    ]);

    assert_eq!(
        export_lines(&tokens),
        ["export ALICE_TOKEN=\"t.a.s\"", "export BANK_TOKEN=\"t.b.s\""]
    );
    assert_eq!(
        render_script(&tokens, fixed_now()),
        "#!/bin/bash\n\
         # Ledger API JWT tokens\n\
         # Generated on 2023-11-14 22:13:20 UTC\n\
         \n\
         export ALICE_TOKEN=\"t.a.s\"\n\
         export BANK_TOKEN=\"t.b.s\"\n\
         \n\
         echo \"Ledger API JWT tokens loaded into environment\"\n\
         echo \"Available tokens: ALICE_TOKEN, BANK_TOKEN\"\n"
    );
}

#[test]
fn test_names_sharing_a_variable_rejected() {
    let batch = BatchFile::from_json(
        r#"{
          "parties": { "a": "A::1", "b": "B::1" },
          "tokens": { "bank-alice": ["a"], "bank_alice": ["b"] }
        }"#,
    )
    .expect("batch parses");

    match mint_batch(&batch, &hs256_config(), &hs256_signer(), fixed_now()) {
        Err(BatchError::VariableCollision {
            first,
            second,
            variable,
        }) => {
            assert_eq!(first, "bank-alice");
            assert_eq!(second, "bank_alice");
            assert_eq!(variable, "BANK_ALICE_TOKEN");
        }
        other => panic!("expected VariableCollision, got {other:?}"),
    }
}

#[test]
fn test_name_with_leading_digit_rejected() {
    let batch = BatchFile::from_json(
        r#"{ "parties": { "a": "A::1" }, "tokens": { "2fa": ["a"], "bank": ["a"] } }"#,
    )
    .expect("batch parses");

    match mint_batch(&batch, &hs256_config(), &hs256_signer(), fixed_now()) {
        Err(BatchError::InvalidVariable { token, variable }) => {
            assert_eq!(token, "2fa");
            assert_eq!(variable, "2FA_TOKEN");
        }
        other => panic!("expected InvalidVariable, got {other:?}"),
    }
}

#[test]
fn test_colliding_names_write_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let batch = r#"{
      "parties": { "a": "A::1", "b": "B::1" },
      "tokens": { "bank-alice": ["a"], "bank_alice": ["b"] }
    }"#;

    let err = run_batch(dir.path(), batch, false).expect_err("collision must fail");

    assert!(matches!(
        err.downcast_ref::<BatchError>(),
        Some(BatchError::VariableCollision { .. })
    ));
    assert!(!dir.path().join("jwt-tokens.json").exists());
    assert!(!dir.path().join("load_jwt_tokens.sh").exists());
}

#[test]
fn test_failed_script_write_leaves_no_token_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = dir.path().join("batch.json");
    std::fs::write(&config, BATCH_JSON).expect("write batch file");
    let out = dir.path().join("jwt-tokens.json");
    let script = dir.path().join("missing").join("load_jwt_tokens.sh");

    let cli = Cli::try_parse_from([
        "ledger-jwt",
        "--algorithm",
        "hs256",
        "--secret",
        "development-secret",
        "batch",
        "--config",
        config.to_str().expect("utf-8 path"),
        "--out",
        out.to_str().expect("utf-8 path"),
        "--script",
        script.to_str().expect("utf-8 path"),
    ])
    .expect("arguments parse");

    let mut stdout = Vec::new();
    assert!(run(cli, &mut stdout).is_err());
    assert!(stdout.is_empty());
    assert!(!out.exists());

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .expect("dir readable")
        .map(|entry| entry.expect("entry").file_name())
        .collect();
    assert_eq!(entries, [std::ffi::OsString::from("batch.json")]);
}
