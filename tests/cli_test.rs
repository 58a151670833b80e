//! CLI integration tests for the jsmn-forge binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("jsmn-forge"))
}

// Helper to create a temp document
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

mod normalize_command {
    use super::*;

    #[test]
    fn sorts_and_rewrites() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(
            &dir,
            "api.yaml",
            r#"
components:
  schemas:
    Pet:
      required: [name, id]
      properties:
        owner:
          $ref: forge://sdk/common/v0#/components/schemas/Owner
"#,
        );

        cmd()
            .args(["normalize", doc.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""required":["id","name"]"#))
            .stdout(predicate::str::contains(
                r##""$ref":"./sdk.openapi.yaml#/components/schemas/Owner""##,
            ));
    }

    #[test]
    fn custom_scheme_and_extension() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(
            &dir,
            "api.yaml",
            "components: {schemas: {A: {$ref: 'acme://sdk/common/v0#/B'}}}",
        );

        cmd()
            .args([
                "normalize",
                doc.to_str().unwrap(),
                "--scheme",
                "acme",
                "--extension",
                "ext",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r##""./sdk.ext#/B""##));
    }

    #[test]
    fn yaml_output() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.yaml", r#"{"info": {"title": "t"}}"#);

        cmd()
            .args(["normalize", doc.to_str().unwrap(), "--format", "yaml"])
            .assert()
            .success()
            .stdout(predicate::str::contains("info:\n  title: t"));
    }

    #[test]
    fn pretty_output_to_file() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.yaml", "info: {title: t}");
        let out = dir.path().join("out.json");

        cmd()
            .args([
                "normalize",
                doc.to_str().unwrap(),
                "--pretty",
                "--output",
                out.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());

        let written = fs::read_to_string(&out).unwrap();
        assert!(written.contains("{\n"));
    }

    #[test]
    fn missing_file_exit_code() {
        cmd()
            .args(["normalize", "/nonexistent/api.yaml"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("file not found"));
    }

    #[test]
    fn invalid_yaml_exit_code() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.yaml", "a: [1, 2");

        cmd()
            .args(["normalize", doc.to_str().unwrap()])
            .assert()
            .code(2);
    }
}

mod join_command {
    use super::*;

    #[test]
    fn merges_and_reports_conflicts() {
        let dir = TempDir::new().unwrap();
        let a = write_temp_file(&dir, "a.yaml", "info: {title: A}\npaths: {/a: {}}");
        let b = write_temp_file(&dir, "b.yaml", "info: {title: B}\npaths: {/b: {}}");

        cmd()
            .args(["join", a.to_str().unwrap(), b.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""title":"A""#))
            .stdout(predicate::str::contains(r#""/b":{}"#))
            .stderr(predicate::str::contains(
                r#"at /info/title: destination "A", source "B""#,
            ));
    }

    #[test]
    fn missing_input_still_joins_the_rest() {
        let dir = TempDir::new().unwrap();
        let a = write_temp_file(&dir, "a.yaml", "info: {title: A}");

        cmd()
            .args(["join", a.to_str().unwrap(), "/nonexistent/b.yaml"])
            .assert()
            .code(3)
            .stdout(predicate::str::contains(r#""title":"A""#))
            .stderr(predicate::str::contains("file not found"));
    }

    #[test]
    fn requires_input() {
        cmd().arg("join").assert().failure();
    }
}

mod diff_command {
    use super::*;

    #[test]
    fn identical_documents() {
        let dir = TempDir::new().unwrap();
        let a = write_temp_file(&dir, "a.yaml", "info: {title: A}");

        cmd()
            .args(["diff", a.to_str().unwrap(), a.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());
    }

    #[test]
    fn differences_exit_one() {
        let dir = TempDir::new().unwrap();
        let a = write_temp_file(&dir, "a.yaml", "a: 1");
        let b = write_temp_file(&dir, "b.yaml", "b: 2");

        cmd()
            .args(["diff", a.to_str().unwrap(), b.to_str().unwrap()])
            .assert()
            .code(1)
            .stdout(predicate::str::contains(r#""/a":{"kind":"missing","value":1}"#))
            .stdout(predicate::str::contains(r#""/b":{"kind":"extra","value":2}"#));
    }

    #[test]
    fn nested_locations_render_as_pointers() {
        let dir = TempDir::new().unwrap();
        let a = write_temp_file(&dir, "a.yaml", "info: {title: A, version: 1}");
        let b = write_temp_file(&dir, "b.yaml", "info: {title: B, version: 1}");

        cmd()
            .args(["diff", a.to_str().unwrap(), b.to_str().unwrap()])
            .assert()
            .code(1)
            .stdout(predicate::str::contains(
                r#"{"/info/title":{"kind":"mismatch","left":"A","right":"B"}}"#,
            ));
    }

    #[test]
    fn normalize_flag_ignores_set_order() {
        let dir = TempDir::new().unwrap();
        let a = write_temp_file(
            &dir,
            "a.yaml",
            "components: {schemas: {S: {required: [a, b]}}}",
        );
        let b = write_temp_file(
            &dir,
            "b.yaml",
            "components: {schemas: {S: {required: [b, a]}}}",
        );

        cmd()
            .args(["diff", a.to_str().unwrap(), b.to_str().unwrap()])
            .assert()
            .code(1);

        cmd()
            .args([
                "diff",
                a.to_str().unwrap(),
                b.to_str().unwrap(),
                "--normalize",
            ])
            .assert()
            .success();
    }
}

mod flatten_command {
    use super::*;

    #[test]
    fn emits_structs() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(
            &dir,
            "api.yaml",
            r#"
components:
  schemas:
    point:
      type: object
      required: [x]
      properties:
        x: {type: integer, format: int16}
"#,
        );

        cmd()
            .args(["flatten", doc.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""name":"point""#))
            .stdout(predicate::str::contains(r#""location":"/components/schemas/point""#))
            .stdout(predicate::str::contains(r#""errors":[]"#));
    }

    #[test]
    fn schema_errors_exit_one() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(
            &dir,
            "api.yaml",
            "components: {schemas: {s: {type: object, properties: {t: {type: string}}}}}",
        );

        cmd()
            .args(["flatten", doc.to_str().unwrap()])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("string without maxLength"));
    }

    #[test]
    fn json_schema_grammar() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(
            &dir,
            "schema.json",
            r#"{"$defs": {"flag": {"type": "object", "properties": {"on": {"type": "boolean"}}}}}"#,
        );

        cmd()
            .args(["flatten", doc.to_str().unwrap(), "--grammar", "json-schema"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""location":"/$defs/flag""#));
    }
}

mod discover_command {
    use super::*;

    #[test]
    fn lists_registered_documents() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("sdk");
        fs::create_dir(&root).unwrap();
        fs::write(
            root.join("jsmn-forge.yaml"),
            "resources:\n  - name: common\n    version: 0\n    openapi: [common.yaml]",
        )
        .unwrap();
        fs::write(root.join("common.yaml"), "paths: {}").unwrap();

        cmd()
            .args(["discover", root.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""id":"forge://sdk/common/v0""#));
    }

    #[test]
    fn workspace_errors_exit_one() {
        let dir = TempDir::new().unwrap();

        cmd()
            .args(["discover", dir.path().to_str().unwrap()])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("no jsmn-forge config found"));
    }
}

mod logging {
    use super::*;

    #[test]
    fn verbose_logs_to_stderr() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.yaml", "info: {title: t}");

        cmd()
            .args(["--verbose", "join", doc.to_str().unwrap()])
            .assert()
            .success()
            .stderr(predicate::str::contains("normalized document"));
    }
}
