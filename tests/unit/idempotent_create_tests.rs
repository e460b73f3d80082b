//! Tests for idempotent CREATE/ALTER rewriting

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;

use rust_sqlrewriter::{IdempotentCreateAction, IdentifierRenameAction, LineEnding, ScriptRewriter};

use crate::common::rewrite_ok;

fn idempotent(sql: &str) -> String {
    rewrite_ok(
        sql,
        &IdempotentCreateAction::all().with_line_ending(LineEnding::Lf),
    )
}

fn procedure_guard(name: &str, qualified: &str) -> String {
    format!(
        "IF NOT EXISTS (SELECT type_desc, type FROM sys.procedures WITH (nolock) WHERE name = '{name}' AND type = 'P')\n\
         BEGIN\n    EXEC('CREATE PROCEDURE {qualified} AS')\nEND\nGO\n"
    )
}

fn function_guard(qualified: &str) -> String {
    format!(
        "IF EXISTS (SELECT name FROM sys.objects WITH (nolock) WHERE object_id = OBJECT_ID(N'{qualified}') AND type IN (N'FN',N'TF',N'IF',N'TF'))\n\
         \x20 EXEC('DROP FUNCTION {qualified}')\nGO\n"
    )
}

fn view_guard(qualified: &str) -> String {
    format!(
        "IF OBJECT_ID(N'{qualified}', N'V') IS NULL\n\
         \x20 EXEC('CREATE VIEW {qualified} AS SELECT 1 AS placeholder')\nGO\n"
    )
}

// ============================================================================
// Procedures
// ============================================================================

#[test]
fn test_procedure_name_forms() {
    let cases = [
        ("Foo", "Foo", "Foo"),
        ("[Foo]", "Foo", "[Foo]"),
        ("dbo.Foo", "Foo", "dbo.Foo"),
        ("[Sales] . [Get Orders]", "Get Orders", "[Sales].[Get Orders]"),
        ("Db..Foo", "Foo", "dbo.Foo"),
    ];
    for (written, name, qualified) in cases {
        let sql = format!("CREATE PROCEDURE {written} AS SELECT 1");
        assert_eq!(
            idempotent(&sql),
            format!(
                "{}ALTER PROCEDURE {written} AS SELECT 1",
                procedure_guard(name, qualified)
            ),
            "for {written}"
        );
    }
}

#[test]
fn test_alter_proc_also_guarded() {
    assert_eq!(
        idempotent("ALTER PROC dbo.Foo @x INT AS SELECT @x"),
        format!(
            "{}ALTER PROC dbo.Foo @x INT AS SELECT @x",
            procedure_guard("Foo", "dbo.Foo")
        )
    );
}

#[test]
fn test_procedure_body_is_untouched() {
    let body = " AS\nBEGIN\n    -- CREATE VIEW dbo.NotAView\n    EXEC('CREATE TABLE t (id INT)')\nEND";
    let output = idempotent(&format!("CREATE PROCEDURE dbo.Foo{body}"));
    assert!(output.ends_with(&format!("ALTER PROCEDURE dbo.Foo{body}")), "{output}");
    assert_eq!(output.matches("IF NOT EXISTS").count(), 1);
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_scalar_function() {
    let sql = "CREATE FUNCTION dbo.AddOne(@x INT) RETURNS INT AS BEGIN RETURN @x + 1 END";
    assert_eq!(
        idempotent(sql),
        format!("{}{sql}", function_guard("dbo.AddOne"))
    );
}

#[test]
fn test_inline_table_valued_function() {
    let sql = "ALTER FUNCTION [dbo].[Recent](@days INT)\nRETURNS TABLE\nAS\nRETURN (SELECT Id FROM dbo.Orders)";
    assert_eq!(
        idempotent(sql),
        format!(
            "{}CREATE FUNCTION [dbo].[Recent](@days INT)\nRETURNS TABLE\nAS\nRETURN (SELECT Id FROM dbo.Orders)",
            function_guard("[dbo].[Recent]")
        )
    );
}

#[test]
fn test_multi_statement_function() {
    let sql = "CREATE FUNCTION Split(@s NVARCHAR(MAX)) RETURNS @parts TABLE (part NVARCHAR(100)) AS BEGIN RETURN END";
    assert_eq!(idempotent(sql), format!("{}{sql}", function_guard("Split")));
}

#[test]
fn test_function_without_parameter_list_unchanged() {
    let sql = "CREATE FUNCTION dbo.Broken RETURNS INT AS BEGIN RETURN 1 END";
    assert_eq!(idempotent(sql), sql);
}

// ============================================================================
// Views
// ============================================================================

#[test]
fn test_view_name_forms() {
    for (written, qualified) in [
        ("V", "V"),
        ("[V]", "[V]"),
        ("rpt.V", "rpt.V"),
        ("Db..V", "dbo.V"),
    ] {
        let sql = format!("CREATE VIEW {written} AS SELECT a FROM t");
        assert_eq!(
            idempotent(&sql),
            format!("{}ALTER VIEW {written} AS SELECT a FROM t", view_guard(qualified)),
            "for {written}"
        );
    }
}

// ============================================================================
// Schemas
// ============================================================================

#[test]
fn test_create_schema_with_authorization() {
    assert_eq!(
        idempotent("CREATE SCHEMA [rpt] AUTHORIZATION dbo"),
        "IF NOT EXISTS (SELECT name FROM sys.schemas WITH (nolock) WHERE name = 'rpt')\n\
         \x20 EXEC('CREATE SCHEMA [rpt] AUTHORIZATION dbo');\nGO"
    );
}

#[test]
fn test_alter_schema_unchanged() {
    let sql = "ALTER SCHEMA rpt TRANSFER dbo.Orders";
    assert_eq!(idempotent(sql), sql);
}

// ============================================================================
// Other statements and filtering
// ============================================================================

#[test]
fn test_other_ddl_unchanged() {
    let sql = "CREATE TABLE dbo.T (id INT)\nGO\nALTER TABLE dbo.T ADD x INT\nGO\nCREATE INDEX ix ON dbo.T (id)\n";
    assert_eq!(idempotent(sql), sql);
}

#[test]
fn test_predicate_sees_unquoted_schema_and_name() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let action = IdempotentCreateAction::new(move |schema: &str, name: &str| {
        recorder
            .lock()
            .unwrap()
            .push(format!("{schema}|{name}"));
        name != "Skip"
    })
    .with_line_ending(LineEnding::Lf);

    let sql = "CREATE VIEW [rpt].[Skip] AS SELECT 1\nGO\nCREATE PROC Keep AS SELECT 1\nGO\nCREATE SCHEMA audit\n";
    let output = rewrite_ok(sql, &action);

    assert!(output.starts_with("CREATE VIEW [rpt].[Skip] AS SELECT 1\nGO\n"));
    assert!(output.contains(&procedure_guard("Keep", "Keep")));
    assert!(output.contains("EXEC('CREATE SCHEMA [audit]');"));
    assert_eq!(
        *seen.lock().unwrap(),
        vec!["rpt|Skip".to_string(), "|Keep".to_string(), "audit|".to_string()]
    );
}

#[test]
fn test_crlf_guard() {
    let output = rewrite_ok("CREATE VIEW V AS SELECT 1", &IdempotentCreateAction::all());
    assert_eq!(
        output,
        "IF OBJECT_ID(N'V', N'V') IS NULL\r\n  EXEC('CREATE VIEW V AS SELECT 1 AS placeholder')\r\nGO\r\nALTER VIEW V AS SELECT 1"
    );
}

#[test]
fn test_predicate_on_unqualified_procedure_sees_empty_schema() {
    let action = IdempotentCreateAction::new(|schema: &str, name: &str| {
        schema.is_empty() && name.starts_with("My")
    })
    .with_line_ending(LineEnding::Lf);

    assert_eq!(
        rewrite_ok("CREATE PROCEDURE MyProc AS BEGIN SELECT 1 END;", &action),
        format!(
            "{}ALTER PROCEDURE MyProc AS BEGIN SELECT 1 END;",
            procedure_guard("MyProc", "MyProc")
        )
    );

    let qualified = "CREATE PROCEDURE dbo.MyProc AS BEGIN SELECT 1 END;";
    assert_eq!(rewrite_ok(qualified, &action), qualified);
    let other = "CREATE PROCEDURE OtherProc AS BEGIN SELECT 1 END;";
    assert_eq!(rewrite_ok(other, &action), other);
}

#[test]
fn test_function_parameter_list_does_not_affect_guard() {
    let parameter_lists = [
        "()",
        "(@a INT = (1))",
        "(@a DECIMAL(5,2), @b NVARCHAR(MAX) = ((N'x')))",
    ];
    let shapes = [
        "RETURNS INT AS BEGIN RETURN 1 END",
        "RETURNS TABLE AS RETURN (SELECT 1 AS x)",
        "RETURNS @t TABLE (x DECIMAL(5,2)) AS BEGIN RETURN END",
    ];
    for parameters in parameter_lists {
        for shape in shapes {
            let sql = format!("CREATE FUNCTION dbo.F{parameters} {shape}");
            assert_eq!(
                idempotent(&sql),
                format!("{}{sql}", function_guard("dbo.F")),
                "for {sql}"
            );
        }
    }
}

#[test]
fn test_schema_name_with_bracket_is_escaped() {
    assert_eq!(
        idempotent("CREATE SCHEMA [a]]b]"),
        "IF NOT EXISTS (SELECT name FROM sys.schemas WITH (nolock) WHERE name = 'a]b')\n\
         \x20 EXEC('CREATE SCHEMA [a]]b]');\nGO"
    );
}

#[test]
fn test_rename_after_guard_keeps_batch_separator() {
    let idempotent = IdempotentCreateAction::all().with_line_ending(LineEnding::Lf);
    let rename = IdentifierRenameAction::new(|name: &str| format!("x_{name}"));
    let result = ScriptRewriter::new()
        .rewrite_pipeline("CREATE VIEW V AS SELECT 1", &[&idempotent, &rename])
        .unwrap();
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert!(result.output.contains("\nGO\nALTER VIEW x_V AS SELECT 1"), "{}", result.output);
}
