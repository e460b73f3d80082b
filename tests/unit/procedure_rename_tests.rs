//! Tests for renaming procedures at definitions and call sites

use pretty_assertions::assert_eq;

use rust_sqlrewriter::ProcedureNameRenameAction;

use crate::common::rewrite_ok;

fn prefix_action() -> ProcedureNameRenameAction {
    ProcedureNameRenameAction::new(|schema: &str, name: &str| {
        (schema.to_string(), format!("prefix{name}"))
    })
}

#[test]
fn test_rename_procedure_definition() {
    assert_eq!(
        rewrite_ok("CREATE PROCEDURE [Sales].[GetOrders] AS SELECT 1", &prefix_action()),
        "CREATE PROCEDURE [Sales].[prefixGetOrders] AS SELECT 1"
    );
    assert_eq!(
        rewrite_ok("ALTER PROC GetOrders AS SELECT 1", &prefix_action()),
        "ALTER PROC dbo.prefixGetOrders AS SELECT 1"
    );
}

#[test]
fn test_rename_exec_forms() {
    let sql = "EXEC MyProc\nEXECUTE dbo.MyProc 1, 2\nEXEC DbName..MyOtherProc\nEXEC Db.Sales.Report";
    assert_eq!(
        rewrite_ok(sql, &prefix_action()),
        "EXEC dbo.prefixMyProc\nEXECUTE dbo.prefixMyProc 1, 2\nEXEC DbName.dbo.prefixMyOtherProc\nEXEC Db.Sales.prefixReport"
    );
}

#[test]
fn test_rename_can_move_schema() {
    let action = ProcedureNameRenameAction::new(|schema: &str, name: &str| {
        let schema = if schema == "dbo" { "app" } else { schema };
        (schema.to_string(), name.to_string())
    });
    assert_eq!(
        rewrite_ok("EXEC [Report]; EXEC audit.Log", &action),
        "EXEC app.[Report]; EXEC audit.Log"
    );
}

#[test]
fn test_dynamic_sql_and_variables_untouched() {
    let sql = "EXEC ('SELECT 1'); EXEC @proc; EXEC @rc = sp_who";
    assert_eq!(rewrite_ok(sql, &prefix_action()), sql);
}

#[test]
fn test_identifiers_elsewhere_untouched() {
    let sql = "SELECT MyProc FROM dbo.MyProc";
    assert_eq!(rewrite_ok(sql, &prefix_action()), sql);
}
