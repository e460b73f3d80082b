//! Tests for renaming identifiers

use std::collections::HashMap;

use pretty_assertions::assert_eq;

use rust_sqlrewriter::IdentifierRenameAction;

use crate::common::rewrite_ok;

fn prefixed(prefix: &'static str) -> IdentifierRenameAction {
    IdentifierRenameAction::new(move |name: &str| format!("{prefix}{name}"))
}

#[test]
fn test_rename_select_statement() {
    assert_eq!(
        rewrite_ok(
            "SELECT o.Id, o.Total FROM dbo.Orders o WHERE o.Id = @Id",
            &prefixed("t_")
        ),
        "SELECT t_o.t_Id, t_o.t_Total FROM t_dbo.t_Orders t_o WHERE t_o.t_Id = @Id"
    );
}

#[test]
fn test_rename_keeps_bracket_and_double_quotes() {
    assert_eq!(
        rewrite_ok("SELECT [Order Id], \"Total\" FROM [dbo].[Orders]", &prefixed("x")),
        "SELECT [xOrder Id], \"xTotal\" FROM [xdbo].[xOrders]"
    );
}

#[test]
fn test_rename_leaves_keywords_literals_and_comments() {
    let sql = "SELECT 'Orders' AS Label -- Orders\n/* Orders */ FROM Orders";
    assert_eq!(
        rewrite_ok(sql, &prefixed("x_")),
        "SELECT 'Orders' AS x_Label -- Orders\n/* Orders */ FROM x_Orders"
    );
}

#[test]
fn test_rename_with_lookup_table() {
    let map: HashMap<&str, &str> = [("Customers", "Clients"), ("Name", "FullName")]
        .into_iter()
        .collect();
    let action = IdentifierRenameAction::new(move |name: &str| {
        map.get(name).map(|n| n.to_string()).unwrap_or_else(|| name.to_string())
    });
    assert_eq!(
        rewrite_ok("SELECT Name, Email FROM Customers", &action),
        "SELECT FullName, Email FROM Clients"
    );
}

#[test]
fn test_rename_leaves_batch_separators() {
    assert_eq!(
        rewrite_ok("SELECT 1\nGO\nSELECT c FROM t\ngo\n", &prefixed("x_")),
        "SELECT 1\nGO\nSELECT x_c FROM x_t\ngo\n"
    );
}

#[test]
fn test_rename_go_used_as_a_name() {
    // only a GO that starts its line separates batches
    assert_eq!(
        rewrite_ok("SELECT GO FROM t\n  GO\n", &prefixed("x_")),
        "SELECT x_GO FROM x_t\n  GO\n"
    );
}
