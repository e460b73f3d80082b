//! T-SQL tokenizing and name parsing

mod function_classifier;
mod identifier_utils;
mod qualified_name;
mod script_parser;
mod token;
mod tsql_dialect;

pub use function_classifier::{classify_function, FunctionType};
pub use identifier_utils::{
    identifier_token, is_identifier, quote_identifier, quote_if_needed, quote_style,
    sql_string_literal, unquote_identifier, QuoteStyle,
};
pub use qualified_name::{NamePart, QualifiedName, DEFAULT_SCHEMA};
pub use script_parser::{parse_script, ParseError, ParsedScript};
pub use token::{tokens_to_sql, Location, Token, TokenKind};
pub use tsql_dialect::{is_reserved_keyword, ExtendedTsqlDialect};
