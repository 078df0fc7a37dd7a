// src/db/schema.rs
// SQL for the checklist/act tables. Identifiers are validated before they are
// spliced into statements; every value is a bound parameter.

use std::fmt;

use crate::error::{AnalyzerError, Result};

/// A validated SQL identifier fragment (schema name or checklist table suffix).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let valid = !trimmed.is_empty()
            && trimmed
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

        if valid {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(AnalyzerError::InvalidIdentifier(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Statement builder bound to one schema and one name language.
#[derive(Debug, Clone)]
pub struct SchemaSql {
    schema: Identifier,
    lang_id: i32,
}

impl SchemaSql {
    pub fn new(schema: Identifier, lang_id: i32) -> Self {
        Self { schema, lang_id }
    }

    pub fn lang_id(&self) -> i32 {
        self.lang_id
    }

    pub fn checklist_table(&self, table: &Identifier) -> String {
        format!("{}.m_checklist_{}", self.schema, table)
    }

    pub fn checkpart_table(&self, table: &Identifier) -> String {
        format!("{}.mc_checkpart_{}", self.schema, table)
    }

    fn act_table(&self) -> String {
        format!("{}.mc_checkakt", self.schema)
    }

    /// Acts that reference a checklist of `table` and are flagged for review.
    pub fn pending_acts(&self, table: &Identifier) -> String {
        format!(
            r#"
            SELECT m.code::int8 AS checklist_code, m.aktcode::int8 AS akt_code
            FROM {checklists} m
            JOIN {acts} a ON m.aktcode = a.code
            WHERE m.aktcode <> 0
              AND a.aito = 1
            "#,
            checklists = self.checklist_table(table),
            acts = self.act_table(),
        )
    }

    /// (code, grade) pairs of one checklist; bind the checklist id as `$1`.
    pub fn scored_items(&self, table: &Identifier) -> String {
        format!(
            r#"
            SELECT charcode::int8 AS charcode, grade::int4 AS grade
            FROM {parts}
            WHERE checkcode = $1
            ORDER BY charcode
            "#,
            parts = self.checkpart_table(table),
        )
    }

    /// Items with localized category names; bind checklist id as `$1` and
    /// language id as `$2`.
    pub fn checklist_items(&self, table: &Identifier) -> String {
        format!(
            r#"
            SELECT p.charcode::int8 AS charcode,
                   p.grade::int4 AS grade,
                   n.name::text AS category_name
            FROM {checklists} m
            JOIN {parts} p ON m.code = p.checkcode
            JOIN {schema}.rep_char c ON p.charcode = c.code
            JOIN {schema}.rep_names n ON c.namecode = n.code AND n.langid = $2
            WHERE m.code = $1
            ORDER BY p.charcode
            "#,
            checklists = self.checklist_table(table),
            parts = self.checkpart_table(table),
            schema = self.schema,
        )
    }

    pub fn stored_fingerprint(&self) -> String {
        format!("SELECT aichecksum::text AS aichecksum FROM {} WHERE code = $1", self.act_table())
    }

    /// Binds: `$1` analysis text, `$2` timestamp, `$3` act id.
    pub fn write_analysis(&self) -> String {
        format!(
            r#"
            UPDATE {}
            SET airesponse = $1,
                airedate = $2,
                aire = 1
            WHERE code = $3
            "#,
            self.act_table()
        )
    }

    /// Binds: `$1` fingerprint, `$2` act id.
    pub fn store_fingerprint(&self) -> String {
        format!("UPDATE {} SET aichecksum = $1 WHERE code = $2", self.act_table())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql() -> SchemaSql {
        SchemaSql::new(Identifier::parse("dbai").unwrap(), 1049)
    }

    #[test]
    fn identifier_accepts_lowercase_digits_and_underscore() {
        assert_eq!(Identifier::parse("avsec_2").unwrap().as_str(), "avsec_2");
        assert_eq!(Identifier::parse("  ramp ").unwrap().as_str(), "ramp");
    }

    #[test]
    fn identifier_rejects_anything_that_could_escape_the_statement() {
        for bad in ["", "  ", "Ramp", "ramp; drop table x", "a.b", "a-b", "\"q\""] {
            assert!(
                matches!(Identifier::parse(bad), Err(AnalyzerError::InvalidIdentifier(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn statements_target_the_configured_schema_and_table() {
        let sql = sql();
        let table = Identifier::parse("ramp").unwrap();

        let scan = sql.pending_acts(&table);
        assert!(scan.contains("FROM dbai.m_checklist_ramp m"));
        assert!(scan.contains("JOIN dbai.mc_checkakt a"));
        assert!(scan.contains("a.aito = 1"));

        assert!(sql.scored_items(&table).contains("FROM dbai.mc_checkpart_ramp"));

        let collect = sql.checklist_items(&table);
        assert!(collect.contains("JOIN dbai.mc_checkpart_ramp p"));
        assert!(collect.contains("JOIN dbai.rep_names n"));
        assert!(collect.contains("ORDER BY p.charcode"));
    }

    #[test]
    fn act_updates_are_scoped_to_one_row() {
        let sql = sql();
        assert!(sql.write_analysis().contains("WHERE code = $3"));
        assert!(sql.write_analysis().contains("aire = 1"));
        assert!(sql.store_fingerprint().contains("WHERE code = $2"));
    }
}
