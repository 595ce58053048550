// src/db/models/component.rs

//! Component model - a named subdivision of a repository
//!
//! Components (`main`, `extra-x86_64`, ...) are shared between
//! distributions and packages through explicit membership tables.
//! RPM components follow the `<name>-<arch>` convention for
//! architecture-specific trees.

use super::{require_id, touch_last_seen};
use crate::error::Result;
use rusqlite::{Connection, OptionalExtension, Params, Row, params};

/// A repository component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub id: Option<i64>,
    pub name: String,
    pub enabled: bool,
    pub last_seen: Option<String>,
}

impl Component {
    /// Create a new, enabled Component
    pub fn new(name: String) -> Self {
        Self {
            id: None,
            name,
            enabled: true,
            last_seen: None,
        }
    }

    /// Row id of a stored component
    pub fn id(&self) -> Result<i64> {
        require_id(self.id, "component", &self.name)
    }

    /// Whether this component carries packages for `arch` (`<name>-<arch>`)
    pub fn matches_arch(&self, arch: &str) -> bool {
        self.name.ends_with(&format!("-{arch}"))
    }

    /// Insert this component into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO components (name, enabled, last_seen) VALUES (?1, ?2, ?3)",
            params![&self.name, self.enabled, &self.last_seen],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Find a component by name
    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, enabled, last_seen FROM components WHERE name = ?1",
        )?;

        let component = stmt.query_row([name], Self::from_row).optional()?;
        Ok(component)
    }

    /// Find a component by name, creating it (enabled) if it does not exist
    pub fn get_or_create(conn: &Connection, name: &str) -> Result<Self> {
        if let Some(component) = Self::find_by_name(conn, name)? {
            return Ok(component);
        }

        let mut component = Self::new(name.to_string());
        component.insert(conn)?;
        Ok(component)
    }

    /// List all components
    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        Self::query(
            conn,
            "SELECT id, name, enabled, last_seen FROM components ORDER BY name",
            [],
        )
    }

    /// Enable or disable this component
    pub fn set_enabled(&mut self, conn: &Connection, enabled: bool) -> Result<()> {
        conn.execute(
            "UPDATE components SET enabled = ?1 WHERE id = ?2",
            params![enabled, self.id()?],
        )?;
        self.enabled = enabled;
        Ok(())
    }

    /// Advance `last_seen` to now
    pub fn touch(&mut self, conn: &Connection) -> Result<()> {
        self.last_seen = Some(touch_last_seen(conn, "components", self.id()?)?);
        Ok(())
    }

    /// Run a query whose columns are `id, name, enabled, last_seen`
    pub(crate) fn query<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(sql)?;

        let components = stmt
            .query_map(params, Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(components)
    }

    /// Convert a database row to a Component
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            enabled: row.get(2)?,
            last_seen: row.get(3)?,
        })
    }
}

/// Names of a component set, for log output
pub fn component_names(components: &[Component]) -> String {
    components
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::create_test_db;

    #[test]
    fn test_component_crud() {
        let (_temp, conn) = create_test_db();

        let mut main = Component::new("main".to_string());
        let id = main.insert(&conn).unwrap();
        assert!(id > 0);

        let found = Component::find_by_name(&conn, "main").unwrap().unwrap();
        assert_eq!(found.id, Some(id));
        assert!(found.enabled);
        assert!(found.last_seen.is_none());

        main.set_enabled(&conn, false).unwrap();
        let found = Component::find_by_name(&conn, "main").unwrap().unwrap();
        assert!(!found.enabled);
    }

    #[test]
    fn test_get_or_create_is_stable() {
        let (_temp, conn) = create_test_db();

        let first = Component::get_or_create(&conn, "extra").unwrap();
        let second = Component::get_or_create(&conn, "extra").unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(Component::list_all(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_matches_arch() {
        let comp = Component::new("extra-x86_64".to_string());
        assert!(comp.matches_arch("x86_64"));
        assert!(!comp.matches_arch("aarch64"));
        assert!(!Component::new("main".to_string()).matches_arch("x86_64"));
    }

    #[test]
    fn test_touch_moves_forward() {
        let (_temp, conn) = create_test_db();

        let mut comp = Component::get_or_create(&conn, "main").unwrap();
        comp.touch(&conn).unwrap();
        let first = comp.last_seen.clone().unwrap();

        // A timestamp from the future must not be overwritten by an older one
        conn.execute(
            "UPDATE components SET last_seen = '2999-01-01T00:00:00.000000Z' WHERE id = ?1",
            [comp.id().unwrap()],
        )
        .unwrap();
        comp.touch(&conn).unwrap();

        let stored = Component::find_by_name(&conn, "main").unwrap().unwrap();
        assert_eq!(stored.last_seen.as_deref(), Some("2999-01-01T00:00:00.000000Z"));
        assert_eq!(comp.last_seen, stored.last_seen);
        assert!(first < stored.last_seen.unwrap());
    }
}
