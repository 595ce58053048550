// src/db/models/package.rs

//! Package model - a source package name and its publication policy

use super::component::Component;
use super::{require_id, touch_last_seen};
use crate::error::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};

/// A package known to the repository manager
#[derive(Debug, Clone)]
pub struct Package {
    pub id: Option<i64>,
    pub name: String,
    pub last_seen: Option<String>,
    /// Publish into every enabled component of the target distribution
    pub all_components: bool,
    /// Fan RPM publications out to every distribution of the same vendor
    pub all_distributions: bool,
    /// Purge previously published artifacts before adding a new version
    pub remove_on_update: bool,
}

impl Package {
    /// Create a new Package with default policy
    pub fn new(name: String) -> Self {
        Self {
            id: None,
            name,
            last_seen: None,
            all_components: false,
            all_distributions: false,
            remove_on_update: false,
        }
    }

    /// Row id of a stored package
    pub fn id(&self) -> Result<i64> {
        require_id(self.id, "package", &self.name)
    }

    /// Insert this package into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO packages (name, last_seen, all_components, all_distributions, remove_on_update)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &self.name,
                &self.last_seen,
                self.all_components,
                self.all_distributions,
                self.remove_on_update,
            ],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Find a package by ID
    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, last_seen, all_components, all_distributions, remove_on_update
             FROM packages WHERE id = ?1",
        )?;

        let package = stmt.query_row([id], Self::from_row).optional()?;
        Ok(package)
    }

    /// Find a package by name
    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, last_seen, all_components, all_distributions, remove_on_update
             FROM packages WHERE name = ?1",
        )?;

        let package = stmt.query_row([name], Self::from_row).optional()?;
        Ok(package)
    }

    /// Find a package by name, creating it with default policy if unknown
    pub fn get_or_create(conn: &Connection, name: &str) -> Result<Self> {
        if let Some(package) = Self::find_by_name(conn, name)? {
            return Ok(package);
        }

        let mut package = Self::new(name.to_string());
        package.insert(conn)?;
        Ok(package)
    }

    /// List all packages
    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, last_seen, all_components, all_distributions, remove_on_update
             FROM packages ORDER BY name",
        )?;

        let packages = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(packages)
    }

    /// Persist the policy flags
    pub fn update(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "UPDATE packages SET all_components = ?1, all_distributions = ?2, remove_on_update = ?3
             WHERE id = ?4",
            params![
                self.all_components,
                self.all_distributions,
                self.remove_on_update,
                self.id()?,
            ],
        )?;
        Ok(())
    }

    /// Advance `last_seen` to now
    pub fn touch(&mut self, conn: &Connection) -> Result<()> {
        self.last_seen = Some(touch_last_seen(conn, "packages", self.id()?)?);
        Ok(())
    }

    /// Add an explicit component membership
    pub fn add_component(&self, conn: &Connection, component_id: i64) -> Result<()> {
        conn.execute(
            "INSERT OR IGNORE INTO package_components (package_id, component_id) VALUES (?1, ?2)",
            params![self.id()?, component_id],
        )?;
        Ok(())
    }

    /// Explicit component memberships, ordered by name
    pub fn components(&self, conn: &Connection) -> Result<Vec<Component>> {
        Component::query(
            conn,
            "SELECT c.id, c.name, c.enabled, c.last_seen FROM components c
             JOIN package_components pc ON pc.component_id = c.id
             WHERE pc.package_id = ?1 ORDER BY c.name",
            params![self.id()?],
        )
    }

    /// Explicit component memberships that also belong to `distribution_id`
    pub fn components_in_distribution(
        &self,
        conn: &Connection,
        distribution_id: i64,
    ) -> Result<Vec<Component>> {
        Component::query(
            conn,
            "SELECT c.id, c.name, c.enabled, c.last_seen FROM components c
             JOIN package_components pc ON pc.component_id = c.id
             JOIN distribution_components dc ON dc.component_id = c.id
             WHERE pc.package_id = ?1 AND dc.distribution_id = ?2 ORDER BY c.name",
            params![self.id()?, distribution_id],
        )
    }

    /// Convert a database row to a Package
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            last_seen: row.get(2)?,
            all_components: row.get(3)?,
            all_distributions: row.get(4)?,
            remove_on_update: row.get(5)?,
        })
    }
}
