// src/db/models/binary_package.rs

//! BinaryPackage model - one architecture-specific artifact's current
//! publication

use super::component::Component;
use super::replace_components;
use crate::error::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};

/// Published binary package; at most one per (package, name, distribution, arch)
#[derive(Debug, Clone)]
pub struct BinaryPackage {
    pub id: Option<i64>,
    pub package_id: i64,
    pub name: String,
    pub distribution_id: i64,
    pub arch: String,
    pub version: String,
    pub timestamp: String,
}

/// Identity of a binary publication
#[derive(Debug, Clone, Copy)]
pub struct BinaryKey<'a> {
    pub package_id: i64,
    pub name: &'a str,
    pub distribution_id: i64,
    pub arch: &'a str,
}

impl BinaryPackage {
    /// Find the row for a binary identity
    pub fn find(conn: &Connection, key: BinaryKey<'_>) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, package_id, name, distribution_id, arch, version, timestamp
             FROM binary_packages
             WHERE package_id = ?1 AND name = ?2 AND distribution_id = ?3 AND arch = ?4",
        )?;

        let row = stmt
            .query_row(
                params![key.package_id, key.name, key.distribution_id, key.arch],
                Self::from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Record a successful publication
    ///
    /// Same update-in-place rule as source packages: one row per identity,
    /// component set replaced wholesale.
    pub fn record(
        conn: &Connection,
        key: BinaryKey<'_>,
        version: &str,
        components: &[Component],
    ) -> Result<Self> {
        let timestamp = crate::db::now();

        let id = match Self::find(conn, key)? {
            Some(existing) => {
                let id = existing.id.unwrap_or_default();
                conn.execute(
                    "UPDATE binary_packages SET version = ?1, timestamp = ?2 WHERE id = ?3",
                    params![version, &timestamp, id],
                )?;
                id
            }
            None => {
                conn.execute(
                    "INSERT INTO binary_packages (package_id, name, distribution_id, arch, version, timestamp)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        key.package_id,
                        key.name,
                        key.distribution_id,
                        key.arch,
                        version,
                        &timestamp,
                    ],
                )?;
                conn.last_insert_rowid()
            }
        };

        replace_components(conn, "binary_package_components", "binary_package_id", id, components)?;

        Ok(Self {
            id: Some(id),
            package_id: key.package_id,
            name: key.name.to_string(),
            distribution_id: key.distribution_id,
            arch: key.arch.to_string(),
            version: version.to_string(),
            timestamp,
        })
    }

    /// All binary rows with the given binary name, oldest first
    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, package_id, name, distribution_id, arch, version, timestamp
             FROM binary_packages WHERE name = ?1 ORDER BY id",
        )?;

        let rows = stmt
            .query_map([name], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// All binary rows of a package
    pub fn list_for_package(conn: &Connection, package_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, package_id, name, distribution_id, arch, version, timestamp
             FROM binary_packages WHERE package_id = ?1 ORDER BY name, arch",
        )?;

        let rows = stmt
            .query_map([package_id], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Components currently carrying this binary
    pub fn components(&self, conn: &Connection) -> Result<Vec<Component>> {
        Component::query(
            conn,
            "SELECT c.id, c.name, c.enabled, c.last_seen FROM components c
             JOIN binary_package_components bc ON bc.component_id = c.id
             WHERE bc.binary_package_id = ?1 ORDER BY c.name",
            params![self.id],
        )
    }

    /// Delete a binary row (its component links cascade)
    pub fn delete(conn: &Connection, id: i64) -> Result<()> {
        conn.execute("DELETE FROM binary_packages WHERE id = ?1", [id])?;
        Ok(())
    }

    /// Convert a database row to a BinaryPackage
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            package_id: row.get(1)?,
            name: row.get(2)?,
            distribution_id: row.get(3)?,
            arch: row.get(4)?,
            version: row.get(5)?,
            timestamp: row.get(6)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Distribution, Package, Vendor};
    use crate::db::testing::create_test_db;

    #[test]
    fn test_record_one_row_per_identity() {
        let (_temp, conn) = create_test_db();

        let mut dist = Distribution::new("el9".to_string(), Vendor::RedHat);
        dist.insert(&conn).unwrap();
        let pkg = Package::get_or_create(&conn, "foo").unwrap();
        let x86 = Component::get_or_create(&conn, "extra-x86_64").unwrap();

        let key = BinaryKey {
            package_id: pkg.id().unwrap(),
            name: "foo-libs",
            distribution_id: dist.id().unwrap(),
            arch: "x86_64",
        };

        BinaryPackage::record(&conn, key, "1.0-1", &[x86.clone()]).unwrap();
        let updated = BinaryPackage::record(&conn, key, "2.0-1", &[x86.clone()]).unwrap();

        let rows = BinaryPackage::find_by_name(&conn, "foo-libs").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, updated.id);
        assert_eq!(rows[0].version, "2.0-1");
        assert_eq!(rows[0].components(&conn).unwrap(), vec![x86]);

        // A different arch is a different identity
        let noarch = BinaryKey { arch: "noarch", ..key };
        BinaryPackage::record(&conn, noarch, "2.0-1", &[]).unwrap();
        assert_eq!(BinaryPackage::list_for_package(&conn, pkg.id().unwrap()).unwrap().len(), 2);
    }
}
