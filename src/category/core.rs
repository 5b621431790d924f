//! Category domain types and database queries.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserID, database_id::CategoryId};

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name from `name` with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyCategoryName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A hex colour like "#22c55e", stored in lowercase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryColor(String);

impl CategoryColor {
    /// # Errors
    ///
    /// Returns [Error::InvalidCategoryColor] unless `color` is a '#' followed
    /// by exactly six hex digits.
    pub fn new(color: &str) -> Result<Self, Error> {
        let color = color.trim();

        let is_valid = color.len() == 7
            && color.starts_with('#')
            && color[1..].chars().all(|c| c.is_ascii_hexdigit());

        if is_valid {
            Ok(Self(color.to_ascii_lowercase()))
        } else {
            Err(Error::InvalidCategoryColor(color.to_owned()))
        }
    }

    pub fn new_unchecked(color: &str) -> Self {
        Self(color.to_owned())
    }
}

impl AsRef<str> for CategoryColor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A label for grouping transactions, e.g. 'Alimentación'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    pub color: CategoryColor,
    /// An optional emoji shown before the name.
    pub icon: Option<String>,
}

/// The categories every new user starts with, as (name, colour) pairs.
pub const DEFAULT_CATEGORIES: [(&str, &str); 8] = [
    ("Alimentación", "#22c55e"),
    ("Transporte", "#3b82f6"),
    ("Hogar", "#f97316"),
    ("Entretenimiento", "#8b5cf6"),
    ("Salud", "#ec4899"),
    ("Educación", "#14b8a6"),
    ("Salario", "#6366f1"),
    ("Otros ingresos", "#a3e635"),
];

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            icon TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id);",
    )?;

    Ok(())
}

/// Create a category owned by `user_id` and return it with its generated ID.
pub fn create_category(
    user_id: UserID,
    name: CategoryName,
    color: CategoryColor,
    icon: Option<String>,
    connection: &Connection,
) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (user_id, name, color, icon) VALUES (?1, ?2, ?3, ?4);",
        (user_id.as_i64(), name.as_ref(), color.as_ref(), &icon),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        name,
        color,
        icon,
    })
}

/// Insert the [DEFAULT_CATEGORIES] for a new user.
pub fn create_default_categories(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(name, color)| {
            create_category(
                user_id,
                CategoryName::new_unchecked(name),
                CategoryColor::new_unchecked(color),
                None,
                connection,
            )
        })
        .collect()
}

/// Retrieve all of `user_id`'s categories ordered alphabetically by name.
pub fn get_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, color, icon FROM category
            WHERE user_id = :user_id
            ORDER BY name ASC;",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Delete one of `user_id`'s categories.
///
/// Transactions in the category keep their `category_id`.
///
/// # Errors
///
/// Returns [Error::DeleteMissingCategory] if the category does not exist or
/// belongs to another user.
pub fn delete_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let raw_color: String = row.get(2)?;
    let icon = row.get(3)?;

    Ok(Category {
        id,
        name: CategoryName::new_unchecked(&raw_name),
        color: CategoryColor::new_unchecked(&raw_color),
        icon,
    })
}

#[cfg(test)]
mod category_field_tests {
    use crate::Error;

    use super::{CategoryColor, CategoryName};

    #[test]
    fn name_is_trimmed() {
        assert_eq!(
            CategoryName::new("  Mascotas \n").unwrap().as_ref(),
            "Mascotas"
        );
    }

    #[test]
    fn blank_name_is_rejected() {
        assert_eq!(CategoryName::new("\n\t "), Err(Error::EmptyCategoryName));
    }

    #[test]
    fn hex_color_is_accepted_and_lowercased() {
        assert_eq!(CategoryColor::new("#22C55E").unwrap().as_ref(), "#22c55e");
    }

    #[test]
    fn malformed_colors_are_rejected() {
        for color in ["22c55e", "#22c55", "#22c55ee", "#zzzzzz", "", "rojo"] {
            assert_eq!(
                CategoryColor::new(color),
                Err(Error::InvalidCategoryColor(color.to_owned())),
                "for {color:?}"
            );
        }
    }
}

#[cfg(test)]
mod category_query_tests {
    use std::str::FromStr;

    use email_address::EmailAddress;
    use rusqlite::Connection;

    use crate::{
        Error, PasswordHash,
        auth::{UserID, create_user},
        db::initialize,
    };

    use super::{
        CategoryColor, CategoryName, DEFAULT_CATEGORIES, create_category,
        create_default_categories, delete_category, get_categories,
    };

    fn get_test_connection() -> (Connection, UserID, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let mut user_ids = ["ana@example.com", "luis@example.com"].map(|email| {
            create_user(
                EmailAddress::from_str(email).unwrap(),
                PasswordHash::new_unchecked("hunter2"),
                &connection,
            )
            .unwrap()
            .id
        });
        user_ids.sort_by_key(|id| id.as_i64());

        (connection, user_ids[0], user_ids[1])
    }

    #[test]
    fn create_category_succeeds() {
        let (connection, user_id, _) = get_test_connection();

        let category = create_category(
            user_id,
            CategoryName::new("Mascotas").unwrap(),
            CategoryColor::new("#facc15").unwrap(),
            Some("🐶".to_owned()),
            &connection,
        )
        .unwrap();

        assert!(category.id > 0);
        assert_eq!(get_categories(user_id, &connection).unwrap(), [category]);
    }

    #[test]
    fn default_categories_are_seeded() {
        let (connection, user_id, _) = get_test_connection();

        create_default_categories(user_id, &connection).unwrap();

        let mut got: Vec<_> = get_categories(user_id, &connection)
            .unwrap()
            .into_iter()
            .map(|category| (category.name.to_string(), category.color.to_string()))
            .collect();
        let mut want: Vec<_> = DEFAULT_CATEGORIES
            .iter()
            .map(|(name, color)| (name.to_string(), color.to_string()))
            .collect();
        got.sort();
        want.sort();
        assert_eq!(got, want);
    }

    #[test]
    fn categories_are_scoped_to_user() {
        let (connection, ana, luis) = get_test_connection();
        create_default_categories(ana, &connection).unwrap();

        assert!(get_categories(luis, &connection).unwrap().is_empty());
    }

    #[test]
    fn delete_category_succeeds() {
        let (connection, user_id, _) = get_test_connection();
        let category = create_category(
            user_id,
            CategoryName::new_unchecked("Mascotas"),
            CategoryColor::new_unchecked("#facc15"),
            None,
            &connection,
        )
        .unwrap();

        delete_category(category.id, user_id, &connection).unwrap();

        assert!(get_categories(user_id, &connection).unwrap().is_empty());
    }

    #[test]
    fn cannot_delete_other_users_category() {
        let (connection, ana, luis) = get_test_connection();
        let category = create_category(
            ana,
            CategoryName::new_unchecked("Mascotas"),
            CategoryColor::new_unchecked("#facc15"),
            None,
            &connection,
        )
        .unwrap();

        assert_eq!(
            delete_category(category.id, luis, &connection),
            Err(Error::DeleteMissingCategory)
        );
        assert_eq!(get_categories(ana, &connection).unwrap().len(), 1);
    }
}
