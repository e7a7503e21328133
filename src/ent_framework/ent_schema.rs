// Ent Schema - persistence and API mapping declared as plain configuration
// Storage backends and the HTTP layer read these tables instead of the entity types

use serde::{Deserialize, Serialize};

use crate::core::EntityType;

/// Schema definition trait implemented once per entity
pub trait EntSchema: Send + Sync {
    /// Backing table name
    fn table() -> &'static str
    where
        Self: Sized;

    /// Define scalar fields for this entity (the id column is implicit)
    fn fields() -> Vec<FieldDefinition>
    where
        Self: Sized;

    /// Define edges (relationships) for this entity
    fn edges() -> Vec<EdgeDefinition>
    where
        Self: Sized,
    {
        Vec::new()
    }

    /// API resource metadata, for entities exposed over HTTP
    fn resource() -> Option<ResourceDefinition>
    where
        Self: Sized,
    {
        None
    }
}

/// Field definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub field_type: FieldType,
    /// No two rows may share a value
    pub unique: bool,
    pub storage_key: Option<String>,
}

impl FieldDefinition {
    pub fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            unique: false,
            storage_key: None,
        }
    }

    /// Mark field as unique across the table
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Store the field under a different column name
    pub fn storage_key(mut self, key: &str) -> Self {
        self.storage_key = Some(key.to_string());
        self
    }

    /// Column name in the backing table
    pub fn column(&self) -> &str {
        self.storage_key.as_deref().unwrap_or(&self.name)
    }
}

/// Field types supported by the storage mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    String,
    Text,
    Int64,
    /// UTC timestamp
    Time,
    JSON,
}

/// Many-to-one edge: this entity holds a foreign key to `target_entity`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDefinition {
    pub name: String,
    pub target_entity: EntityType,
    pub required: bool,
}

impl EdgeDefinition {
    pub fn to(name: &str, target: EntityType) -> Self {
        Self {
            name: name.to_string(),
            target_entity: target,
            required: false,
        }
    }

    /// Mark edge as required (NOT NULL join column)
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Join column name
    pub fn column(&self) -> String {
        format!("{}_id", self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

/// API exposure of an entity: pagination, default order and filters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub items_per_page: u32,
    pub order_by: String,
    pub order_direction: OrderDirection,
    /// Properties accepting an exact-match query filter
    pub exact_filters: Vec<String>,
}

impl ResourceDefinition {
    pub fn new(items_per_page: u32) -> Self {
        Self {
            items_per_page,
            order_by: "id".to_string(),
            order_direction: OrderDirection::Asc,
            exact_filters: Vec::new(),
        }
    }

    pub fn order(mut self, field: &str, direction: OrderDirection) -> Self {
        self.order_by = field.to_string();
        self.order_direction = direction;
        self
    }

    pub fn exact_filter(mut self, property: &str) -> Self {
        self.exact_filters.push(property.to_string());
        self
    }

    pub fn allows_filter(&self, property: &str) -> bool {
        self.exact_filters.iter().any(|f| f == property)
    }
}

/// Table name backing an entity type
pub fn table_for(entity_type: EntityType) -> &'static str {
    use crate::schemas::{CommentSchema, PostSchema, UserSchema};

    match entity_type {
        EntityType::Comment => CommentSchema::table(),
        EntityType::Post => PostSchema::table(),
        EntityType::User => UserSchema::table(),
    }
}

fn sql_type(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::String | FieldType::Text | FieldType::JSON => "TEXT",
        // Time is stored as microseconds since the epoch
        FieldType::Int64 | FieldType::Time => "INTEGER",
    }
}

/// `CREATE TABLE` statement for a schema: auto-increment id, scalar columns,
/// then one foreign key column per edge.
pub fn create_table_sql<S: EntSchema>() -> String {
    let mut columns = vec!["id INTEGER PRIMARY KEY AUTOINCREMENT".to_string()];
    let mut foreign_keys = Vec::new();

    for field in S::fields() {
        let unique = if field.unique { " UNIQUE" } else { "" };
        columns.push(format!(
            "{} {} NOT NULL{}",
            field.column(),
            sql_type(field.field_type),
            unique
        ));
    }

    for edge in S::edges() {
        let null = if edge.required { " NOT NULL" } else { "" };
        let column = edge.column();
        columns.push(format!("{} INTEGER{}", column, null));
        foreign_keys.push(format!(
            "FOREIGN KEY ({}) REFERENCES {}(id)",
            column,
            table_for(edge.target_entity)
        ));
    }

    columns.extend(foreign_keys);
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        S::table(),
        columns.join(",\n    ")
    )
}
