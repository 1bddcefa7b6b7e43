//! Component declarations and schema validation.

use std::collections::HashSet;

use crate::error::{SchemaError, SchemaResult};
use crate::TypeDesc;

/// Maximum number of fields in a record component (the widest change mask).
pub const MAX_RECORD_FIELDS: usize = 32;

/// A named, typed field of a record component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldDef {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub ty: TypeDesc,
}

impl FieldDef {
    /// Creates a field definition.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: impl Into<TypeDesc>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// The storage shape of a component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ComponentKind {
    /// A single column addressed directly by entity index.
    Column(TypeDesc),
    /// An ordered set of named columns. Order is the wire order and the
    /// change-mask bit order.
    Record(Vec<FieldDef>),
}

/// A component definition within a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentDef {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: ComponentKind,
}

impl ComponentDef {
    /// Creates a single-column component.
    #[must_use]
    pub fn column(name: impl Into<String>, ty: impl Into<TypeDesc>) -> Self {
        Self {
            name: name.into(),
            kind: ComponentKind::Column(ty.into()),
        }
    }

    /// Creates a record component with no fields.
    #[must_use]
    pub fn record(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ComponentKind::Record(Vec::new()),
        }
    }

    /// Creates a record component with the provided fields.
    #[must_use]
    pub fn with_fields(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            kind: ComponentKind::Record(fields),
        }
    }

    /// Appends a field.
    ///
    /// Calling this on a column component turns it into a record whose only
    /// field is `name`.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, ty: impl Into<TypeDesc>) -> Self {
        let field = FieldDef::new(name, ty);
        match &mut self.kind {
            ComponentKind::Record(fields) => fields.push(field),
            ComponentKind::Column(_) => self.kind = ComponentKind::Record(vec![field]),
        }
        self
    }

    /// Returns `true` for record components.
    #[must_use]
    pub const fn is_record(&self) -> bool {
        matches!(self.kind, ComponentKind::Record(_))
    }

    /// Returns the number of columns backing this component.
    #[must_use]
    pub fn column_count(&self) -> usize {
        match &self.kind {
            ComponentKind::Column(_) => 1,
            ComponentKind::Record(fields) => fields.len(),
        }
    }

    /// Returns the name and type of the column at `position`.
    ///
    /// A column component reports its own name for position 0.
    #[must_use]
    pub fn column_at(&self, position: usize) -> Option<(&str, &TypeDesc)> {
        match &self.kind {
            ComponentKind::Column(ty) if position == 0 => Some((self.name.as_str(), ty)),
            ComponentKind::Column(_) => None,
            ComponentKind::Record(fields) => fields
                .get(position)
                .map(|field| (field.name.as_str(), &field.ty)),
        }
    }

    /// Iterates over column types in frozen order.
    pub fn column_types(&self) -> impl Iterator<Item = &TypeDesc> + '_ {
        (0..self.column_count()).filter_map(|position| self.column_at(position).map(|(_, ty)| ty))
    }

    /// Returns the position of the named field in a record component.
    #[must_use]
    pub fn field_position(&self, name: &str) -> Option<usize> {
        match &self.kind {
            ComponentKind::Column(_) => None,
            ComponentKind::Record(fields) => fields.iter().position(|field| field.name == name),
        }
    }

    /// Validates names, field count and field types of this component.
    pub fn validate(&self) -> SchemaResult<()> {
        if self.name.is_empty() {
            return Err(SchemaError::EmptyName { component: None });
        }
        match &self.kind {
            ComponentKind::Column(ty) => ty.validate(),
            ComponentKind::Record(fields) => {
                if fields.is_empty() {
                    return Err(SchemaError::EmptyRecord {
                        component: self.name.clone(),
                    });
                }
                if fields.len() > MAX_RECORD_FIELDS {
                    return Err(SchemaError::TooManyFields {
                        component: self.name.clone(),
                        count: fields.len(),
                        max: MAX_RECORD_FIELDS,
                    });
                }
                let mut names = HashSet::new();
                for field in fields {
                    if field.name.is_empty() {
                        return Err(SchemaError::EmptyName {
                            component: Some(self.name.clone()),
                        });
                    }
                    if !names.insert(field.name.as_str()) {
                        return Err(SchemaError::DuplicateField {
                            component: self.name.clone(),
                            field: field.name.clone(),
                        });
                    }
                    field.ty.validate()?;
                }
                Ok(())
            }
        }
    }
}

/// A schema consisting of ordered components.
///
/// Component position is the component id used on the wire in diff mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Schema {
    pub components: Vec<ComponentDef>,
}

impl Schema {
    /// Creates a schema from components after validation.
    pub fn new(components: Vec<ComponentDef>) -> SchemaResult<Self> {
        let schema = Self { components };
        schema.validate()?;
        Ok(schema)
    }

    /// Creates a schema builder.
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder {
            components: Vec::new(),
        }
    }

    /// Validates schema invariants.
    pub fn validate(&self) -> SchemaResult<()> {
        let mut names = HashSet::new();
        for component in &self.components {
            component.validate()?;
            if !names.insert(component.name.as_str()) {
                return Err(SchemaError::DuplicateComponent {
                    name: component.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Returns the position (wire component id) of the named component.
    #[must_use]
    pub fn component_position(&self, name: &str) -> Option<usize> {
        self.components
            .iter()
            .position(|component| component.name == name)
    }

    /// Returns the named component.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&ComponentDef> {
        self.components
            .iter()
            .find(|component| component.name == name)
    }
}

/// Builder for `Schema`.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    components: Vec<ComponentDef>,
}

impl SchemaBuilder {
    /// Adds a component definition.
    #[must_use]
    pub fn component(mut self, component: ComponentDef) -> Self {
        self.components.push(component);
        self
    }

    /// Builds the schema after validation.
    pub fn build(self) -> SchemaResult<Schema> {
        Schema::new(self.components)
    }
}
