//! Field reconciliation across operation views.
//!
//! The aggregator owns one mapping and changes it only through four
//! ordered rules:
//!
//! 1. [`FieldAggregator::seed`] inserts every create parameter and body field.
//! 2. [`FieldAggregator::merge_update`] adds missing fields from the partial
//!    update view and promotes optional fields the update requires.
//! 3. [`FieldAggregator::merge_delete`] adds missing delete parameters.
//! 4. [`FieldAggregator::finish`] marks create body fields the update body
//!    does not carry as immutable and returns the read-only catalog.
//!
//! Rule 4 reads the create and update body key sets as extracted, not the
//! catalog, so fields added by rules 2 and 3 never influence it.

use std::collections::BTreeSet;

use log::{debug, info};
use serde::Serialize;

use crate::error::AggregateError;
use crate::types::{Field, FieldMap, FieldType, OperationView};

/// Builds a [`FieldCatalog`] from operation views.
#[derive(Debug)]
pub struct FieldAggregator {
    fields: FieldMap,
    create_body: BTreeSet<String>,
    update_body: BTreeSet<String>,
}

impl FieldAggregator {
    /// Seed the catalog from the create view.
    ///
    /// Parameters are inserted first, then body fields; a body field wins a
    /// name clash with a parameter.
    pub fn seed(create: &OperationView) -> Self {
        let mut fields = create.parameters.clone();
        let mut create_body = BTreeSet::new();
        for (name, field) in create.body_fields() {
            if fields.insert(name.clone(), field.clone()).is_some() {
                debug!("create body field {:?} shadows a create parameter", name);
            }
            create_body.insert(name.clone());
        }

        debug!(
            "seeded {} field(s) from {} {}",
            fields.len(),
            create.operation,
            create.path
        );

        Self {
            fields,
            create_body,
            update_body: BTreeSet::new(),
        }
    }

    /// Merge the partial update view (or its full-replace stand-in).
    ///
    /// Absent fields are inserted unchanged. A stored optional field is
    /// replaced by an update body field that is required; required fields
    /// are never demoted.
    pub fn merge_update(&mut self, update: &OperationView) {
        for (name, field) in &update.parameters {
            self.insert_if_absent(name, field);
        }

        for (name, field) in update.body_fields() {
            self.update_body.insert(name.clone());
            let replace = match self.fields.get(name) {
                None => true,
                Some(stored) if !stored.required && field.required => {
                    debug!(
                        "{} {} requires {:?}; promoting",
                        update.operation, update.path, name
                    );
                    true
                }
                Some(_) => false,
            };
            if replace {
                self.fields.insert(name.clone(), field.clone());
            }
        }
    }

    /// Merge the delete view's parameters.
    ///
    /// Delete body fields describe the request, not the resource, and are
    /// never merged.
    pub fn merge_delete(&mut self, delete: &OperationView) {
        for (name, field) in &delete.parameters {
            self.insert_if_absent(name, field);
        }
        if let Some(body) = &delete.body {
            debug!(
                "ignoring {} body field(s) of {} {}",
                body.len(),
                delete.operation,
                delete.path
            );
        }
    }

    /// Infer immutability and return the finished catalog.
    ///
    /// # Errors
    ///
    /// Returns `AggregateError::MissingCatalogEntry` if a create body field is
    /// no longer in the catalog.
    pub fn finish(mut self) -> Result<FieldCatalog, AggregateError> {
        for name in self.create_body.difference(&self.update_body) {
            let field = self.fields.get_mut(name).ok_or_else(|| {
                AggregateError::MissingCatalogEntry {
                    wire_name: name.clone(),
                }
            })?;
            field.immutable = true;
        }

        info!(
            "catalog has {} field(s), {} immutable",
            self.fields.len(),
            self.fields.values().filter(|f| f.immutable).count()
        );

        Ok(FieldCatalog {
            fields: self.fields,
        })
    }

    fn insert_if_absent(&mut self, name: &str, field: &Field) {
        if !self.fields.contains_key(name) {
            self.fields.insert(name.to_string(), field.clone());
        }
    }
}

/// Reconciled fields of one resource kind, keyed by wire name.
///
/// Only [`FieldAggregator::finish`] produces a catalog; it cannot be
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldCatalog {
    fields: FieldMap,
}

impl FieldCatalog {
    pub fn get(&self, wire_name: &str) -> Option<&Field> {
        self.fields.get(wire_name)
    }

    pub fn contains(&self, wire_name: &str) -> bool {
        self.fields.contains_key(wire_name)
    }

    /// Fields in wire-name order.
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields whose schema type could not be resolved.
    pub fn unresolved(&self) -> impl Iterator<Item = &Field> {
        self.fields
            .values()
            .filter(|f| matches!(f.field_type, FieldType::Unresolved(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Location, Operation, Origin, Primitive, TargetType};

    fn field(name: &str, required: bool, operation: Operation, location: Location) -> Field {
        Field {
            wire_name: name.to_string(),
            declaration_name: name.to_string(),
            serialized_name: name.to_string(),
            description: None,
            field_type: FieldType::Resolved(TargetType {
                primitive: Primitive::String,
                array: false,
                nullable: !required,
            }),
            enum_values: Vec::new(),
            enum_default: None,
            required,
            immutable: location.is_parameter(),
            origin: Origin {
                operation,
                location,
            },
        }
    }

    fn view(
        operation: Operation,
        parameters: &[(&str, bool)],
        body: Option<&[(&str, bool)]>,
    ) -> OperationView {
        let location = |name: &str| {
            if name.ends_with("_q") {
                Location::Query
            } else {
                Location::Path
            }
        };
        OperationView {
            operation,
            path: "/test".to_string(),
            parameters: parameters
                .iter()
                .map(|(n, r)| (n.to_string(), field(n, *r, operation, location(*n))))
                .collect(),
            body: body.map(|fields| {
                fields
                    .iter()
                    .map(|(n, r)| (n.to_string(), field(n, *r, operation, Location::Body)))
                    .collect()
            }),
        }
    }

    #[test]
    fn seed_inserts_parameters_and_body() {
        let create = view(
            Operation::Create,
            &[("id", true)],
            Some(&[("name", true), ("visibility", false)]),
        );
        let catalog = FieldAggregator::seed(&create).finish().unwrap();

        assert_eq!(catalog.len(), 3);
        assert!(catalog.get("id").unwrap().immutable);
    }

    #[test]
    fn seed_body_shadows_parameter() {
        let create = view(Operation::Create, &[("id", true)], Some(&[("id", false)]));
        let aggregator = FieldAggregator::seed(&create);
        assert_eq!(aggregator.fields["id"].origin.location, Location::Body);
    }

    #[test]
    fn update_inserts_absent_fields() {
        let create = view(Operation::Create, &[("id", true)], Some(&[("name", true)]));
        let update = view(
            Operation::PartialUpdate,
            &[("token_id", true)],
            Some(&[("description", false)]),
        );

        let mut aggregator = FieldAggregator::seed(&create);
        aggregator.merge_update(&update);
        let catalog = aggregator.finish().unwrap();

        assert!(catalog.get("token_id").unwrap().immutable);
        let description = catalog.get("description").unwrap();
        assert_eq!(description.origin.operation, Operation::PartialUpdate);
        assert!(!description.immutable);
    }

    #[test]
    fn update_promotes_requiredness() {
        let create = view(Operation::Create, &[], Some(&[("name", false)]));
        let update = view(Operation::PartialUpdate, &[], Some(&[("name", true)]));

        let mut aggregator = FieldAggregator::seed(&create);
        aggregator.merge_update(&update);
        let catalog = aggregator.finish().unwrap();

        let name = catalog.get("name").unwrap();
        assert!(name.required);
        assert_eq!(name.origin.operation, Operation::PartialUpdate);
    }

    #[test]
    fn update_never_demotes() {
        let create = view(Operation::Create, &[], Some(&[("name", true)]));
        let update = view(Operation::PartialUpdate, &[], Some(&[("name", false)]));

        let mut aggregator = FieldAggregator::seed(&create);
        aggregator.merge_update(&update);
        let catalog = aggregator.finish().unwrap();

        let name = catalog.get("name").unwrap();
        assert!(name.required);
        assert_eq!(name.origin.operation, Operation::Create);
    }

    #[test]
    fn update_parameters_do_not_overwrite() {
        let create = view(Operation::Create, &[("id", false)], None);
        let update = view(Operation::PartialUpdate, &[("id", true)], None);

        let mut aggregator = FieldAggregator::seed(&create);
        aggregator.merge_update(&update);
        let catalog = aggregator.finish().unwrap();

        assert!(!catalog.get("id").unwrap().required);
    }

    #[test]
    fn update_merge_is_idempotent() {
        let create = view(
            Operation::Create,
            &[("id", true)],
            Some(&[("name", false), ("visibility", false)]),
        );
        let update = view(
            Operation::PartialUpdate,
            &[("token_id", true)],
            Some(&[("name", true), ("extra", false)]),
        );

        let mut once = FieldAggregator::seed(&create);
        once.merge_update(&update);

        let mut twice = FieldAggregator::seed(&create);
        twice.merge_update(&update);
        twice.merge_update(&update);

        assert_eq!(once.finish().unwrap(), twice.finish().unwrap());
    }

    #[test]
    fn delete_adds_parameters_only() {
        let create = view(Operation::Create, &[("id", true)], Some(&[("name", true)]));
        let delete = view(
            Operation::Delete,
            &[("id", false), ("force_q", false)],
            Some(&[("reason", true)]),
        );

        let mut aggregator = FieldAggregator::seed(&create);
        aggregator.merge_delete(&delete);
        let catalog = aggregator.finish().unwrap();

        let id = catalog.get("id").unwrap();
        assert!(id.required);
        assert_eq!(id.origin.operation, Operation::Create);

        let force = catalog.get("force_q").unwrap();
        assert!(force.immutable);
        assert!(!force.required);

        assert!(!catalog.contains("reason"));
    }

    #[test]
    fn delete_merge_is_idempotent() {
        let create = view(Operation::Create, &[("id", true)], None);
        let delete = view(Operation::Delete, &[("force_q", false)], None);

        let mut once = FieldAggregator::seed(&create);
        once.merge_delete(&delete);

        let mut twice = FieldAggregator::seed(&create);
        twice.merge_delete(&delete);
        twice.merge_delete(&delete);

        assert_eq!(once.finish().unwrap(), twice.finish().unwrap());
    }

    #[test]
    fn create_only_body_fields_become_immutable() {
        let create = view(
            Operation::Create,
            &[],
            Some(&[("name", true), ("expires_at", false)]),
        );
        let update = view(Operation::PartialUpdate, &[], Some(&[("name", false)]));

        let mut aggregator = FieldAggregator::seed(&create);
        aggregator.merge_update(&update);
        let catalog = aggregator.finish().unwrap();

        assert!(!catalog.get("name").unwrap().immutable);
        assert!(catalog.get("expires_at").unwrap().immutable);
    }

    #[test]
    fn without_update_all_create_body_fields_are_immutable() {
        let create = view(Operation::Create, &[], Some(&[("name", true), ("scopes", true)]));
        let catalog = FieldAggregator::seed(&create).finish().unwrap();
        assert!(catalog.iter().all(|f| f.immutable));
    }

    #[test]
    fn update_only_body_fields_stay_mutable() {
        let create = view(Operation::Create, &[], Some(&[("name", true)]));
        let update = view(Operation::PartialUpdate, &[], Some(&[("description", false)]));

        let mut aggregator = FieldAggregator::seed(&create);
        aggregator.merge_update(&update);
        let catalog = aggregator.finish().unwrap();

        assert!(!catalog.get("description").unwrap().immutable);
    }

    #[test]
    fn update_parameter_does_not_count_as_update_body() {
        let create = view(Operation::Create, &[], Some(&[("name", true)]));
        let update = view(Operation::PartialUpdate, &[("name", true)], Some(&[]));

        let mut aggregator = FieldAggregator::seed(&create);
        aggregator.merge_update(&update);
        let catalog = aggregator.finish().unwrap();

        assert!(catalog.get("name").unwrap().immutable);
    }

    #[test]
    fn missing_create_body_entry_fails() {
        let create = view(Operation::Create, &[], Some(&[("name", true)]));
        let mut aggregator = FieldAggregator::seed(&create);
        aggregator.fields.remove("name");

        let result = aggregator.finish();
        assert!(matches!(
            result,
            Err(AggregateError::MissingCatalogEntry { wire_name }) if wire_name == "name"
        ));
    }

    #[test]
    fn unresolved_lists_type_gaps() {
        let mut create = view(Operation::Create, &[], Some(&[("ratio", false), ("name", true)]));
        if let Some(body) = create.body.as_mut() {
            body.get_mut("ratio").unwrap().field_type =
                FieldType::Unresolved(crate::types::UnresolvedType {
                    schema_type: Some("number".into()),
                    item_type: None,
                });
        }
        let catalog = FieldAggregator::seed(&create).finish().unwrap();
        let gaps: Vec<&str> = catalog.unresolved().map(|f| f.wire_name.as_str()).collect();
        assert_eq!(gaps, vec!["ratio"]);
    }
}
