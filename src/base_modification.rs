use crate::{
    annotation::{json_index, json_string},
    error::{NucError, Result},
};
use nucsim_protocol::{BaseModificationSpec, BaseModificationType};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BaseModification {
    parent_id: String,
    position: usize,
    modification_type: BaseModificationType,
    base: char,
}

impl BaseModification {
    /// Checks `spec` against the parent `sequence` and records the observed base.
    pub fn validated(parent_id: &str, sequence: &str, spec: BaseModificationSpec) -> Result<Self> {
        let BaseModificationSpec {
            position,
            modification_type,
        } = spec;
        let base = sequence
            .as_bytes()
            .get(position)
            .map(|b| char::from(*b))
            .ok_or_else(|| {
                NucError::Validation(format!(
                    "Cannot add modification at {position}, must be within index bounds of a sequence of length {}",
                    sequence.len()
                ))
            })?;
        let required = modification_type.required_base();
        if base != required {
            return Err(NucError::Validation(format!(
                "Cannot add modification {modification_type} at {position}, base should be {required}, found {base}"
            )));
        }
        Ok(Self {
            parent_id: parent_id.to_string(),
            position,
            modification_type,
            base,
        })
    }

    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn modification_type(&self) -> BaseModificationType {
        self.modification_type
    }

    pub fn base(&self) -> char {
        self.base
    }

    pub fn to_spec(&self) -> BaseModificationSpec {
        BaseModificationSpec::new(self.position, self.modification_type)
    }

    pub(crate) fn reparented(&self, parent_id: &str) -> Self {
        Self {
            parent_id: parent_id.to_string(),
            ..self.clone()
        }
    }
}

/// A base modification edit. The observed base is derived and cannot be set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BaseModificationEdit {
    pub position: Option<usize>,
    pub modification_type: Option<BaseModificationType>,
}

impl BaseModificationEdit {
    pub fn position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    pub fn modification_type(mut self, modification_type: BaseModificationType) -> Self {
        self.modification_type = Some(modification_type);
        self
    }

    pub fn from_json(fields: &Value) -> Result<Self> {
        let map = fields.as_object().ok_or_else(|| {
            NucError::TypeConstraint("Base modification edit must be a JSON object".to_string())
        })?;
        let mut ret = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "position" => ret.position = Some(json_index(key, value)?),
                "modification_type" => {
                    ret.modification_type = Some(json_string(key, value)?.parse()?);
                }
                "base" => {
                    return Err(NucError::TypeConstraint(
                        "Unable to change the base attribute directly, use position or modification_type"
                            .to_string(),
                    ));
                }
                other => {
                    return Err(NucError::TypeConstraint(format!(
                        "Base modification has no attribute {other}"
                    )));
                }
            }
        }
        Ok(ret)
    }

    pub(crate) fn apply_to(&self, current: &BaseModification) -> BaseModificationSpec {
        BaseModificationSpec::new(
            self.position.unwrap_or(current.position),
            self.modification_type.unwrap_or(current.modification_type),
        )
    }
}
