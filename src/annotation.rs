use crate::error::{NucError, Result};
use nucsim_protocol::AnnotationSpec;
use serde::Serialize;
use serde_json::Value;

/// A named, inclusive `[start, end]` region of a single strand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Annotation {
    parent_id: String,
    name: String,
    start: usize,
    end: usize,
    note: String,
}

impl Annotation {
    /// Checks `spec` against a parent of `parent_len` bases.
    ///
    /// Coordinates must satisfy `start != end`, `start < len - 1` and
    /// `end <= len - 1`. Only circular parents accept `start > end`, which
    /// denotes a region wrapping past the origin.
    pub fn validated(
        parent_id: &str,
        parent_len: usize,
        circular: bool,
        spec: AnnotationSpec,
    ) -> Result<Self> {
        let AnnotationSpec {
            name,
            start,
            end,
            note,
        } = spec;
        let last = parent_len.saturating_sub(1);
        if start == end || end == 0 || start >= last || end > last {
            return Err(NucError::Validation(format!(
                "Cannot add annotation {name}, start {start} and end {end} must be within index bounds of a sequence of length {parent_len}"
            )));
        }
        if !circular && start > end {
            return Err(NucError::Validation(format!(
                "Cannot add annotation {name}, start must be less than end for linear sequences"
            )));
        }
        Ok(Self {
            parent_id: parent_id.to_string(),
            name,
            start,
            end,
            note,
        })
    }

    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    #[inline(always)]
    pub fn wraps_origin(&self) -> bool {
        self.end < self.start
    }

    pub fn to_spec(&self) -> AnnotationSpec {
        AnnotationSpec::new(self.name.clone(), self.start, self.end).with_note(self.note.clone())
    }

    pub(crate) fn reparented(&self, parent_id: &str) -> Self {
        Self {
            parent_id: parent_id.to_string(),
            ..self.clone()
        }
    }
}

/// The fields an annotation edit may replace; absent fields keep their value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnnotationEdit {
    pub name: Option<String>,
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub note: Option<String>,
}

impl AnnotationEdit {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn start(mut self, start: usize) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: usize) -> Self {
        self.end = Some(end);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Parses a JSON field map such as `{"start": 1, "note": "moved"}`.
    pub fn from_json(fields: &Value) -> Result<Self> {
        let map = fields.as_object().ok_or_else(|| {
            NucError::TypeConstraint("Annotation edit must be a JSON object".to_string())
        })?;
        let mut ret = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "name" => ret.name = Some(json_string(key, value)?),
                "start" => ret.start = Some(json_index(key, value)?),
                "end" => ret.end = Some(json_index(key, value)?),
                "note" => ret.note = Some(json_string(key, value)?),
                other => {
                    return Err(NucError::TypeConstraint(format!(
                        "Annotation has no attribute {other}"
                    )));
                }
            }
        }
        Ok(ret)
    }

    pub(crate) fn apply_to(&self, current: &Annotation) -> AnnotationSpec {
        AnnotationSpec {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            start: self.start.unwrap_or(current.start),
            end: self.end.unwrap_or(current.end),
            note: self.note.clone().unwrap_or_else(|| current.note.clone()),
        }
    }
}

pub(crate) fn json_string(key: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| NucError::TypeConstraint(format!("{key} must be a string")))
}

pub(crate) fn json_index(key: &str, value: &Value) -> Result<usize> {
    value
        .as_u64()
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| NucError::TypeConstraint(format!("{key} must be a non-negative integer")))
}
