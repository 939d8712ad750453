use crate::restriction_enzyme::RestrictionEnzyme;
use anyhow::{Result, anyhow};
use log::warn;
use std::fs;

const RUNTIME_ENZYMES_PATH: &str = "data/enzymes.json";
const BUILTIN_ENZYMES_JSON: &str = include_str!("../assets/enzymes.json");

/// The restriction enzyme table used for cut-site scans.
#[derive(Clone, Debug, Default)]
pub struct Enzymes {
    restriction_enzymes: Vec<RestrictionEnzyme>,
}

impl Enzymes {
    pub fn new(json_text: &str) -> Result<Self> {
        let res: serde_json::Value = serde_json::from_str(json_text)?;
        let arr = res
            .as_array()
            .ok_or(anyhow!("Enzymes file is not a JSON array"))?;
        let mut restriction_enzymes = vec![];
        for row in arr {
            let Some(enzyme_type) = row.get("type") else {
                continue;
            };
            match enzyme_type.as_str() {
                Some("restriction") => {
                    let mut re: RestrictionEnzyme = serde_json::from_value(row.clone())
                        .map_err(|e| anyhow!("Bad restriction enzyme {row}: {e}"))?;
                    re.sequence = re.sequence.to_ascii_uppercase();
                    re.check_palindromic();
                    restriction_enzymes.push(re);
                }
                Some(other) => return Err(anyhow!("Unknown enzyme type '{other}' in {row}")),
                None => return Err(anyhow!("Missing enzyme type for {row}")),
            }
        }
        Ok(Self {
            restriction_enzymes,
        })
    }

    pub fn from_path(path: &str) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::new(&text)
    }

    /// The built-in table, replaced by `data/enzymes.json` when that file
    /// exists and holds at least one restriction enzyme.
    pub fn active() -> Self {
        if let Ok(text) = fs::read_to_string(RUNTIME_ENZYMES_PATH) {
            match Enzymes::new(&text) {
                Ok(custom) if !custom.restriction_enzymes.is_empty() => return custom,
                Ok(_) => warn!("{RUNTIME_ENZYMES_PATH} holds no restriction enzymes, using built-in table"),
                Err(e) => warn!("Could not parse {RUNTIME_ENZYMES_PATH}, using built-in table: {e}"),
            }
        }
        Self::builtin()
    }

    pub fn builtin() -> Self {
        Enzymes::new(BUILTIN_ENZYMES_JSON).unwrap_or_else(|e| {
            warn!("Built-in enzyme table is unreadable: {e}");
            Self::default()
        })
    }

    pub fn restriction_enzymes(&self) -> &[RestrictionEnzyme] {
        &self.restriction_enzymes
    }

    pub fn names(&self) -> Vec<String> {
        self.restriction_enzymes
            .iter()
            .map(|re| re.name.clone())
            .collect()
    }

    pub fn by_name(&self, name: &str) -> Option<&RestrictionEnzyme> {
        self.restriction_enzymes.iter().find(|re| re.name == name)
    }
}
