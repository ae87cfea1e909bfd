use serde::{Deserialize, Deserializer};

/// Trims surrounding whitespace, so a blank value fails length rules.
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(s.trim().to_string())
}

/// Optional variant of [`trimmed`]. Pair with `#[serde(default)]`.
pub fn trimmed_optional<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.map(|s| s.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Form {
        #[serde(deserialize_with = "trimmed")]
        name: String,
        #[serde(default, deserialize_with = "trimmed_optional")]
        title: Option<String>,
    }

    #[test]
    fn test_trims_required_and_optional() {
        let form: Form = serde_json::from_str(r#"{"name": "  Apollo \n", "title": "   "}"#).unwrap();
        assert_eq!(form.name, "Apollo");
        assert_eq!(form.title.as_deref(), Some(""));
    }

    #[test]
    fn test_optional_absent_stays_none() {
        let form: Form = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert!(form.title.is_none());
    }
}
