use serde::{Deserialize, Deserializer};

// the page number comes straight from the query string; anything that is not an integer
// falls back to the first page instead of rejecting the request
pub fn deserialize_page<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(1))
}

#[derive(Deserialize)]
#[serde(untagged)]
pub enum IntOrString {
    Int(i64),
    Str(String),
}

// html forms on the frontend send numeric selects as strings, so ids and difficulty
// are accepted both as `3` and `"3"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "IntOrString")]
pub struct LooseI64(pub i64);

impl TryFrom<IntOrString> for LooseI64 {
    type Error = String;

    fn try_from(value: IntOrString) -> Result<Self, Self::Error> {
        match value {
            IntOrString::Int(v) => Ok(LooseI64(v)),
            IntOrString::Str(s) => match s.trim().parse::<i64>() {
                Ok(v) => Ok(LooseI64(v)),
                Err(_) => Err(format!("Wrong value {s}, can not parse to i64")),
            },
        }
    }
}
