use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub data: Vec<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRecord {
    pub iata_code: Option<String>,
    pub name: Option<String>,
    pub geo_code: Option<GeoCode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeoCode {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HotelRecord {
    pub name: Option<String>,
    pub distance: Option<Distance>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Distance {
    pub value: Option<Value>,
    pub unit: Option<String>,
}

impl Distance {
    pub fn value_text(&self) -> Option<String> {
        match self.value.as_ref()? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityRecord {
    pub name: Option<String>,
    pub category: Option<String>,
}
