//! Structured output contract for news classification.
//!
//! Field names and enum values are the Norwegian labels the prompts use,
//! so the model's JSON maps onto these types without translation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaError;

/// Topic of a news article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Topic {
    /// Elections, government, legislation.
    Politikk,
    /// Social conditions, culture, education.
    Samfunn,
    /// Markets, unemployment, inflation.
    #[serde(rename = "Økonomi")]
    Okonomi,
    Utdanning,
    Helse,
    /// Climate, pollution, natural disasters.
    #[serde(rename = "Miljø")]
    Miljo,
    Kultur,
    Sport,
    Teknologi,
    /// Film, TV, celebrities.
    Underholdning,
    Reise,
    Annet,
}

/// A named entity mentioned in the article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Entity {
    /// Person, Organisasjon, Sted, Hendelse, ...
    #[serde(rename = "type")]
    pub kind: String,
    pub navn: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Sentiment {
    Positivt,
    Negativt,
    #[serde(rename = "Nøytralt")]
    Noytralt,
}

/// Societal impact of the story, from entertainment to war.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum Severity {
    Lav,
    Moderat,
    #[serde(rename = "Høy")]
    Hoy,
    Kritisk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Audience {
    Barn,
    Ungdom,
    Voksne,
    Eldre,
    Annet,
}

/// Whether the headline exaggerates or misrepresents the story to
/// attract clicks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Clickbait {
    pub clickbait: bool,
    /// 0 (none) to 1 (pure clickbait).
    pub clickbait_score: f64,
    /// The part of the headline that is clickbait.
    pub clickbait_text: String,
}

/// Classification of one news article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NewsItem {
    #[schemars(description = "Tema for nyhetssaken")]
    pub tema: Vec<Topic>,
    #[schemars(description = "Objekter i nyhetssaken")]
    pub objekt: Vec<Entity>,
    #[schemars(description = "Sentiment i nyhetssaken")]
    pub sentiment: Sentiment,
    #[schemars(description = "Alvorlighetsgrad i nyhetssaken")]
    pub alvorlighetsgrad: Severity,
    #[serde(rename = "målgruppe")]
    #[schemars(description = "Målgruppe for nyhetssaken")]
    pub malgruppe: Vec<Audience>,
    #[schemars(description = "Clickbait i nyhetssaken")]
    pub clickbait: Clickbait,
}

impl NewsItem {
    /// Decodes and validates a model response.
    ///
    /// `tema` is checked to be a JSON array before decoding so a scalar
    /// topic is reported as such rather than as a type mismatch.
    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        if let Some(tema) = value.get("tema") {
            if !tema.is_array() {
                return Err(SchemaError::NotAList("tema"));
            }
        }
        let item: NewsItem = serde_json::from_value(value)?;
        item.validate()?;
        Ok(item)
    }

    pub fn from_json(s: &str) -> Result<Self, SchemaError> {
        Self::from_value(serde_json::from_str(s)?)
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        let score = self.clickbait.clickbait_score;
        if !(0.0..=1.0).contains(&score) {
            return Err(SchemaError::OutOfRange {
                field: "clickbait_score",
                value: score,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(())
    }
}

/// Title and summary for a cluster of related articles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ClusterInfo {
    #[schemars(description = "Tittel på gruppen av nyhetssaker")]
    pub tittel: String,
    #[schemars(description = "Kort sammendrag av gruppen nyhetssaker")]
    pub sammendrag: String,
}

/// JSON Schema for `T` as a JSON value.
pub fn json_schema<T: JsonSchema>() -> Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(&schema).unwrap_or_default()
}

/// OpenAI `response_format` requesting strict structured output of `T`.
pub fn response_format<T: JsonSchema>(name: &str) -> Value {
    serde_json::json!({
        "type": "json_schema",
        "json_schema": {
            "name": name,
            "schema": json_schema::<T>(),
            "strict": true,
        }
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> Value {
        json!({
            "tema": ["Politikk", "Økonomi"],
            "objekt": [{"type": "Organisasjon", "navn": "Norges Bank"}],
            "sentiment": "Nøytralt",
            "alvorlighetsgrad": "Høy",
            "målgruppe": ["Voksne"],
            "clickbait": {
                "clickbait": false,
                "clickbait_score": 0.1,
                "clickbait_text": ""
            }
        })
    }

    #[test]
    fn decodes_norwegian_labels() {
        let item = NewsItem::from_value(sample()).unwrap();
        assert_eq!(item.tema, vec![Topic::Politikk, Topic::Okonomi]);
        assert_eq!(item.sentiment, Sentiment::Noytralt);
        assert_eq!(item.alvorlighetsgrad, Severity::Hoy);
        assert_eq!(item.malgruppe, vec![Audience::Voksne]);
        assert_eq!(item.objekt[0].kind, "Organisasjon");
    }

    #[test]
    fn serializes_back_to_wire_names() {
        let item = NewsItem::from_value(sample()).unwrap();
        assert_eq!(serde_json::to_value(&item).unwrap(), sample());
    }

    #[test]
    fn scalar_tema_is_rejected() {
        let mut v = sample();
        v["tema"] = json!("Politikk");
        let err = NewsItem::from_value(v).unwrap_err();
        assert!(matches!(err, SchemaError::NotAList("tema")));
    }

    #[test]
    fn unknown_topic_is_rejected() {
        let mut v = sample();
        v["tema"] = json!(["Vær"]);
        assert!(matches!(
            NewsItem::from_value(v),
            Err(SchemaError::Invalid(_))
        ));
    }

    #[test]
    fn clickbait_score_out_of_range() {
        let mut v = sample();
        v["clickbait"]["clickbait_score"] = json!(1.5);
        assert!(matches!(
            NewsItem::from_value(v),
            Err(SchemaError::OutOfRange {
                field: "clickbait_score",
                ..
            })
        ));
    }

    #[test]
    fn severity_orders_by_impact() {
        assert!(Severity::Lav < Severity::Moderat);
        assert!(Severity::Hoy < Severity::Kritisk);
    }

    #[test]
    fn response_format_wraps_schema() {
        let rf = response_format::<ClusterInfo>("cluster_info");
        assert_eq!(rf["type"], "json_schema");
        assert_eq!(rf["json_schema"]["name"], "cluster_info");
        assert_eq!(rf["json_schema"]["strict"], true);

        let props = &rf["json_schema"]["schema"]["properties"];
        assert!(props.get("tittel").is_some());
        assert!(props.get("sammendrag").is_some());
        assert_eq!(rf["json_schema"]["schema"]["additionalProperties"], false);
    }

    #[test]
    fn news_schema_uses_wire_field_names() {
        let schema = json_schema::<NewsItem>();
        let props = &schema["properties"];
        assert!(props.get("målgruppe").is_some());
        assert!(props.get("malgruppe").is_none());
    }
}
